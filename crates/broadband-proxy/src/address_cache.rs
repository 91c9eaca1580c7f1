//! Last postcode search per visitor.
//!
//! Lifetime is the session's; there is no separate expiry or eviction.

use tracing::debug;

use crate::session::{CachedAddressSearch, SessionSlots};
use crate::types::Address;

/// Replace the visitor's cached search.
pub fn put(session: &dyn SessionSlots, postcode: impl Into<String>, addresses: Vec<Address>) {
    let postcode = postcode.into();
    debug!(
        session_id = %session.session_id(),
        postcode = %postcode,
        count = addresses.len(),
        "Caching address search"
    );
    session.store_address_search(CachedAddressSearch {
        postcode,
        addresses,
    });
}

/// The visitor's cached search, or `None` if no postcode search has
/// succeeded in this session.
pub fn get(session: &dyn SessionSlots) -> Option<CachedAddressSearch> {
    session.load_address_search()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{SessionStore, VisitorSession};
    use broadband_session::{SessionId, StoreConfig};
    use serde_json::json;
    use std::time::Duration;

    fn address(key: &str) -> Address {
        serde_json::from_value(json!({ "nad_key": key })).unwrap()
    }

    #[test]
    fn test_put_then_get() {
        let session = VisitorSession::new(
            SessionId::generate(),
            SessionStore::new(StoreConfig::default()),
        );
        put(&session, "SW1A1AA", vec![address("A0"), address("A1")]);

        let cached = get(&session).unwrap();
        assert_eq!(cached.postcode, "SW1A1AA");
        assert_eq!(cached.addresses, vec![address("A0"), address("A1")]);
    }

    #[test]
    fn test_put_overwrites() {
        let session = VisitorSession::new(
            SessionId::generate(),
            SessionStore::new(StoreConfig::default()),
        );
        put(&session, "SW1A1AA", vec![address("A0"), address("A1")]);
        put(&session, "M11AE", vec![address("B0")]);

        let cached = get(&session).unwrap();
        assert_eq!(cached.postcode, "M11AE");
        assert_eq!(cached.addresses.len(), 1);
    }

    #[test]
    fn test_absent_without_search() {
        let session = VisitorSession::new(
            SessionId::generate(),
            SessionStore::new(StoreConfig::default()),
        );
        assert!(get(&session).is_none());
    }

    #[test]
    fn test_absent_after_session_expiry() {
        let store = SessionStore::new(
            StoreConfig::default().with_ttl(Duration::from_millis(10)),
        );
        let session = VisitorSession::new(SessionId::generate(), store);
        put(&session, "SW1A1AA", vec![address("A0")]);

        std::thread::sleep(Duration::from_millis(30));
        assert!(get(&session).is_none());
    }
}
