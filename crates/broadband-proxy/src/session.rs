//! Per-visitor session slots.
//!
//! Each visitor owns one [`SessionBucket`] holding two slots: the cached
//! bearer token and the last postcode search. Components never touch the
//! store directly; they go through a [`SessionSlots`] handle scoped to a
//! single visitor, or `None` when running stateless.

use std::fmt;

use broadband_session::SessionId;
use chrono::{DateTime, Utc};

use crate::types::Address;

/// Session store keyed by visitor, holding one bucket each.
pub type SessionStore = broadband_session::SessionStore<SessionBucket>;

/// Bearer token plus the instant it stops being usable.
#[derive(Clone, PartialEq, Eq)]
pub struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    pub fn new(token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expires_at,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Usable only while `now` is strictly before the expiry.
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    pub fn is_usable(&self) -> bool {
        self.is_usable_at(Utc::now())
    }
}

impl fmt::Debug for CachedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedToken")
            .field("token", &"[redacted]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Outcome of the visitor's last successful postcode search.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedAddressSearch {
    pub postcode: String,
    pub addresses: Vec<Address>,
}

/// Everything the proxy keeps for one visitor.
#[derive(Debug, Clone, Default)]
pub struct SessionBucket {
    pub token: Option<CachedToken>,
    pub address_search: Option<CachedAddressSearch>,
}

/// Read/write access to one visitor's slots.
pub trait SessionSlots: Send + Sync {
    /// Identifier used in log lines.
    fn session_id(&self) -> String;

    fn load_token(&self) -> Option<CachedToken>;

    fn store_token(&self, token: CachedToken);

    fn load_address_search(&self) -> Option<CachedAddressSearch>;

    /// Replaces any earlier search for this visitor.
    fn store_address_search(&self, search: CachedAddressSearch);
}

/// [`SessionSlots`] over a shared [`SessionStore`].
#[derive(Clone)]
pub struct VisitorSession {
    id: SessionId,
    store: SessionStore,
}

impl VisitorSession {
    pub fn new(id: SessionId, store: SessionStore) -> Self {
        Self { id, store }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }
}

impl fmt::Debug for VisitorSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisitorSession").field("id", &self.id).finish()
    }
}

impl SessionSlots for VisitorSession {
    fn session_id(&self) -> String {
        self.id.to_string()
    }

    fn load_token(&self) -> Option<CachedToken> {
        self.store.get(&self.id).and_then(|bucket| bucket.token)
    }

    fn store_token(&self, token: CachedToken) {
        self.store
            .update(&self.id, |bucket| bucket.token = Some(token));
    }

    fn load_address_search(&self) -> Option<CachedAddressSearch> {
        self.store
            .get(&self.id)
            .and_then(|bucket| bucket.address_search)
    }

    fn store_address_search(&self, search: CachedAddressSearch) {
        self.store
            .update(&self.id, |bucket| bucket.address_search = Some(search));
    }
}
