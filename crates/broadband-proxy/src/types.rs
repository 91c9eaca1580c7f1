//! Upstream data shapes.
//!
//! Result payloads are kept lossless: only the fields the proxy itself
//! reads are named, everything else round-trips untouched so the browser
//! receives exactly what the upstream produced.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ─────────────────────────────────────────────────────────────────────────────
// Credentials
// ─────────────────────────────────────────────────────────────────────────────

/// Username and password exchanged for an upstream bearer token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Addresses
// ─────────────────────────────────────────────────────────────────────────────

/// One candidate address returned by a postcode search.
///
/// Serialized as the plain upstream object so it can be posted back
/// verbatim to the address-based availability search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(Map<String, Value>);

impl Address {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// National address database key, when the upstream supplied one.
    pub fn nad_key(&self) -> Option<&str> {
        self.0.get("nad_key").and_then(Value::as_str)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Address {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Result of a postcode search: candidate addresses plus any extra
/// upstream fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressSearchResults {
    #[serde(default)]
    pub addresses: Vec<Address>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Availability
// ─────────────────────────────────────────────────────────────────────────────

/// One product row of an availability result.
///
/// The upstream reports technology, speeds and presentation states per
/// product; the proxy never interprets them beyond the accessors below.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AvailabilityProduct(Map<String, Value>);

impl AvailabilityProduct {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }

    pub fn technology(&self) -> Option<&str> {
        self.0.get("technology").and_then(Value::as_str)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for AvailabilityProduct {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Result of an identifier or address availability search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityResults {
    #[serde(default)]
    pub products: Vec<AvailabilityProduct>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("reseller", "hunter2");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("reseller"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_address_keeps_unknown_fields() {
        let raw = json!({
            "nad_key": "A00012345678",
            "building_number": "10",
            "thoroughfare_name": "DOWNING STREET",
            "post_town": "LONDON"
        });
        let addr: Address = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(addr.nad_key(), Some("A00012345678"));
        assert_eq!(serde_json::to_value(&addr).unwrap(), raw);
    }

    #[test]
    fn test_address_search_results_missing_list() {
        let results: AddressSearchResults = serde_json::from_value(json!({})).unwrap();
        assert!(results.addresses.is_empty());
    }

    #[test]
    fn test_availability_results_preserve_presentation_state() {
        let raw = json!({
            "products": [{
                "name": "FTTP 900",
                "technology": "FTTP",
                "likely_down_speed": 900,
                "status": "available",
                "display_state": "highlight"
            }],
            "exchange": { "code": "LWWST" }
        });
        let results: AvailabilityResults = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(results.products.len(), 1);
        assert_eq!(results.products[0].technology(), Some("FTTP"));
        assert_eq!(results.products[0].name(), Some("FTTP 900"));
        assert!(results.extra.contains_key("exchange"));
        assert_eq!(serde_json::to_value(&results).unwrap(), raw);
    }
}
