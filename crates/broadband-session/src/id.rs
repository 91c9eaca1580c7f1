use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

use crate::error::Error;

/// Opaque per-visitor session handle.
///
/// Always a random v4 UUID. Values read back from a cookie go through
/// [`SessionId::parse`], so a tampered cookie can never address an
/// arbitrary key in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Mint a fresh session id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a session id received from a client.
    pub fn parse(raw: &str) -> crate::Result<Self> {
        Uuid::parse_str(raw.trim())
            .map(Self)
            .map_err(|_| Error::InvalidId(raw.to_string()))
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SessionId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
