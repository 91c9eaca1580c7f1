//! Error types for the proxy core.

use std::fmt;

use crate::upstream::Operation;

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, ProxyError>;

/// Session slot a selection request depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionSlot {
    /// Postcode of the last successful postcode search.
    Postcode,
    /// Candidate addresses of the last successful postcode search.
    AddressList,
}

impl fmt::Display for SessionSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionSlot::Postcode => write!(f, "postcode"),
            SessionSlot::AddressList => write!(f, "address list"),
        }
    }
}

/// Errors that can occur while handling a proxy request.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// Free-text search matched no classification rule.
    #[error("Input is not a postcode, phone number or ALID")]
    InvalidInput,

    /// Selection request without the prior postcode search it refers to.
    #[error("No {slot} found in session")]
    SessionStateMissing { slot: SessionSlot },

    /// Selection index outside the cached address list.
    #[error("Invalid address position {position} ({available} addresses cached)")]
    InvalidSelection { position: String, available: usize },

    /// Upstream returned a non-success status or the transport failed.
    #[error("Upstream {operation} failed: {message}")]
    Upstream {
        operation: Operation,
        status: Option<u16>,
        message: String,
    },
}

impl ProxyError {
    /// Whether the request should degrade to a neutral result rather than
    /// fail. Only upstream failures are hard failures.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ProxyError::Upstream { .. })
    }

    /// Upstream HTTP status, if the upstream answered at all.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            ProxyError::Upstream { status, .. } => *status,
            _ => None,
        }
    }

    pub(crate) fn transport(operation: Operation) -> impl FnOnce(reqwest::Error) -> Self {
        move |e| ProxyError::Upstream {
            operation,
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }
}
