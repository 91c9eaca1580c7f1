//! Error types for session store operations.

/// Error type for session store operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A client-supplied session id could not be parsed.
    #[error("Invalid session id: {0}")]
    InvalidId(String),
}

/// Result type for session store operations.
pub type Result<T> = std::result::Result<T, Error>;
