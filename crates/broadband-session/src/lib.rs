//! Per-visitor session store for the broadband availability proxy.
//!
//! Stands in for the hosting environment's session mechanism:
//! - Opaque, randomly generated session ids (carried in a cookie by the server)
//! - LRU eviction so abandoned visitors cannot grow memory without bound
//! - Sliding idle expiry; an expired session reads as absent
//!
//! The store never interprets the values it holds. The proxy core decides
//! what lives inside a session (its token and address-list slots).
//!
//! # Example
//!
//! ```rust,ignore
//! use broadband_session::{SessionId, SessionStore, StoreConfig};
//!
//! let store: SessionStore<MyBucket> = SessionStore::new(
//!     StoreConfig::default().with_ttl(Duration::from_secs(1440)),
//! );
//! let id = SessionId::generate();
//! store.update(&id, |bucket| bucket.visits += 1);
//! ```

mod config;
mod error;
mod id;
mod store;

pub use config::StoreConfig;
pub use error::{Error, Result};
pub use id::SessionId;
pub use store::{SessionStore, StoreStats};
