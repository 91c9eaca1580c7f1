//! Core of the broadband availability proxy.
//!
//! Sits between the browser search widget and the upstream availability API.
//! A visitor supplies a phone number, an ALID or a postcode; the proxy
//! classifies it, obtains a bearer token, calls the right upstream
//! operation and, for postcodes, remembers the candidate address list so a
//! follow-up selection resolves without querying the postcode again.
//!
//! # Components
//!
//! - [`classify`]: pure input classification (postcode / phone / ALID)
//! - [`token_cache`]: per-session bearer token reuse and renewal
//! - [`address_cache`]: per-session postcode search results
//! - [`upstream`]: the upstream API seam and its HTTP implementation
//! - [`router`]: dispatches one inbound request through the above
//!
//! All session state is reached through an explicit [`SessionSlots`]
//! handle; nothing here holds process-wide state.

pub mod address_cache;
pub mod classify;
pub mod error;
pub mod router;
pub mod session;
pub mod token_cache;
pub mod types;
pub mod upstream;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use classify::{ClassifiedInput, classify};
pub use error::{ProxyError, Result, SessionSlot};
pub use router::{NONE_OF_THE_ABOVE, ProxyRequest, ProxyResponse, RequestRouter};
pub use session::{
    CachedAddressSearch, CachedToken, SessionBucket, SessionSlots, SessionStore, VisitorSession,
};
pub use types::{
    Address, AddressSearchResults, AvailabilityProduct, AvailabilityResults, Credentials,
};
pub use upstream::{AvailabilityApi, Operation, Platform, UpstreamClient, UpstreamConfig};
