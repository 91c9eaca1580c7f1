//! Bearer token reuse and renewal.

use tracing::{debug, info};

use crate::error::Result;
use crate::session::SessionSlots;
use crate::types::Credentials;
use crate::upstream::AvailabilityApi;

/// Return a usable bearer token for this visitor, exchanging credentials
/// when the cached one is missing or expired.
///
/// Without a session every call exchanges and nothing is stored. A failed
/// exchange leaves the session untouched and is not retried. Two concurrent
/// calls for one session may both renew; the later write wins.
pub async fn get_or_refresh(
    session: Option<&dyn SessionSlots>,
    api: &dyn AvailabilityApi,
    credentials: &Credentials,
) -> Result<String> {
    let Some(session) = session else {
        debug!("No session, exchanging credentials without caching");
        let issued = api.exchange_credentials(credentials).await?;
        return Ok(issued.token().to_string());
    };

    if let Some(cached) = session.load_token().filter(|t| t.is_usable()) {
        debug!(session_id = %session.session_id(), "Reusing cached token");
        return Ok(cached.token().to_string());
    }

    let issued = api.exchange_credentials(credentials).await?;
    info!(
        session_id = %session.session_id(),
        expires_at = %issued.expires_at(),
        "Renewed upstream token"
    );
    let token = issued.token().to_string();
    session.store_token(issued);
    Ok(token)
}
