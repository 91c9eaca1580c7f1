//! Session cookie handling.
//!
//! The cookie carries nothing but a random id. An id the store does not
//! know (expired, evicted, forged) is replaced rather than adopted.

use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use broadband_proxy::{SessionBucket, SessionStore, VisitorSession};
use broadband_session::SessionId;
use tracing::debug;

use crate::config::ServerConfig;

/// Resolve the visitor's session from `jar`, minting a new one when
/// needed. Returns the jar to send back with the response.
pub fn resolve(
    jar: CookieJar,
    store: &SessionStore,
    config: &ServerConfig,
) -> (CookieJar, VisitorSession) {
    let existing = jar
        .get(&config.cookie_name)
        .and_then(|c| SessionId::parse(c.value()).ok())
        .filter(|id| store.contains(id));

    if let Some(id) = existing {
        return (jar, VisitorSession::new(id, store.clone()));
    }

    let id = SessionId::generate();
    store.insert(&id, SessionBucket::default());
    debug!(session_id = %id, "Started visitor session");

    let jar = jar.add(session_cookie(config, &id));
    (jar, VisitorSession::new(id, store.clone()))
}

fn session_cookie(config: &ServerConfig, id: &SessionId) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), id.to_string()))
        .http_only(true)
        .secure(config.secure_cookies)
        .same_site(SameSite::Lax)
        .path("/")
        .build()
}
