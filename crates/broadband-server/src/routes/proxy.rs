//! The form endpoint the search widget posts to.

use axum::{
    Form, Json,
    extract::{State, rejection::FormRejection},
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use broadband_proxy::{ProxyRequest, SessionSlots};
use tracing::error;

use crate::error::{Result, ServerError};
use crate::session;
use crate::state::AppState;

/// `POST {proxy_path}` with `cli_or_postcode` or `address_pos`.
///
/// Responds with the upstream addresses or products object, or `null`
/// when there is nothing to show.
pub async fn proxy_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    form: std::result::Result<Form<ProxyRequest>, FormRejection>,
) -> (CookieJar, Response) {
    let (jar, visitor) = match &state.sessions {
        Some(store) => {
            let (jar, visitor) = session::resolve(jar, store, &state.config);
            (jar, Some(visitor))
        }
        None => (jar, None),
    };

    let slots = visitor.as_ref().map(|v| v as &dyn SessionSlots);
    let response = match dispatch(&state, form, slots).await {
        Ok(response) => response,
        Err(e) => {
            if let ServerError::Proxy(proxy) = &e
                && !proxy.is_recoverable()
            {
                error!(error = %proxy, status = ?proxy.upstream_status(), "Upstream request failed");
            }
            e.into_response()
        }
    };

    (jar, response)
}

async fn dispatch(
    state: &AppState,
    form: std::result::Result<Form<ProxyRequest>, FormRejection>,
    session: Option<&dyn SessionSlots>,
) -> Result<Response> {
    let Form(request) = form.map_err(|e| ServerError::BadRequest(e.body_text()))?;
    let response = state.router.handle(&request, session).await?;
    Ok(Json(response).into_response())
}
