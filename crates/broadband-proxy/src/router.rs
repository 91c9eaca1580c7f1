//! Request dispatch.
//!
//! One inbound form post is one of three shapes, checked in order:
//! a free-text search (`cli_or_postcode`), an address selection
//! (`address_pos`), or neither. The router classifies, fetches a token,
//! calls the matching upstream operation and updates the visitor's
//! address cache after postcode searches.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::address_cache;
use crate::classify::{ClassifiedInput, classify};
use crate::error::{ProxyError, Result, SessionSlot};
use crate::session::SessionSlots;
use crate::token_cache;
use crate::types::{AddressSearchResults, AvailabilityResults, Credentials};
use crate::upstream::AvailabilityApi;

/// `address_pos` value meaning "none of the listed addresses is mine".
pub const NONE_OF_THE_ABOVE: i64 = -1;

/// Inbound proxy form fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProxyRequest {
    #[serde(default)]
    pub cli_or_postcode: Option<String>,
    #[serde(default)]
    pub address_pos: Option<String>,
}

impl ProxyRequest {
    pub fn search(input: impl Into<String>) -> Self {
        Self {
            cli_or_postcode: Some(input.into()),
            address_pos: None,
        }
    }

    pub fn select(position: impl ToString) -> Self {
        Self {
            cli_or_postcode: None,
            address_pos: Some(position.to_string()),
        }
    }
}

/// What the widget receives.
///
/// Serializes as the upstream object (`{"addresses": ...}` or
/// `{"products": ...}`), or `null` when there was nothing to do.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProxyResponse {
    Addresses(AddressSearchResults),
    Availability(AvailabilityResults),
    NoAction,
}

/// Dispatches proxy requests against an [`AvailabilityApi`].
#[derive(Clone)]
pub struct RequestRouter {
    api: Arc<dyn AvailabilityApi>,
    credentials: Credentials,
}

impl RequestRouter {
    pub fn new(api: Arc<dyn AvailabilityApi>, credentials: Credentials) -> Self {
        Self { api, credentials }
    }

    /// Handle one request for the given visitor, or statelessly when
    /// `session` is `None`.
    ///
    /// Recoverable errors (see [`ProxyError::is_recoverable`]) are logged
    /// here; callers typically render them as `null`.
    pub async fn handle(
        &self,
        request: &ProxyRequest,
        session: Option<&dyn SessionSlots>,
    ) -> Result<ProxyResponse> {
        let result = if let Some(raw) = request.cli_or_postcode.as_deref() {
            self.free_text_search(raw, session).await
        } else if let Some(position) = request.address_pos.as_deref() {
            self.address_selection(position, session).await
        } else {
            debug!("Request carries neither search input nor selection");
            Ok(ProxyResponse::NoAction)
        };

        if let Err(e) = &result
            && e.is_recoverable()
        {
            let session_id = session.map(|s| s.session_id()).unwrap_or_default();
            warn!(
                session_id = %session_id,
                error = %e,
                "Request degraded to empty result"
            );
        }
        result
    }

    async fn free_text_search(
        &self,
        raw: &str,
        session: Option<&dyn SessionSlots>,
    ) -> Result<ProxyResponse> {
        let input = classify(raw);
        debug!(kind = input.kind(), "Classified search input");

        match input {
            ClassifiedInput::Postcode(postcode) => {
                let token = self.token(session).await?;
                let results = self.api.search_by_postcode(&token, &postcode).await?;
                info!(
                    postcode = %postcode,
                    count = results.addresses.len(),
                    "Postcode search"
                );
                if let Some(session) = session {
                    address_cache::put(session, postcode, results.addresses.clone());
                }
                Ok(ProxyResponse::Addresses(results))
            }
            ClassifiedInput::PhoneNumber(identifier) | ClassifiedInput::Alid(identifier) => {
                self.identifier_search(&identifier, session).await
            }
            ClassifiedInput::Invalid => Err(ProxyError::InvalidInput),
        }
    }

    async fn address_selection(
        &self,
        raw_position: &str,
        session: Option<&dyn SessionSlots>,
    ) -> Result<ProxyResponse> {
        let position = raw_position.trim().parse::<i64>().ok();
        let cached = session.and_then(address_cache::get);

        if position == Some(NONE_OF_THE_ABOVE) {
            let Some(cached) = cached else {
                return Err(ProxyError::SessionStateMissing {
                    slot: SessionSlot::Postcode,
                });
            };
            debug!(postcode = %cached.postcode, "None of the above, searching by postcode");
            return self.identifier_search(&cached.postcode, session).await;
        }

        let Some(cached) = cached else {
            return Err(ProxyError::SessionStateMissing {
                slot: SessionSlot::AddressList,
            });
        };

        let address = position
            .and_then(|p| usize::try_from(p).ok())
            .and_then(|i| cached.addresses.get(i))
            .ok_or_else(|| ProxyError::InvalidSelection {
                position: raw_position.trim().to_string(),
                available: cached.addresses.len(),
            })?;

        let token = self.token(session).await?;
        let results = self.api.search_by_address(&token, address).await?;
        info!(
            nad_key = address.nad_key().unwrap_or("-"),
            products = results.products.len(),
            "Address search"
        );
        Ok(ProxyResponse::Availability(results))
    }

    async fn identifier_search(
        &self,
        identifier: &str,
        session: Option<&dyn SessionSlots>,
    ) -> Result<ProxyResponse> {
        let token = self.token(session).await?;
        let results = self.api.search_by_identifier(&token, identifier).await?;
        info!(products = results.products.len(), "Identifier search");
        Ok(ProxyResponse::Availability(results))
    }

    async fn token(&self, session: Option<&dyn SessionSlots>) -> Result<String> {
        token_cache::get_or_refresh(session, self.api.as_ref(), &self.credentials).await
    }
}
