//! Upstream availability API.
//!
//! [`AvailabilityApi`] is the seam the router talks to; [`UpstreamClient`]
//! is the HTTP implementation. Every call is a single attempt: failures
//! propagate as [`ProxyError::Upstream`] and nothing here retries.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ProxyError, Result};
use crate::session::CachedToken;
use crate::types::{Address, AddressSearchResults, AvailabilityResults, Credentials};

pub const DEFAULT_BASE_URL: &str = "https://api.interdns.co.uk";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// ─────────────────────────────────────────────────────────────────────────────
// Operations & platform
// ─────────────────────────────────────────────────────────────────────────────

/// One of the four upstream calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ExchangeCredentials,
    SearchByIdentifier,
    SearchByPostcode,
    SearchByAddress,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::ExchangeCredentials => write!(f, "credential exchange"),
            Operation::SearchByIdentifier => write!(f, "identifier search"),
            Operation::SearchByPostcode => write!(f, "postcode search"),
            Operation::SearchByAddress => write!(f, "address search"),
        }
    }
}

/// Upstream operating environment, sent as the `platform` query parameter
/// on every call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Platform {
    #[default]
    Live,
    Test,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Live => "LIVE",
            Platform::Test => "TEST",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LIVE" => Ok(Platform::Live),
            "TEST" => Ok(Platform::Test),
            other => Err(format!("unknown platform '{other}' (expected LIVE or TEST)")),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// API seam
// ─────────────────────────────────────────────────────────────────────────────

/// Operations the proxy needs from the upstream availability service.
#[async_trait]
pub trait AvailabilityApi: Send + Sync {
    /// Exchange credentials for a bearer token and its absolute expiry.
    async fn exchange_credentials(&self, credentials: &Credentials) -> Result<CachedToken>;

    /// Availability for a phone number, ALID or postcode.
    async fn search_by_identifier(
        &self,
        token: &str,
        identifier: &str,
    ) -> Result<AvailabilityResults>;

    /// Candidate addresses for a normalized postcode.
    async fn search_by_postcode(&self, token: &str, postcode: &str) -> Result<AddressSearchResults>;

    /// Availability for one address taken from a postcode search.
    async fn search_by_address(&self, token: &str, address: &Address)
    -> Result<AvailabilityResults>;
}

// ─────────────────────────────────────────────────────────────────────────────
// HTTP client
// ─────────────────────────────────────────────────────────────────────────────

/// Connection settings for [`UpstreamClient`].
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub platform: Platform,
    pub timeout: Duration,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            platform: Platform::Live,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl UpstreamConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: i64,
}

/// reqwest-backed [`AvailabilityApi`].
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    config: UpstreamConfig,
}

impl UpstreamClient {
    pub fn new(config: UpstreamConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Use a pre-built HTTP client (connection pool sharing, proxies).
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn config(&self) -> &UpstreamConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn platform_query(&self) -> [(&'static str, &'static str); 1] {
        [("platform", self.config.platform.as_str())]
    }

    async fn send_json<T: serde::de::DeserializeOwned>(
        &self,
        operation: Operation,
        request: reqwest::RequestBuilder,
    ) -> Result<T> {
        let response = request
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(ProxyError::transport(operation))?;

        let response = ensure_success(operation, response).await?;

        response.json::<T>().await.map_err(|e| ProxyError::Upstream {
            operation,
            status: None,
            message: format!("Failed to parse response: {}", e),
        })
    }
}

/// Turn a non-2xx response into an upstream failure carrying the status
/// and body verbatim.
async fn ensure_success(
    operation: Operation,
    response: reqwest::Response,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(ProxyError::Upstream {
        operation,
        status: Some(status.as_u16()),
        message: format!("HTTP {}: {}", status.as_u16(), body),
    })
}

#[async_trait]
impl AvailabilityApi for UpstreamClient {
    async fn exchange_credentials(&self, credentials: &Credentials) -> Result<CachedToken> {
        let operation = Operation::ExchangeCredentials;
        debug!(username = credentials.username(), "Exchanging credentials");

        let request = self
            .http
            .post(self.url("/oauth/token"))
            .query(&self.platform_query())
            .basic_auth(credentials.username(), Some(credentials.password()))
            .form(&[("grant_type", "client_credentials")]);

        let issued: TokenResponse = self.send_json(operation, request).await?;
        let expires_at = chrono::Duration::try_seconds(issued.expires_in)
            .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
            .ok_or_else(|| ProxyError::Upstream {
                operation,
                status: None,
                message: format!("Invalid expires_in in token response: {}", issued.expires_in),
            })?;
        debug!(
            token_type = issued.token_type.as_deref().unwrap_or("bearer"),
            expires_in = issued.expires_in,
            "Token issued"
        );

        Ok(CachedToken::new(issued.access_token, expires_at))
    }

    async fn search_by_identifier(
        &self,
        token: &str,
        identifier: &str,
    ) -> Result<AvailabilityResults> {
        let path = format!(
            "/broadband/availability/{}",
            urlencoding::encode(identifier)
        );
        let request = self
            .http
            .get(self.url(&path))
            .query(&self.platform_query())
            .bearer_auth(token);

        self.send_json(Operation::SearchByIdentifier, request).await
    }

    async fn search_by_postcode(&self, token: &str, postcode: &str) -> Result<AddressSearchResults> {
        let path = format!("/broadband/address/{}", urlencoding::encode(postcode));
        let request = self
            .http
            .get(self.url(&path))
            .query(&self.platform_query())
            .bearer_auth(token);

        self.send_json(Operation::SearchByPostcode, request).await
    }

    async fn search_by_address(
        &self,
        token: &str,
        address: &Address,
    ) -> Result<AvailabilityResults> {
        let request = self
            .http
            .post(self.url("/broadband/availability"))
            .query(&self.platform_query())
            .bearer_auth(token)
            .json(address);

        self.send_json(Operation::SearchByAddress, request).await
    }
}
