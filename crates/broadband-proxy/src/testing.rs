//! In-memory [`AvailabilityApi`] for tests.
//!
//! Enabled for this crate's own tests and, through the `testing` feature,
//! for downstream crates that want to drive the router without a network.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use parking_lot::Mutex;

use crate::error::{ProxyError, Result};
use crate::session::CachedToken;
use crate::types::{
    Address, AddressSearchResults, AvailabilityProduct, AvailabilityResults, Credentials,
};
use crate::upstream::{AvailabilityApi, Operation};

/// One recorded call against [`MockApi`].
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    ExchangeCredentials { username: String },
    SearchByIdentifier { token: String, identifier: String },
    SearchByPostcode { token: String, postcode: String },
    SearchByAddress { token: String, address: Address },
}

impl ApiCall {
    pub fn operation(&self) -> Operation {
        match self {
            ApiCall::ExchangeCredentials { .. } => Operation::ExchangeCredentials,
            ApiCall::SearchByIdentifier { .. } => Operation::SearchByIdentifier,
            ApiCall::SearchByPostcode { .. } => Operation::SearchByPostcode,
            ApiCall::SearchByAddress { .. } => Operation::SearchByAddress,
        }
    }
}

/// Canned upstream that records every call.
///
/// Tokens are issued as `mock-token-1`, `mock-token-2`, ... so tests can
/// tell a reused token from a renewed one.
#[derive(Debug)]
pub struct MockApi {
    addresses: Vec<Address>,
    products: Vec<AvailabilityProduct>,
    token_ttl: Duration,
    failing: HashSet<Operation>,
    issued: AtomicU64,
    call_log: Mutex<Vec<ApiCall>>,
}

impl Default for MockApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            addresses: Vec::new(),
            products: Vec::new(),
            token_ttl: Duration::hours(1),
            failing: HashSet::new(),
            issued: AtomicU64::new(0),
            call_log: Mutex::new(Vec::new()),
        }
    }

    /// Addresses returned by every postcode search.
    pub fn with_addresses(mut self, addresses: Vec<Address>) -> Self {
        self.addresses = addresses;
        self
    }

    /// Products returned by every availability search.
    pub fn with_products(mut self, products: Vec<AvailabilityProduct>) -> Self {
        self.products = products;
        self
    }

    /// Lifetime of issued tokens. Zero or negative issues already-expired
    /// tokens.
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    /// Make `operation` fail with a 503.
    pub fn failing(mut self, operation: Operation) -> Self {
        self.failing.insert(operation);
        self
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.call_log.lock().clone()
    }

    pub fn call_count(&self, operation: Operation) -> usize {
        self.call_log
            .lock()
            .iter()
            .filter(|c| c.operation() == operation)
            .count()
    }

    pub fn exchanged_usernames(&self) -> Vec<String> {
        self.call_log
            .lock()
            .iter()
            .filter_map(|c| match c {
                ApiCall::ExchangeCredentials { username } => Some(username.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: ApiCall) -> Result<()> {
        let operation = call.operation();
        self.call_log.lock().push(call);
        if self.failing.contains(&operation) {
            return Err(ProxyError::Upstream {
                operation,
                status: Some(503),
                message: "HTTP 503: mock failure".to_string(),
            });
        }
        Ok(())
    }

    fn availability(&self) -> AvailabilityResults {
        AvailabilityResults {
            products: self.products.clone(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl AvailabilityApi for MockApi {
    async fn exchange_credentials(&self, credentials: &Credentials) -> Result<CachedToken> {
        self.record(ApiCall::ExchangeCredentials {
            username: credentials.username().to_string(),
        })?;
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(CachedToken::new(
            format!("mock-token-{n}"),
            Utc::now() + self.token_ttl,
        ))
    }

    async fn search_by_identifier(
        &self,
        token: &str,
        identifier: &str,
    ) -> Result<AvailabilityResults> {
        self.record(ApiCall::SearchByIdentifier {
            token: token.to_string(),
            identifier: identifier.to_string(),
        })?;
        Ok(self.availability())
    }

    async fn search_by_postcode(&self, token: &str, postcode: &str) -> Result<AddressSearchResults> {
        self.record(ApiCall::SearchByPostcode {
            token: token.to_string(),
            postcode: postcode.to_string(),
        })?;
        Ok(AddressSearchResults {
            addresses: self.addresses.clone(),
            ..Default::default()
        })
    }

    async fn search_by_address(
        &self,
        token: &str,
        address: &Address,
    ) -> Result<AvailabilityResults> {
        self.record(ApiCall::SearchByAddress {
            token: token.to_string(),
            address: address.clone(),
        })?;
        Ok(self.availability())
    }
}
