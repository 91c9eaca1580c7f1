//! HTTP contract tests for `UpstreamClient` against a mock upstream.

use std::sync::Arc;
use std::time::Duration;

use broadband_proxy::{
    Address, AvailabilityApi, Credentials, Operation, Platform, ProxyError, ProxyRequest,
    ProxyResponse, RequestRouter, SessionSlots, SessionStore, UpstreamClient, UpstreamConfig,
    VisitorSession,
};
use broadband_session::{SessionId, StoreConfig};
use chrono::Utc;
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> UpstreamClient {
    UpstreamClient::new(UpstreamConfig::new(server.uri()).with_platform(Platform::Live))
}

fn token_response(token: &str, expires_in: i64) -> serde_json::Value {
    json!({
        "access_token": token,
        "token_type": "Bearer",
        "expires_in": expires_in
    })
}

async fn mount_token(server: &MockServer, token: &str, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(query_param("platform", "LIVE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_response(token, 3600)))
        .expect(expected_calls)
        .mount(server)
        .await;
}

// ─────────────────────────────────────────────────────────────────────────────
// Individual operations
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_exchange_credentials_uses_basic_auth() {
    let server = MockServer::start().await;

    // base64("user:pass")
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(query_param("platform", "LIVE"))
        .and(header("authorization", "Basic dXNlcjpwYXNz"))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_response("tok-1", 3600)))
        .expect(1)
        .mount(&server)
        .await;

    let before = Utc::now();
    let token = client(&server)
        .exchange_credentials(&Credentials::new("user", "pass"))
        .await
        .unwrap();

    assert_eq!(token.token(), "tok-1");
    assert!(token.expires_at() >= before + chrono::Duration::seconds(3600));
    assert!(token.is_usable());
}

#[tokio::test]
async fn test_exchange_credentials_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid_client"))
        .mount(&server)
        .await;

    let err = client(&server)
        .exchange_credentials(&Credentials::new("user", "wrong"))
        .await
        .unwrap_err();

    match err {
        ProxyError::Upstream {
            operation,
            status,
            message,
        } => {
            assert_eq!(operation, Operation::ExchangeCredentials);
            assert_eq!(status, Some(401));
            assert!(message.contains("invalid_client"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_exchange_credentials_rejects_out_of_range_expiry() {
    let server = MockServer::start().await;

    for expires_in in [i64::MAX, i64::MIN, 9_000_000_000_000_000] {
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(token_response("tok-big", expires_in)),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;

        let err = client(&server)
            .exchange_credentials(&Credentials::new("user", "pass"))
            .await
            .unwrap_err();

        match err {
            ProxyError::Upstream {
                operation,
                status,
                message,
            } => {
                assert_eq!(operation, Operation::ExchangeCredentials);
                assert_eq!(status, None);
                assert!(message.contains("expires_in"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

#[tokio::test]
async fn test_search_by_identifier() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/broadband/availability/02072193000"))
        .and(query_param("platform", "LIVE"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "products": [
                { "name": "FTTP 900", "technology": "FTTP", "order_prohibited": false }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let results = client(&server)
        .search_by_identifier("tok", "02072193000")
        .await
        .unwrap();

    assert_eq!(results.products.len(), 1);
    assert_eq!(results.products[0].technology(), Some("FTTP"));
    assert_eq!(
        results.products[0].get("order_prohibited"),
        Some(&json!(false))
    );
}

#[tokio::test]
async fn test_search_by_identifier_encodes_path() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/broadband/availability/020%207219%203000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "products": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let results = client(&server)
        .search_by_identifier("tok", "020 7219 3000")
        .await
        .unwrap();

    assert!(results.products.is_empty());
}

#[tokio::test]
async fn test_search_by_postcode() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/broadband/address/SW1A1AA"))
        .and(query_param("platform", "LIVE"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "addresses": [
                { "nad_key": "A0", "building_number": "10" },
                { "nad_key": "A1", "building_number": "11" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let results = client(&server)
        .search_by_postcode("tok", "SW1A1AA")
        .await
        .unwrap();

    let keys: Vec<_> = results.addresses.iter().map(|a| a.nad_key()).collect();
    assert_eq!(keys, vec![Some("A0"), Some("A1")]);
}

#[tokio::test]
async fn test_search_by_address_posts_address_verbatim() {
    let server = MockServer::start().await;
    let raw = json!({ "nad_key": "A0", "building_number": "10", "post_town": "LONDON" });

    Mock::given(method("POST"))
        .and(path("/broadband/availability"))
        .and(query_param("platform", "LIVE"))
        .and(header("authorization", "Bearer tok"))
        .and(body_json(&raw))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "products": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let address: Address = serde_json::from_value(raw).unwrap();
    client(&server)
        .search_by_address("tok", &address)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_platform_tag_follows_config() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/broadband/address/M11AE"))
        .and(query_param("platform", "TEST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "addresses": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let client =
        UpstreamClient::new(UpstreamConfig::new(server.uri()).with_platform(Platform::Test));
    client.search_by_postcode("tok", "M11AE").await.unwrap();
}

#[tokio::test]
async fn test_server_error_surfaces_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/broadband/address/SW1A1AA"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = client(&server)
        .search_by_postcode("tok", "SW1A1AA")
        .await
        .unwrap_err();

    assert!(!err.is_recoverable());
    assert_eq!(err.upstream_status(), Some(500));
}

#[tokio::test]
async fn test_timeout_surfaces_as_upstream_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/broadband/address/SW1A1AA"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "addresses": [] }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = UpstreamClient::new(
        UpstreamConfig::new(server.uri()).with_timeout(Duration::from_millis(100)),
    );
    let err = client
        .search_by_postcode("tok", "SW1A1AA")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ProxyError::Upstream {
            operation: Operation::SearchByPostcode,
            status: None,
            ..
        }
    ));
}

#[tokio::test]
async fn test_malformed_body_is_upstream_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = client(&server)
        .exchange_credentials(&Credentials::new("user", "pass"))
        .await
        .unwrap_err();

    assert!(matches!(err, ProxyError::Upstream { .. }));
}

// ─────────────────────────────────────────────────────────────────────────────
// Router over HTTP
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_postcode_then_selection_over_http() {
    let server = MockServer::start().await;
    mount_token(&server, "tok", 1).await;

    Mock::given(method("GET"))
        .and(path("/broadband/address/SW1A1AA"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "addresses": [
                { "nad_key": "A0" },
                { "nad_key": "A1" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/broadband/availability"))
        .and(header("authorization", "Bearer tok"))
        .and(body_json(json!({ "nad_key": "A1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "products": [{ "name": "SOGEA 80" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let router = RequestRouter::new(
        Arc::new(client(&server)),
        Credentials::new("user", "pass"),
    );
    let session = VisitorSession::new(
        SessionId::generate(),
        SessionStore::new(StoreConfig::default()),
    );
    let slots: Option<&dyn SessionSlots> = Some(&session);

    let first = router
        .handle(&ProxyRequest::search("SW1A 1AA"), slots)
        .await
        .unwrap();
    assert!(matches!(first, ProxyResponse::Addresses(_)));

    let second = router
        .handle(&ProxyRequest::select(1), slots)
        .await
        .unwrap();
    let ProxyResponse::Availability(results) = second else {
        panic!("expected availability");
    };
    assert_eq!(results.products[0].name(), Some("SOGEA 80"));
}
