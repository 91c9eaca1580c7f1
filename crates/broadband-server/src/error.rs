//! Error types for the server.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use broadband_proxy::ProxyError;
use serde::Serialize;
use thiserror::Error;

/// Server error type.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Malformed request.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Proxy error.
    #[error(transparent)]
    Proxy(#[from] ProxyError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        // The widget treats `null` as "nothing to show" and lets the
        // visitor try again.
        if let ServerError::Proxy(e) = &self
            && e.is_recoverable()
        {
            return (StatusCode::OK, Json(serde_json::Value::Null)).into_response();
        }

        let (status, code) = match &self {
            ServerError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ServerError::Proxy(_) => (StatusCode::BAD_GATEWAY, "upstream_error"),
            ServerError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let body = ErrorResponse {
            code: code.to_string(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use broadband_proxy::{Operation, SessionSlot};

    async fn body_json(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_recoverable_proxy_error_is_null() {
        let response = ServerError::from(ProxyError::SessionStateMissing {
            slot: SessionSlot::AddressList,
        })
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::Value::Null);
    }

    #[tokio::test]
    async fn test_upstream_error_is_bad_gateway() {
        let response = ServerError::from(ProxyError::Upstream {
            operation: Operation::SearchByPostcode,
            status: Some(500),
            message: "HTTP 500: boom".into(),
        })
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(response).await;
        assert_eq!(body["code"], "upstream_error");
        assert!(body["message"].as_str().unwrap().contains("postcode search"));
    }

    #[tokio::test]
    async fn test_bad_request() {
        let response = ServerError::BadRequest("nope".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "bad_request");
    }
}
