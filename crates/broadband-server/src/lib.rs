//! HTTP entry point for the broadband availability proxy.
//!
//! Serves the form endpoint the search widget posts to, keeps a
//! cookie-keyed session per visitor and exposes a health check.
//!
//! # Example
//!
//! ```ignore
//! use broadband_server::{AppState, Server, ServerConfig};
//!
//! let state = AppState::new(router, ServerConfig::new()).with_sessions(store);
//! Server::new(state).run_with_shutdown(shutdown_signal()).await?;
//! ```

pub mod config;
pub mod error;
pub mod routes;
pub mod session;
pub mod state;

pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use routes::HealthResponse;
pub use state::AppState;

use std::future::Future;
use std::net::SocketAddr;

use axum::Router;
use axum::http::{HeaderValue, Method};
use axum::routing::post;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// The proxy HTTP server.
pub struct Server {
    state: AppState,
}

impl Server {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Build the router with all routes and middleware.
    pub fn router(&self) -> Router {
        let mut router = Router::new()
            .merge(routes::health_routes())
            .route(&self.state.config.proxy_path, post(routes::proxy_handler))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone());

        if let Some(cors) = cors_layer(&self.state.config.cors_origins) {
            router = router.layer(cors);
        }

        router
    }

    /// Serve on the configured address until `shutdown` resolves.
    pub async fn run_with_shutdown(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<()> {
        let listener = TcpListener::bind(self.state.config.bind_address)
            .await
            .map_err(|e| ServerError::Internal(format!("Failed to bind: {}", e)))?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener (useful for tests).
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<()> {
        let addr = listener
            .local_addr()
            .map_err(|e| ServerError::Internal(format!("Failed to read address: {}", e)))?;
        info!(
            addr = %addr,
            path = %self.state.config.proxy_path,
            sessions = self.state.sessions.is_some(),
            "Starting broadband proxy"
        );

        let cleanup = self
            .state
            .sessions
            .as_ref()
            .map(|store| store.spawn_cleanup_task());

        let result = axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ServerError::Internal(format!("Server error: {}", e)));

        if let Some(task) = cleanup {
            task.abort();
        }
        info!("Server stopped");
        result
    }

    pub fn bind_address(&self) -> SocketAddr {
        self.state.config.bind_address
    }
}

/// `None` when no origins are configured. `"*"` allows any origin but
/// then the browser will not send the session cookie cross-site.
fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    if origins.is_empty() {
        return None;
    }

    let layer = CorsLayer::new().allow_methods([Method::GET, Method::POST]);
    if origins.iter().any(|o| o == "*") {
        return Some(layer.allow_origin(Any).allow_headers(Any));
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    Some(
        layer
            .allow_origin(AllowOrigin::list(allowed))
            .allow_headers([axum::http::header::CONTENT_TYPE])
            .allow_credentials(true),
    )
}
