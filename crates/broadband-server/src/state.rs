//! Application state shared across handlers.

use std::sync::Arc;

use broadband_proxy::{RequestRouter, SessionStore};

use crate::config::ServerConfig;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<RequestRouter>,

    pub config: Arc<ServerConfig>,

    /// Visitor sessions. `None` runs every request statelessly.
    pub sessions: Option<SessionStore>,
}

impl AppState {
    /// Stateless application state.
    pub fn new(router: RequestRouter, config: ServerConfig) -> Self {
        Self {
            router: Arc::new(router),
            config: Arc::new(config),
            sessions: None,
        }
    }

    /// Keep per-visitor tokens and address searches in `store`.
    pub fn with_sessions(mut self, store: SessionStore) -> Self {
        self.sessions = Some(store);
        self
    }
}
