//! Server configuration.

use std::net::SocketAddr;

/// Default path the widget posts its form to.
pub const DEFAULT_PROXY_PATH: &str = "/api.php";

/// Default session cookie name.
pub const DEFAULT_COOKIE_NAME: &str = "broadband_session";

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the server to.
    pub bind_address: SocketAddr,

    /// Path of the form-encoded proxy endpoint.
    pub proxy_path: String,

    /// CORS allowed origins (empty = no CORS).
    pub cors_origins: Vec<String>,

    /// Name of the cookie carrying the visitor's session id.
    pub cookie_name: String,

    /// Mark the session cookie `Secure`.
    pub secure_cookies: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 8080)),
            proxy_path: DEFAULT_PROXY_PATH.to_string(),
            cors_origins: Vec::new(),
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            secure_cookies: true,
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bind_address(mut self, addr: SocketAddr) -> Self {
        self.bind_address = addr;
        self
    }

    pub fn with_proxy_path(mut self, path: impl Into<String>) -> Self {
        self.proxy_path = path.into();
        self
    }

    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = origins;
        self
    }

    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }
}
