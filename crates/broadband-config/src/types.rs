//! Configuration types.

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.interdns.co.uk";
pub const DEFAULT_PLATFORM: &str = "LIVE";
pub const DEFAULT_PROXY_PATH: &str = "/api.php";
pub const DEFAULT_COOKIE_NAME: &str = "broadband_session";

/// Root configuration (`broadband.toml`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BroadbandConfig {
    pub upstream: UpstreamSection,
    pub server: ServerSection,
    pub session: SessionSection,
}

impl BroadbandConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject values that parse but cannot be used.
    pub fn validate(&self) -> Result<()> {
        if self.upstream.base_url.trim().is_empty() {
            return Err(invalid("upstream.base_url", "must not be empty"));
        }
        if self.upstream.platform.trim().is_empty() {
            return Err(invalid("upstream.platform", "must not be empty"));
        }
        if self.upstream.timeout_secs == 0 {
            return Err(invalid("upstream.timeout_secs", "must be greater than zero"));
        }
        if !self.server.proxy_path.starts_with('/') {
            return Err(invalid("server.proxy_path", "must start with '/'"));
        }
        if self.server.proxy_path == "/health" {
            return Err(invalid("server.proxy_path", "conflicts with /health"));
        }
        if self.session.cookie_name.trim().is_empty() {
            return Err(invalid("session.cookie_name", "must not be empty"));
        }
        if self.session.max_sessions == 0 {
            return Err(invalid("session.max_sessions", "must be greater than zero"));
        }
        if self.session.cleanup_interval_secs == 0 {
            return Err(invalid(
                "session.cleanup_interval_secs",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        message: message.to_string(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// [upstream]
// ─────────────────────────────────────────────────────────────────────────────

/// Upstream availability API.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamSection {
    pub base_url: String,
    /// Platform tag sent with every call (`LIVE` or `TEST`).
    pub platform: String,
    pub timeout_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Plaintext password. Prefer the environment variable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl Default for UpstreamSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            platform: DEFAULT_PLATFORM.to_string(),
            timeout_secs: 30,
            username: None,
            password: None,
        }
    }
}

impl UpstreamSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn has_plaintext_password(&self) -> bool {
        self.password.as_deref().is_some_and(|p| !p.is_empty())
    }
}

impl fmt::Debug for UpstreamSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamSection")
            .field("base_url", &self.base_url)
            .field("platform", &self.platform)
            .field("timeout_secs", &self.timeout_secs)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// [server]
// ─────────────────────────────────────────────────────────────────────────────

/// HTTP entry point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind: SocketAddr,
    /// Path the widget posts its form to.
    pub proxy_path: String,
    /// Allowed CORS origins. Empty disables CORS headers.
    pub cors_origins: Vec<String>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            proxy_path: DEFAULT_PROXY_PATH.to_string(),
            cors_origins: Vec::new(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// [session]
// ─────────────────────────────────────────────────────────────────────────────

/// Visitor sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    /// `false` runs stateless: no cookie, a token exchange per request and
    /// no address selection.
    pub enabled: bool,
    pub cookie_name: String,
    /// Idle lifetime in seconds. `0` keeps sessions until evicted.
    pub ttl_secs: u64,
    pub max_sessions: usize,
    pub secure_cookies: bool,
    pub cleanup_interval_secs: u64,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            enabled: true,
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            ttl_secs: 1440,
            max_sessions: 10_000,
            secure_cookies: true,
            cleanup_interval_secs: 60,
        }
    }
}

impl SessionSection {
    pub fn ttl(&self) -> Option<Duration> {
        (self.ttl_secs > 0).then(|| Duration::from_secs(self.ttl_secs))
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = BroadbandConfig::from_toml("").unwrap();
        assert_eq!(config, BroadbandConfig::default());
        assert_eq!(config.upstream.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.upstream.platform, "LIVE");
        assert_eq!(config.upstream.timeout(), Duration::from_secs(30));
        assert_eq!(config.server.bind.to_string(), "127.0.0.1:8080");
        assert_eq!(config.server.proxy_path, "/api.php");
        assert!(config.session.enabled);
        assert_eq!(config.session.ttl(), Some(Duration::from_secs(1440)));
    }

    #[test]
    fn test_full_config() {
        let toml = r#"
[upstream]
base_url = "http://localhost:9999"
platform = "TEST"
timeout_secs = 5
username = "reseller"
password = "secret"

[server]
bind = "0.0.0.0:3000"
proxy_path = "/broadband"
cors_origins = ["https://shop.example"]

[session]
enabled = false
cookie_name = "bb"
ttl_secs = 0
max_sessions = 50
secure_cookies = false
cleanup_interval_secs = 10
"#;
        let config = BroadbandConfig::from_toml(toml).unwrap();
        assert_eq!(config.upstream.platform, "TEST");
        assert_eq!(config.upstream.username.as_deref(), Some("reseller"));
        assert!(config.upstream.has_plaintext_password());
        assert_eq!(config.server.bind.port(), 3000);
        assert_eq!(config.server.cors_origins, vec!["https://shop.example"]);
        assert!(!config.session.enabled);
        assert_eq!(config.session.ttl(), None);
        assert_eq!(config.session.max_sessions, 50);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config = BroadbandConfig::from_toml("[upstream]\nplatform = \"TEST\"\n").unwrap();
        assert_eq!(config.upstream.platform, "TEST");
        assert_eq!(config.upstream.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.session, SessionSection::default());
    }

    #[test]
    fn test_rejects_relative_proxy_path() {
        let err = BroadbandConfig::from_toml("[server]\nproxy_path = \"api.php\"\n").unwrap_err();
        assert!(err.to_string().contains("server.proxy_path"));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        assert!(BroadbandConfig::from_toml("[upstream]\ntimeout_secs = 0\n").is_err());
    }

    #[test]
    fn test_rejects_bad_bind() {
        let err = BroadbandConfig::from_toml("[server]\nbind = \"localhost\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_debug_redacts_password() {
        let section = UpstreamSection {
            password: Some("hunter2".into()),
            ..Default::default()
        };
        assert!(!format!("{:?}", section).contains("hunter2"));
    }

    #[test]
    fn test_toml_roundtrip_omits_missing_credentials() {
        let toml = BroadbandConfig::default().to_toml().unwrap();
        assert!(!toml.contains("password"));
        let back = BroadbandConfig::from_toml(&toml).unwrap();
        assert_eq!(back, BroadbandConfig::default());
    }
}
