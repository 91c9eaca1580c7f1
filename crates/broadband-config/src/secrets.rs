//! Upstream credential resolution.
//!
//! Resolution order:
//! 1. Environment variable
//! 2. Config file (with warning)

use std::fmt;

use crate::{ConfigError, Result, UpstreamSection};

/// Environment variable holding the upstream username.
pub const USERNAME_ENV: &str = "BROADBAND_API_USERNAME";

/// Environment variable holding the upstream password.
pub const PASSWORD_ENV: &str = "BROADBAND_API_PASSWORD";

/// Result of secret resolution with provenance.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedSecret {
    pub value: String,
    pub source: SecretSource,
}

impl fmt::Debug for ResolvedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedSecret")
            .field("value", &"[redacted]")
            .field("source", &self.source)
            .finish()
    }
}

/// Where a secret was resolved from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretSource {
    EnvVar(String),
    /// Config file (plaintext, not recommended for the password).
    ConfigFile,
}

impl fmt::Display for SecretSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretSource::EnvVar(var) => write!(f, "env var {}", var),
            SecretSource::ConfigFile => write!(f, "config file (plaintext)"),
        }
    }
}

/// Username and password for the upstream credential exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCredentials {
    pub username: ResolvedSecret,
    pub password: ResolvedSecret,
}

/// Resolve both credentials from the process environment and `section`.
pub fn resolve_credentials(section: &UpstreamSection) -> Result<ResolvedCredentials> {
    resolve_credentials_with(section, |var| std::env::var(var).ok())
}

/// Same as [`resolve_credentials`] with an injectable environment lookup.
pub fn resolve_credentials_with(
    section: &UpstreamSection,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ResolvedCredentials> {
    let username = resolve_secret(USERNAME_ENV, section.username.as_deref(), &env).ok_or_else(
        || ConfigError::MissingCredentials {
            field: "username".to_string(),
            env_var: USERNAME_ENV.to_string(),
        },
    )?;
    let password = resolve_secret(PASSWORD_ENV, section.password.as_deref(), &env).ok_or_else(
        || ConfigError::MissingCredentials {
            field: "password".to_string(),
            env_var: PASSWORD_ENV.to_string(),
        },
    )?;

    Ok(ResolvedCredentials { username, password })
}

fn resolve_secret(
    env_var: &str,
    config_value: Option<&str>,
    env: &impl Fn(&str) -> Option<String>,
) -> Option<ResolvedSecret> {
    if let Some(value) = env(env_var).filter(|v| !v.is_empty()) {
        return Some(ResolvedSecret {
            value,
            source: SecretSource::EnvVar(env_var.to_string()),
        });
    }

    config_value
        .filter(|v| !v.is_empty())
        .map(|v| ResolvedSecret {
            value: v.to_string(),
            source: SecretSource::ConfigFile,
        })
}
