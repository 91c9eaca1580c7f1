//! Configuration for the broadband availability proxy.
//!
//! Provides TOML-based configuration with:
//! - `[upstream]` API host, platform tag, timeout and credentials
//! - `[server]` bind address, proxy path and CORS origins
//! - `[session]` cookie and session store settings
//! - Credential resolution (env var → config file)
//!
//! Every section is optional; a missing file yields the defaults.

pub mod discovery;
pub mod error;
pub mod secrets;
pub mod types;

pub use discovery::{LoadedConfig, config_dir, config_path, load_config, load_config_file};
pub use error::{ConfigError, Result};
pub use secrets::{
    PASSWORD_ENV, ResolvedCredentials, ResolvedSecret, SecretSource, USERNAME_ENV,
    resolve_credentials, resolve_credentials_with,
};
pub use types::*;
