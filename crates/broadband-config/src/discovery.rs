//! Config file discovery.
//!
//! Resolution order (first hit wins):
//! 1. Explicit path (`--config`)
//! 2. `$BROADBAND_CONFIG_DIR/broadband.toml`
//! 3. `<platform config dir>/broadband/broadband.toml`
//!
//! A discovered path that does not exist yields the defaults; an explicit
//! path that does not exist is an error.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{BroadbandConfig, ConfigError, Result};

/// Config filename within the config directory.
const CONFIG_FILE: &str = "broadband.toml";

/// Application name for platform directory resolution.
const APP_NAME: &str = "broadband";

/// Environment variable to override the config directory.
const CONFIG_DIR_ENV: &str = "BROADBAND_CONFIG_DIR";

/// Result of config discovery and loading.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: BroadbandConfig,
    /// File the config came from, `None` when running on defaults.
    pub source: Option<PathBuf>,
    /// Warnings generated during loading (e.g., plaintext password).
    pub warnings: Vec<String>,
}

/// Load configuration from `explicit` or the discovered location.
pub fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig> {
    let (config, source) = match explicit {
        Some(path) => (load_config_file(path)?, Some(path.to_path_buf())),
        None => match config_path().filter(|p| p.is_file()) {
            Some(path) => (load_config_file(&path)?, Some(path)),
            None => {
                debug!("No config file found, using defaults");
                (BroadbandConfig::default(), None)
            }
        },
    };

    let mut warnings = Vec::new();
    if config.upstream.has_plaintext_password() {
        warnings.push(
            "Upstream password is stored in plaintext in the config file. \
             Consider setting BROADBAND_API_PASSWORD instead."
                .to_string(),
        );
    }

    Ok(LoadedConfig {
        config,
        source,
        warnings,
    })
}

/// Load config from a specific file path (no discovery).
pub fn load_config_file(path: &Path) -> Result<BroadbandConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;
    debug!(path = %path.display(), "Loaded config file");
    BroadbandConfig::from_toml(&contents)
}

/// Discovered config file path.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join(CONFIG_FILE))
}

/// Config directory: `BROADBAND_CONFIG_DIR` if set and non-empty, else the
/// platform default.
pub fn config_dir() -> Option<PathBuf> {
    match std::env::var(CONFIG_DIR_ENV) {
        Ok(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => dirs::config_dir().map(|d| d.join(APP_NAME)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_explicit_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[upstream]\nplatform = \"TEST\"\n").unwrap();

        let loaded = load_config(Some(&path)).unwrap();
        assert_eq!(loaded.config.upstream.platform, "TEST");
        assert_eq!(loaded.source.as_deref(), Some(path.as_path()));
        assert!(loaded.warnings.is_empty());
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        let err = load_config(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[upstream\nplatform = ").unwrap();

        let err = load_config_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_plaintext_password_warns() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broadband.toml");
        std::fs::write(&path, "[upstream]\nusername = \"u\"\npassword = \"p\"\n").unwrap();

        let loaded = load_config(Some(&path)).unwrap();
        assert_eq!(loaded.warnings.len(), 1);
        assert!(loaded.warnings[0].contains("BROADBAND_API_PASSWORD"));
    }

    #[test]
    fn test_config_path_ends_with_filename() {
        if let Some(path) = config_path() {
            assert!(path.ends_with(CONFIG_FILE));
        }
    }
}
