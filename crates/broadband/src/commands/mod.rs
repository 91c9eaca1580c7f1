//! CLI command handlers.

pub mod classify;
pub mod lookup;
pub mod serve;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context as _, Result, anyhow};
use broadband_config::{BroadbandConfig, LoadedConfig};
use broadband_proxy::{Credentials, Platform, RequestRouter, UpstreamClient, UpstreamConfig};
use tracing::{info, warn};

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Output as JSON for scripting.
    pub json_output: bool,
}

/// Load config from `path` or the discovered location, logging warnings.
pub fn load_config(path: Option<&Path>) -> Result<BroadbandConfig> {
    let LoadedConfig {
        config,
        source,
        warnings,
    } = broadband_config::load_config(path).context("failed to load configuration")?;

    match &source {
        Some(path) => info!(path = %path.display(), "Using config file"),
        None => info!("No config file, using defaults"),
    }
    for warning in &warnings {
        warn!("{}", warning);
    }
    Ok(config)
}

/// Build the request router for `config`: resolve credentials and create
/// the upstream client.
pub fn build_router(config: &BroadbandConfig) -> Result<RequestRouter> {
    let resolved = broadband_config::resolve_credentials(&config.upstream)?;
    info!(
        username_source = %resolved.username.source,
        password_source = %resolved.password.source,
        "Resolved upstream credentials"
    );

    let platform: Platform = config
        .upstream
        .platform
        .parse()
        .map_err(|e: String| anyhow!(e))
        .context("invalid upstream.platform")?;

    let upstream = UpstreamClient::new(
        UpstreamConfig::new(config.upstream.base_url.clone())
            .with_platform(platform)
            .with_timeout(config.upstream.timeout()),
    );
    info!(
        base_url = %config.upstream.base_url,
        platform = %platform,
        "Upstream configured"
    );

    Ok(RequestRouter::new(
        Arc::new(upstream),
        Credentials::new(resolved.username.value, resolved.password.value),
    ))
}
