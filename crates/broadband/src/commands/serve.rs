//! Serve command - runs the proxy server.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use broadband_config::BroadbandConfig;
use broadband_proxy::SessionStore;
use broadband_server::{AppState, Server, ServerConfig};
use broadband_session::StoreConfig;
use clap::Args;
use tracing::info;

use super::Context;

/// Arguments for the serve command.
///
/// CLI arguments override config file values.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Config file (defaults to the discovered broadband.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to bind to (overrides config)
    #[arg(short, long)]
    pub bind: Option<SocketAddr>,
}

pub async fn run(args: ServeArgs, _ctx: &Context) -> Result<()> {
    let mut config = super::load_config(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }

    let router = super::build_router(&config)?;
    let mut state = AppState::new(router, server_config(&config));
    if config.session.enabled {
        state = state.with_sessions(SessionStore::new(store_config(&config)));
    } else {
        info!("Sessions disabled, running stateless");
    }

    Server::new(state)
        .run_with_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}

fn server_config(config: &BroadbandConfig) -> ServerConfig {
    ServerConfig::new()
        .with_bind_address(config.server.bind)
        .with_proxy_path(config.server.proxy_path.clone())
        .with_cors_origins(config.server.cors_origins.clone())
        .with_cookie_name(config.session.cookie_name.clone())
        .with_secure_cookies(config.session.secure_cookies)
}

fn store_config(config: &BroadbandConfig) -> StoreConfig {
    let store = StoreConfig::new()
        .with_max_sessions(config.session.max_sessions)
        .with_cleanup_interval(config.session.cleanup_interval());
    match config.session.ttl() {
        Some(ttl) => store.with_ttl(ttl),
        None => store.without_ttl(),
    }
}
