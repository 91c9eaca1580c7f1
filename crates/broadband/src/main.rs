//! Broadband availability proxy
//!
//! Main entry point for the `broadband` CLI.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{classify, lookup, serve};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Broadband availability proxy
#[derive(Parser)]
#[command(name = "broadband")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Also write JSON logs, rotated daily, to this directory
    #[arg(long, global = true, env = "BROADBAND_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the proxy server
    Serve(serve::ServeArgs),

    /// Show how a search string would be classified (offline)
    Classify(classify::ClassifyArgs),

    /// Run one stateless search against the upstream API
    Lookup(lookup::LookupArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Console (human-readable) + optional rotating JSON file
    let filter = if cli.verbose {
        "broadband=debug,broadband_proxy=debug,broadband_server=debug,broadband_session=debug,broadband_config=debug,tower_http=debug,info"
    } else {
        "broadband=info,broadband_proxy=info,broadband_server=info,broadband_config=info,warn"
    };

    let (file_layer, _guard) = match &cli.log_dir {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, "broadband.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            (Some(non_blocking), Some(guard))
        }
        None => (None, None),
    };

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(file_layer.map(|writer| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "broadband=trace,broadband_proxy=trace,broadband_server=trace,broadband_session=trace,broadband_config=trace,info",
                ))
        }))
        .init();

    let ctx = commands::Context {
        json_output: cli.json,
    };

    match cli.command {
        Commands::Serve(args) => serve::run(args, &ctx).await,
        Commands::Classify(args) => classify::run(args, &ctx),
        Commands::Lookup(args) => lookup::run(args, &ctx).await,
    }
}
