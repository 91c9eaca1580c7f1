//! Lookup command - one stateless search, for checking credentials and
//! upstream connectivity.

use std::path::PathBuf;

use anyhow::{Result, bail};
use broadband_proxy::ProxyRequest;
use clap::Args;
use tracing::warn;

use super::Context;

/// Arguments for the lookup command.
#[derive(Args, Debug)]
pub struct LookupArgs {
    /// Postcode, phone number or ALID
    pub input: String,

    /// Config file (defaults to the discovered broadband.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

pub async fn run(args: LookupArgs, _ctx: &Context) -> Result<()> {
    let config = super::load_config(args.config.as_deref())?;
    let router = super::build_router(&config)?;

    match router.handle(&ProxyRequest::search(&args.input), None).await {
        Ok(response) => {
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Err(e) if e.is_recoverable() => {
            warn!(error = %e, "Nothing to look up");
            println!("null");
            Ok(())
        }
        Err(e) => bail!(e),
    }
}
