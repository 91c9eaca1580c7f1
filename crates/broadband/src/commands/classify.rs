//! Classify command - shows how a search string is routed.

use anyhow::Result;
use broadband_proxy::classify;
use clap::Args;

use super::Context;

/// Arguments for the classify command.
#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Postcode, phone number or ALID as a visitor would type it
    pub input: String,
}

pub fn run(args: ClassifyArgs, ctx: &Context) -> Result<()> {
    let classified = classify(&args.input);

    if ctx.json_output {
        let output = serde_json::json!({
            "kind": classified.kind(),
            "value": classified.value(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        match classified.value() {
            Some(value) => println!("{}: {}", classified.kind(), value),
            None => println!("{}", classified.kind()),
        }
    }

    Ok(())
}
