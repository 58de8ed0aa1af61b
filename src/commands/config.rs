//! Config command implementation
//!
//! Prints the resolved configuration and where it came from.

use anyhow::Result;
use clap::Args;
use console::style;

use repo_scout::output;
use repo_scout::Config;

use super::Context;

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Emit machine-readable JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute(ctx: &Context, args: ConfigArgs) -> Result<()> {
    let path = ctx
        .config_path
        .clone()
        .unwrap_or_else(Config::default_path);
    let config = ctx.load_config()?;

    if args.json {
        output::print_json(&config)?;
        return Ok(());
    }

    println!("{} {}", style("Config file:").bold(), path.display());
    println!();
    print!("{}", serde_yaml::to_string(&config)?);
    Ok(())
}
