//! Status command implementation
//!
//! Scans the base directory, saves the index and renders the grouped status
//! table (or JSON with `--json`).

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use repo_scout::output;

use super::Context;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Directory to scan (defaults to the configured base directory)
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Only show repositories with uncommitted changes
    #[arg(long)]
    pub dirty: bool,

    /// Only show repositories owned by this account
    #[arg(long, value_name = "NAME")]
    pub account: Option<String>,

    /// Emit machine-readable JSON instead of the table
    #[arg(long)]
    pub json: bool,
}

pub async fn execute(ctx: &Context, args: StatusArgs) -> Result<()> {
    let scanner = ctx.scanner()?;
    let mut repos = scanner.scan(args.path.as_deref()).await?;

    // Index always reflects the full scan, filters only affect display
    if let Err(err) = scanner.save_index(&repos) {
        log::warn!("could not save scan index: {}", err);
    }

    if args.dirty {
        repos.retain(|r| !r.is_clean);
    }
    if let Some(account) = &args.account {
        repos.retain(|r| &r.account == account);
    }

    if args.json {
        output::print_json(&repos)?;
    } else {
        output::print_table(&repos);
    }
    Ok(())
}
