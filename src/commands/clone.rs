//! Clone command implementation
//!
//! Accepts a full URL, an scp-style remote or a bare `owner/repo` shorthand
//! and clones it into the owner's place in the configured layout, rewriting
//! the remote to use the SSH host alias configured for that owner.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use console::style;

use repo_scout::git::GitClient;
use repo_scout::scanner;

use super::Context;

/// Arguments for the clone command
#[derive(Args, Debug)]
pub struct CloneArgs {
    /// Repository to clone (URL or owner/repo shorthand)
    #[arg(value_name = "REPO")]
    pub url: String,

    /// Clone into this directory instead of the configured layout
    #[arg(long, value_name = "PATH")]
    pub target: Option<PathBuf>,
}

pub async fn execute(ctx: &Context, args: CloneArgs) -> Result<()> {
    let config = ctx.load_config()?;
    let client = GitClient::new();
    let path = scanner::clone_repository(&client, &config, &args.url, args.target).await?;
    println!("{} {}", style("Cloned into").bold(), path.display());
    Ok(())
}
