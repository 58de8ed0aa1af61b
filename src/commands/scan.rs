//! Scan command implementation
//!
//! Rebuilds the repository index without rendering the status table.
//! With `--fetch`, remotes are fetched first so the saved index carries
//! fresh fetch timestamps.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use console::style;

use repo_scout::fetch::Fetcher;
use repo_scout::git::GitClient;
use repo_scout::output;

use super::Context;

/// Arguments for the scan command
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Directory to scan (defaults to the configured base directory)
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Fetch remotes before saving the index
    #[arg(long)]
    pub fetch: bool,
}

pub async fn execute(ctx: &Context, args: ScanArgs) -> Result<()> {
    let scanner = ctx.scanner()?;
    let mut repos = scanner.scan(args.path.as_deref()).await?;

    if args.fetch {
        let fetcher = Fetcher::new(
            Arc::new(GitClient::new()),
            scanner.fetch_cache(),
            ctx.workers,
        );
        let results = fetcher.fetch_all(&repos).await?;
        for result in results.iter().filter(|r| r.attempted() && !r.success) {
            log::warn!(
                "fetch failed for {}: {}",
                result.repo_name,
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
        if !ctx.quiet {
            output::print_fetch_summary(&results);
        }

        let cache = scanner.fetch_cache();
        for repo in &mut repos {
            repo.last_fetch = cache.get(&repo.path);
        }
    }

    scanner.save_index(&repos)?;

    if !ctx.quiet {
        println!(
            "{} {} repositories indexed under {}",
            style("Scan complete:").bold(),
            repos.len(),
            scanner.config().base_dir.display()
        );
    }
    Ok(())
}
