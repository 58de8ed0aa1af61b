//! Fetch command implementation
//!
//! Scans the base directory, then fetches every repository with a remote.
//! Results stream back as they complete and drive a progress bar; Ctrl-C
//! cancels the remaining work and reports what finished.

use anyhow::Result;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;

use repo_scout::fetch::Fetcher;
use repo_scout::output;

use super::Context;

/// Arguments for the fetch command
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Emit machine-readable JSON instead of the progress bar
    #[arg(long)]
    pub json: bool,
}

pub async fn execute(ctx: &Context, args: FetchArgs) -> Result<()> {
    let scanner = ctx.scanner()?;
    let repos = scanner.scan(None).await?;

    let fetcher = Fetcher::new(
        std::sync::Arc::new(repo_scout::git::GitClient::new()),
        scanner.fetch_cache(),
        ctx.workers,
    );

    if args.json {
        let results = fetcher.fetch_all(&repos).await?;
        output::print_json(&results)?;
        return exit_status(&results);
    }

    let with_remote = repos.iter().filter(|r| r.has_remote()).count();
    let bar = if ctx.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(with_remote as u64)
    };
    bar.set_style(
        ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );

    let cancel = CancellationToken::new();
    let guard = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            guard.cancel();
        }
    });

    let mut results = Vec::with_capacity(with_remote);
    let mut stream = fetcher.fetch_stream(repos, cancel.clone());
    while let Some(result) = stream.recv().await {
        bar.set_message(result.repo_name.clone());
        bar.inc(1);
        results.push(result);
    }
    bar.finish_and_clear();

    if cancel.is_cancelled() {
        println!("Interrupted, {} of {} fetches finished", results.len(), with_remote);
    }
    if !ctx.quiet {
        output::print_fetch_summary(&results);
    }
    exit_status(&results)
}

fn exit_status(results: &[repo_scout::fetch::FetchResult]) -> Result<()> {
    let (_, failed) = repo_scout::fetch::summarize(results);
    if failed > 0 {
        anyhow::bail!("{} fetches failed", failed);
    }
    Ok(())
}
