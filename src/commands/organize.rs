//! Organize command implementation
//!
//! Computes a move plan from the latest scan and applies it. Destructive
//! steps only happen with `--force`, and the plan is confirmed interactively
//! unless `--yes` is passed.

use anyhow::Result;
use clap::Args;
use dialoguer::Confirm;

use repo_scout::{organize, output};

use super::Context;

/// Arguments for the organize command
#[derive(Args, Debug)]
pub struct OrganizeArgs {
    /// Show the plan without moving anything
    #[arg(long)]
    pub dry_run: bool,

    /// Replace existing destination directories
    #[arg(long)]
    pub force: bool,

    /// Apply without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Emit the outcome as machine-readable JSON (reports only unless --yes)
    #[arg(long)]
    pub json: bool,
}

pub async fn execute(ctx: &Context, args: OrganizeArgs) -> Result<()> {
    let scanner = ctx.scanner()?;
    let repos = scanner.scan(None).await?;
    let plans = organize::plan(&repos, scanner.config());

    if !args.json && !ctx.quiet {
        output::print_move_plans(&plans);
    }
    if plans.is_empty() {
        if args.json {
            output::print_json(&organize::apply(&plans, true, false))?;
        }
        return Ok(());
    }

    if !args.dry_run && !args.yes && !args.json {
        let proceed = Confirm::new()
            .with_prompt(format!("Move {} repositories?", plans.len()))
            .default(false)
            .interact()?;
        if !proceed {
            println!("Aborted");
            return Ok(());
        }
    }

    // JSON mode never prompts, so without an explicit --yes it only reports.
    let dry_run = args.dry_run || (args.json && !args.yes);
    let outcome = organize::apply(&plans, dry_run, args.force);

    if args.json {
        output::print_json(&outcome)?;
    } else if !ctx.quiet {
        output::print_organize_outcome(&outcome);
    }

    if outcome.failed > 0 {
        anyhow::bail!("{} repositories could not be moved", outcome.failed);
    }
    Ok(())
}
