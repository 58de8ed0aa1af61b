//! # Terminal Rendering
//!
//! All human-facing rendering lives here and in the command layer; the scan,
//! fetch and organize engines never print. Output uses the `console` crate so
//! color degrades cleanly on non-TTY output and respects `NO_COLOR`.

use std::collections::BTreeMap;

use chrono::Utc;
use console::style;
use serde::Serialize;

use crate::fetch::{self, FetchResult};
use crate::organize::{MovePlan, OrganizeOutcome};
use crate::repository::Repository;

/// Print any serializable value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> crate::error::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Render the repository status table, grouped by account.
pub fn print_table(repos: &[Repository]) {
    if repos.is_empty() {
        println!("No repositories found");
        return;
    }

    let mut total = 0;
    let mut clean = 0;
    let mut dirty = 0;
    let mut ahead = 0;
    let mut behind = 0;
    for repo in repos {
        total += 1;
        if repo.is_clean && repo.ahead == 0 && repo.behind == 0 {
            clean += 1;
        }
        if !repo.is_clean {
            dirty += 1;
        }
        if repo.ahead > 0 {
            ahead += 1;
        }
        if repo.behind > 0 {
            behind += 1;
        }
    }

    println!(
        "{} {} total | {} clean | {} changes | {} ahead | {} behind",
        style("Repository status:").bold(),
        total,
        style(clean).green(),
        style(dirty).yellow(),
        style(ahead).blue(),
        style(behind).cyan(),
    );

    let mut grouped: BTreeMap<&str, Vec<&Repository>> = BTreeMap::new();
    for repo in repos {
        grouped.entry(repo.account.as_str()).or_default().push(repo);
    }

    for (account, group) in &grouped {
        if grouped.len() > 1 {
            println!("\n{} ({})", style(account).bold(), group.len());
        } else {
            println!();
        }
        println!(
            "  {}  {:<30} {:<10} {:<8} {:<14} {}",
            " ", "Repository", "Status", "Changes", "Sync", "Last commit"
        );
        for repo in group {
            println!("{}", format_row(repo));
        }
    }

    show_fetch_hint(repos);
}

fn format_row(repo: &Repository) -> String {
    let icon = if !repo.is_clean {
        style("●").yellow().to_string()
    } else if repo.ahead > 0 {
        style("↑").blue().to_string()
    } else if repo.behind > 0 {
        style("↓").cyan().to_string()
    } else {
        style("✓").green().to_string()
    };

    let mut name = repo.name.clone();
    if name.chars().count() > 30 {
        name = format!("{}...", name.chars().take(27).collect::<String>());
    }

    let status = if repo.is_clean {
        "clean".to_string()
    } else {
        style(format!("{} files", repo.uncommitted)).yellow().to_string()
    };

    let changes = if repo.has_stash {
        style("stash").magenta().to_string()
    } else {
        String::new()
    };

    let sync = if repo.ahead > 0 || repo.behind > 0 {
        let mut parts = Vec::new();
        if repo.ahead > 0 {
            parts.push(style(format!("↑{}", repo.ahead)).blue().to_string());
        }
        if repo.behind > 0 {
            parts.push(style(format!("↓{}", repo.behind)).cyan().to_string());
        }
        parts.join(" ")
    } else if !repo.has_upstream {
        style("no upstream").dim().to_string()
    } else {
        "synced".to_string()
    };

    let mut last_commit = repo.last_commit.clone();
    if last_commit.chars().count() > 40 {
        last_commit = format!("{}...", last_commit.chars().take(37).collect::<String>());
    }
    if let Some(fetched) = repo.last_fetch {
        let age = Utc::now() - fetched;
        if age.num_hours() >= 1 {
            last_commit = format!(
                "{} {}",
                last_commit,
                style(format!("({}h old)", age.num_hours())).dim()
            );
        }
    }

    format!(
        "  {}  {:<30} {:<10} {:<8} {:<14} {}",
        icon, name, status, changes, sync, last_commit
    )
}

fn show_fetch_hint(repos: &[Repository]) {
    let needs_fetch = repos
        .iter()
        .filter(|r| match r.last_fetch {
            None => true,
            Some(fetched) => (Utc::now() - fetched).num_hours() >= 24,
        })
        .count();

    if needs_fetch > 0 {
        println!(
            "\n{} {} repositories need updating. Run '{}' to update remote info.",
            style("Tip:").yellow(),
            needs_fetch,
            style("repo-scout fetch").bold()
        );
    }
}

/// One-line summary after a fetch pass.
pub fn print_fetch_summary(results: &[FetchResult]) {
    let (succeeded, failed) = fetch::summarize(results);
    let total_ms: u64 = results.iter().map(|r| r.duration_ms).sum();
    println!(
        "\n{} {} succeeded, {} failed in {:.1}s",
        style("Fetch complete:").bold(),
        style(succeeded).green(),
        if failed > 0 {
            style(failed).red().to_string()
        } else {
            failed.to_string()
        },
        total_ms as f64 / 1000.0
    );
}

/// Render a move plan for review.
pub fn print_move_plans(plans: &[MovePlan]) {
    if plans.is_empty() {
        println!("Everything is already organized");
        return;
    }

    println!("{} {} repositories to move:\n", style("Plan:").bold(), plans.len());
    for plan in plans {
        let tag = if plan.is_org { "org" } else { "user" };
        println!(
            "  {:<30} {} -> {}  [{} {}]",
            plan.name,
            plan.old_path.display(),
            plan.new_path.display(),
            tag,
            plan.account
        );
    }
}

/// Render per-candidate organize results plus the tallies.
pub fn print_organize_outcome(outcome: &OrganizeOutcome) {
    for result in &outcome.results {
        if result.dry_run {
            println!(
                "  {} {} -> {}",
                style("would move").dim(),
                result.old_path.display(),
                result.new_path.display()
            );
        } else if result.applied {
            println!(
                "  {} {} -> {}",
                style("moved").green(),
                result.old_path.display(),
                result.new_path.display()
            );
        } else {
            println!(
                "  {} {}: {}",
                style("failed").red(),
                result.name,
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    println!(
        "\n{} {} moved, {} failed",
        style("Organize complete:").bold(),
        outcome.moved,
        outcome.failed
    );
}
