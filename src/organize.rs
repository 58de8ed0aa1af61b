//! # Layout Planning
//!
//! Computes (and optionally applies) the moves needed to bring repositories
//! into the canonical `{base_dir}/{folder}/{name}` layout.
//!
//! Planning is pure: it reads the scanned `Repository` set and the
//! configuration, produces [`MovePlan`]s, and can be re-run any number of
//! times without drift. A repository is a candidate only when all three hold:
//! - its folder is known (non-empty, not the `"unknown"` sentinel),
//! - its current path differs from the canonical path,
//! - its parent directory is exactly the base directory.
//!
//! The last rule is the idempotence boundary: repositories already nested in
//! some folder are left alone, even if that folder disagrees with the plan.
//!
//! Applying is per-candidate and never transactional. Each move creates the
//! destination's parent, refuses an existing destination unless `force` is
//! set (recording a conflict and moving on), and otherwise renames the
//! directory in one atomic step. With `force`, an existing destination is
//! deleted first. This is destructive and labeled as such in the CLI.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::Error;
use crate::repository::{Repository, ACCOUNT_UNKNOWN};

/// A proposed relocation; derived on every planning call, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovePlan {
    pub name: String,
    pub account: String,
    pub is_org: bool,
    pub old_path: PathBuf,
    pub new_path: PathBuf,
}

/// Per-candidate outcome of an apply pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizeResult {
    pub name: String,
    pub old_path: PathBuf,
    pub new_path: PathBuf,
    pub applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub dry_run: bool,
}

/// Aggregate outcome of an apply pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizeOutcome {
    pub moved: usize,
    pub failed: usize,
    pub results: Vec<OrganizeResult>,
}

/// Compute the moves needed to organize `repos` under the base directory.
pub fn plan(repos: &[Repository], config: &Config) -> Vec<MovePlan> {
    let mut plans = Vec::new();

    for repo in repos {
        if repo.folder_name.is_empty() || repo.folder_name == ACCOUNT_UNKNOWN {
            continue;
        }

        let canonical = config.base_dir.join(&repo.folder_name).join(&repo.name);
        if repo.path == canonical {
            continue;
        }

        // Only top-level, unorganized repositories are candidates
        if repo.path.parent() != Some(config.base_dir.as_path()) {
            continue;
        }

        plans.push(MovePlan {
            name: repo.name.clone(),
            account: repo.account.clone(),
            is_org: repo.is_org,
            old_path: repo.path.clone(),
            new_path: canonical,
        });
    }

    plans
}

/// Apply a set of move plans.
///
/// `dry_run` reports what would happen without touching the filesystem.
/// A failed candidate is recorded and the rest proceed; there is no rollback.
pub fn apply(plans: &[MovePlan], dry_run: bool, force: bool) -> OrganizeOutcome {
    let mut results = Vec::with_capacity(plans.len());
    let mut moved = 0;
    let mut failed = 0;

    for plan in plans {
        if dry_run {
            results.push(OrganizeResult {
                name: plan.name.clone(),
                old_path: plan.old_path.clone(),
                new_path: plan.new_path.clone(),
                applied: false,
                error: None,
                dry_run: true,
            });
            continue;
        }

        match apply_one(plan, force) {
            Ok(()) => {
                moved += 1;
                results.push(OrganizeResult {
                    name: plan.name.clone(),
                    old_path: plan.old_path.clone(),
                    new_path: plan.new_path.clone(),
                    applied: true,
                    error: None,
                    dry_run: false,
                });
            }
            Err(err) => {
                failed += 1;
                log::warn!("could not move {}: {}", plan.name, err);
                results.push(OrganizeResult {
                    name: plan.name.clone(),
                    old_path: plan.old_path.clone(),
                    new_path: plan.new_path.clone(),
                    applied: false,
                    error: Some(err.to_string()),
                    dry_run: false,
                });
            }
        }
    }

    OrganizeOutcome {
        moved,
        failed,
        results,
    }
}

fn apply_one(plan: &MovePlan, force: bool) -> crate::error::Result<()> {
    if let Some(parent) = plan.new_path.parent() {
        fs::create_dir_all(parent)?;
    }

    if plan.new_path.exists() {
        if !force {
            return Err(Error::DestinationConflict {
                name: plan.name.clone(),
                destination: plan.new_path.clone(),
            });
        }
        fs::remove_dir_all(&plan.new_path)?;
    }

    fs::rename(&plan.old_path, &plan.new_path)?;
    Ok(())
}
