//! # Repository Data Model
//!
//! The [`Repository`] record is the unit everything else operates on: one per
//! discovered working directory, produced by the status collector and treated
//! as immutable once a scan pass has emitted it. A record is only ever built
//! for a path confirmed to be a valid repository; collector failures drop
//! the path instead of emitting a partial record.
//!
//! [`ScanIndex`] is the point-in-time snapshot persisted after a scan. It is
//! purely a cache for downstream consumers (dashboards, shell helpers) and is
//! never read back into the live scan path except through an explicit
//! `load_index` call.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel branch name used when HEAD is detached or unreadable.
pub const BRANCH_UNKNOWN: &str = "unknown";
/// Sentinel remote URL used when no remote is configured.
pub const NO_REMOTE: &str = "no remote";
/// Sentinel commit summary used when the repository has no commits.
pub const NO_COMMITS: &str = "No commits";
/// Sentinel account used when the remote URL is unparseable.
pub const ACCOUNT_UNKNOWN: &str = "unknown";

/// Maximum displayed length of the last-commit summary.
const COMMIT_SUMMARY_MAX: usize = 60;

/// Status snapshot of one git working directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    /// Absolute path of the working directory; unique key within a scan.
    pub path: PathBuf,
    /// Last path segment.
    pub name: String,
    /// Owner (user or org) extracted from the remote URL.
    pub account: String,
    /// Canonical account/organization folder this repo belongs in.
    pub folder_name: String,
    /// Whether the owning account is an organization.
    pub is_org: bool,
    /// Remote URL, or [`NO_REMOTE`].
    pub remote_url: String,
    /// Current branch, or [`BRANCH_UNKNOWN`].
    pub branch: String,
    /// True iff `uncommitted == 0`.
    pub is_clean: bool,
    /// Number of working-tree changes reported by `status --porcelain`.
    pub uncommitted: usize,
    /// Commits ahead of upstream; 0 when no upstream is configured.
    pub ahead: usize,
    /// Commits behind upstream; 0 when no upstream is configured.
    pub behind: usize,
    /// Whether a remote-tracking branch is configured for the current branch.
    pub has_upstream: bool,
    /// Most recent commit summary, truncated, or [`NO_COMMITS`].
    pub last_commit: String,
    /// Whether the stash list is non-empty.
    pub has_stash: bool,
    /// Last fetch attempt, from the fetch-time cache (not from git).
    #[serde(default)]
    pub last_fetch: Option<DateTime<Utc>>,
    /// When this record was collected.
    pub scan_time: DateTime<Utc>,
}

impl Repository {
    /// Skeleton record for a path; fields start at their sentinels.
    pub fn new(path: &Path) -> Repository {
        Repository {
            path: path.to_path_buf(),
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            account: ACCOUNT_UNKNOWN.to_string(),
            folder_name: String::new(),
            is_org: false,
            remote_url: NO_REMOTE.to_string(),
            branch: BRANCH_UNKNOWN.to_string(),
            is_clean: true,
            uncommitted: 0,
            ahead: 0,
            behind: 0,
            has_upstream: false,
            last_commit: NO_COMMITS.to_string(),
            has_stash: false,
            last_fetch: None,
            scan_time: Utc::now(),
        }
    }

    /// Whether this repository has a configured remote.
    pub fn has_remote(&self) -> bool {
        self.remote_url != NO_REMOTE
    }
}

/// Truncate a commit summary for display, appending `...` when cut.
pub fn truncate_summary(summary: &str) -> String {
    if summary.chars().count() <= COMMIT_SUMMARY_MAX {
        return summary.to_string();
    }
    let head: String = summary.chars().take(COMMIT_SUMMARY_MAX - 3).collect();
    format!("{}...", head)
}

/// Persisted scan snapshot: `{base_dir}/.repo-scout-index.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanIndex {
    pub last_scan: DateTime<Utc>,
    pub repositories: Vec<Repository>,
}
