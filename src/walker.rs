//! # Repository Discovery
//!
//! Walks a directory tree and returns every repository root it finds, that
//! is, every directory directly containing a `.git` metadata directory.
//!
//! Pruning rules keep the walk cheap on real project trees:
//! - hidden directories are not entered (except `.git` itself, which marks a
//!   root and is never descended into),
//! - well-known dependency/output directories (`node_modules`, `vendor`,
//!   `target`) are skipped,
//! - traversal is capped at 4 path segments below the root. Repositories
//!   nested deeper than that are not discovered; this is a known, accepted
//!   limitation that bounds the cost of pathological trees.
//!
//! Unreadable directories are skipped with a debug log: a permission error
//! somewhere under the root must never abort the whole walk. Only a missing
//! or non-directory root is a hard error.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Directory names that are never worth descending into.
const PRUNED_DIRS: &[&str] = &["node_modules", "vendor", "target"];

/// Maximum depth, in path segments relative to the root, of the walk.
const MAX_DEPTH: usize = 4;

/// Find all repository roots under `root`.
///
/// The returned order is discovery order and carries no guarantee.
pub fn find_repositories(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(Error::Discovery {
            path: root.to_path_buf(),
            message: "search root does not exist or is not a directory".to_string(),
        });
    }

    let mut repos = Vec::new();
    let mut walk = WalkDir::new(root).max_depth(MAX_DEPTH).into_iter();

    loop {
        let entry = match walk.next() {
            None => break,
            Some(Ok(entry)) => entry,
            Some(Err(err)) => {
                log::debug!("skipping unreadable entry during walk: {}", err);
                continue;
            }
        };

        if !entry.file_type().is_dir() || entry.depth() == 0 {
            continue;
        }

        let name = entry.file_name().to_string_lossy();

        if name == ".git" {
            if let Some(parent) = entry.path().parent() {
                repos.push(parent.to_path_buf());
            }
            walk.skip_current_dir();
            continue;
        }

        if name.starts_with('.') || PRUNED_DIRS.contains(&name.as_ref()) {
            walk.skip_current_dir();
        }
    }

    Ok(repos)
}
