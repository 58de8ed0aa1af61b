//! # Git Subprocess Port
//!
//! repo-scout never links a git library; it drives the system `git`
//! executable, which transparently picks up SSH keys, credential helpers and
//! host aliases from the user's environment. This module owns that boundary.
//!
//! The [`VersionControlPort`] trait is the narrow seam the rest of the crate
//! talks to: one method per read-only query, plus `fetch`. Keeping the seam
//! this small makes the scan and fetch pipelines testable against an
//! in-memory fake without threading subprocess concerns through them.
//!
//! Every invocation is `git -C <path> <args...>` with stdout captured as
//! UTF-8 and a hard 5 second wall-clock deadline. A nonzero exit or any
//! stderr output maps to [`Error::CommandFailed`]; blowing the deadline maps
//! to [`Error::CommandTimeout`] and the child is killed.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;

use crate::error::{Error, Result};
use crate::repository::ACCOUNT_UNKNOWN;

/// Default per-invocation deadline.
pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(5);

/// Read-only queries (plus fetch) the scan and fetch pipelines need.
#[async_trait]
pub trait VersionControlPort: Send + Sync {
    /// Cheap validity check; false means the path is not a repository root.
    async fn is_repository(&self, path: &Path) -> bool;

    /// Name of the currently checked-out branch.
    async fn current_branch(&self, path: &Path) -> Result<String>;

    /// URL of the `origin` remote.
    async fn remote_url(&self, path: &Path) -> Result<String>;

    /// Symbolic name of the upstream tracking branch, if one is configured.
    async fn upstream_branch(&self, path: &Path) -> Result<String>;

    /// Number of working-tree changes (staged, unstaged and untracked).
    async fn change_count(&self, path: &Path) -> Result<usize>;

    /// `(ahead, behind)` relative to upstream. Only valid with an upstream.
    async fn ahead_behind(&self, path: &Path) -> Result<(usize, usize)>;

    /// Most recent commit as `<relative time>: <subject>`, truncated.
    async fn last_commit_summary(&self, path: &Path) -> Result<String>;

    /// Whether the stash list is non-empty.
    async fn stash_present(&self, path: &Path) -> Result<bool>;

    /// Fetch all remotes.
    async fn fetch(&self, path: &Path) -> Result<()>;
}

/// [`VersionControlPort`] backed by the system `git` executable.
#[derive(Debug, Clone)]
pub struct GitClient {
    timeout: Duration,
}

impl GitClient {
    pub fn new() -> GitClient {
        GitClient {
            timeout: COMMAND_TIMEOUT,
        }
    }

    /// Override the per-invocation deadline (mainly for tests).
    pub fn with_timeout(timeout: Duration) -> GitClient {
        GitClient { timeout }
    }

    /// Run `git -C <path> <args...>`, returning trimmed stdout.
    async fn run(&self, path: &Path, args: &[&str]) -> Result<String> {
        let mut cmd = tokio::process::Command::new("git");
        cmd.arg("-C")
            .arg(path)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let command = args.join(" ");
        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(output) => output?,
            // Dropping the future kills the child (kill_on_drop)
            Err(_) => {
                return Err(Error::CommandTimeout {
                    command,
                    path: path.to_path_buf(),
                })
            }
        };

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() || !stderr.trim().is_empty() {
            return Err(Error::CommandFailed {
                command,
                path: path.to_path_buf(),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Clone `url` into `target`, streaming git's own progress to the user.
    ///
    /// No deadline here, clones legitimately run long.
    pub async fn clone(&self, url: &str, target: &Path) -> Result<()> {
        let status = tokio::process::Command::new("git")
            .args(["clone", url])
            .arg(target)
            .status()
            .await?;

        if !status.success() {
            return Err(Error::CommandFailed {
                command: format!("clone {}", url),
                path: target.to_path_buf(),
                stderr: format!("git clone exited with {}", status),
            });
        }
        Ok(())
    }

    /// Set `user.email` in a repository's local config.
    pub async fn set_user_email(&self, path: &Path, email: &str) -> Result<()> {
        self.run(path, &["config", "user.email", email]).await?;
        Ok(())
    }
}

impl Default for GitClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VersionControlPort for GitClient {
    async fn is_repository(&self, path: &Path) -> bool {
        self.run(path, &["rev-parse", "--git-dir"]).await.is_ok()
    }

    async fn current_branch(&self, path: &Path) -> Result<String> {
        self.run(path, &["rev-parse", "--abbrev-ref", "HEAD"]).await
    }

    async fn remote_url(&self, path: &Path) -> Result<String> {
        self.run(path, &["remote", "get-url", "origin"]).await
    }

    async fn upstream_branch(&self, path: &Path) -> Result<String> {
        self.run(
            path,
            &["rev-parse", "--abbrev-ref", "--symbolic-full-name", "@{u}"],
        )
        .await
    }

    async fn change_count(&self, path: &Path) -> Result<usize> {
        let status = self.run(path, &["status", "--porcelain"]).await?;
        if status.is_empty() {
            Ok(0)
        } else {
            Ok(status.lines().count())
        }
    }

    async fn ahead_behind(&self, path: &Path) -> Result<(usize, usize)> {
        // Left side counts upstream-only commits (behind), right side HEAD-only (ahead)
        let counts = self
            .run(path, &["rev-list", "--left-right", "--count", "@{u}...HEAD"])
            .await?;
        let mut fields = counts.split_whitespace();
        let behind = fields.next().and_then(|n| n.parse().ok()).unwrap_or(0);
        let ahead = fields.next().and_then(|n| n.parse().ok()).unwrap_or(0);
        Ok((ahead, behind))
    }

    async fn last_commit_summary(&self, path: &Path) -> Result<String> {
        // Truncation for display happens in the status collector
        self.run(path, &["log", "-1", "--pretty=%cr: %s"]).await
    }

    async fn stash_present(&self, path: &Path) -> Result<bool> {
        let list = self.run(path, &["stash", "list"]).await?;
        Ok(!list.is_empty())
    }

    async fn fetch(&self, path: &Path) -> Result<()> {
        self.run(path, &["fetch", "--all", "--quiet"]).await?;
        Ok(())
    }
}

/// Extract the owning account from a remote URL.
///
/// Priority order: scp-like SSH forms first (`host:owner/repo[.git]`, which
/// covers both `git@github.com:...` and custom host aliases like
/// `github-work:...`), then HTTPS URLs containing `github.com/`. Anything
/// else yields [`ACCOUNT_UNKNOWN`].
pub fn extract_account(remote_url: &str) -> String {
    if remote_url.contains(':') && !remote_url.starts_with("http") {
        let parts: Vec<&str> = remote_url.split(':').collect();
        if parts.len() == 2 {
            if let Some(first) = parts[1].split('/').next() {
                let account = first.strip_suffix(".git").unwrap_or(first);
                if !account.is_empty() {
                    return account.to_string();
                }
            }
        }
    }

    if let Some((_, rest)) = remote_url.split_once("github.com/") {
        if let Some(owner) = rest.split('/').next() {
            if !owner.is_empty() {
                return owner.to_string();
            }
        }
    }

    ACCOUNT_UNKNOWN.to_string()
}

/// Parse a clone target into `(owner, repo)`.
///
/// Accepted forms: `https://github.com/owner/repo`, `github.com/owner/repo`,
/// `git@github.com:owner/repo.git`, and bare `owner/repo`.
pub fn parse_clone_target(input: &str) -> Result<(String, String)> {
    let trimmed = input.strip_suffix(".git").unwrap_or(input);

    if trimmed.contains("github.com") {
        let re = Regex::new(r"github\.com[:/]([^/]+)/([^/]+)").unwrap();
        if let Some(caps) = re.captures(trimmed) {
            return Ok((caps[1].to_string(), caps[2].to_string()));
        }
    } else if trimmed.contains('/') {
        let parts: Vec<&str> = trimmed.split('/').collect();
        if parts.len() == 2 && !parts[0].is_empty() && !parts[1].is_empty() {
            return Ok((parts[0].to_string(), parts[1].to_string()));
        }
    }

    Err(Error::CloneUrl {
        url: input.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_account_ssh_default_host() {
        assert_eq!(extract_account("git@github.com:acme/widget.git"), "acme");
    }

    #[test]
    fn test_extract_account_custom_host_alias() {
        assert_eq!(extract_account("custom-host:acme-org/widget.git"), "acme-org");
    }

    #[test]
    fn test_extract_account_https() {
        assert_eq!(extract_account("https://github.com/acme/widget.git"), "acme");
    }

    #[test]
    fn test_extract_account_no_remote_sentinel() {
        assert_eq!(extract_account("no remote"), ACCOUNT_UNKNOWN);
    }

    #[test]
    fn test_extract_account_unparseable() {
        assert_eq!(extract_account("ssh://host:22/x/y"), ACCOUNT_UNKNOWN);
        assert_eq!(extract_account(""), ACCOUNT_UNKNOWN);
    }

    #[test]
    fn test_extract_account_https_without_repo() {
        assert_eq!(extract_account("https://github.com/solo"), "solo");
    }

    #[test]
    fn test_parse_clone_target_https() {
        let (owner, repo) = parse_clone_target("https://github.com/acme/widget.git").unwrap();
        assert_eq!(owner, "acme");
        assert_eq!(repo, "widget");
    }

    #[test]
    fn test_parse_clone_target_scp_like() {
        let (owner, repo) = parse_clone_target("git@github.com:acme/widget.git").unwrap();
        assert_eq!(owner, "acme");
        assert_eq!(repo, "widget");
    }

    #[test]
    fn test_parse_clone_target_bare() {
        let (owner, repo) = parse_clone_target("acme/widget").unwrap();
        assert_eq!(owner, "acme");
        assert_eq!(repo, "widget");
    }

    #[test]
    fn test_parse_clone_target_invalid() {
        assert!(parse_clone_target("widget").is_err());
        assert!(parse_clone_target("").is_err());
    }

    #[tokio::test]
    async fn test_run_failure_maps_to_command_failed() {
        let client = GitClient::new();
        let dir = tempfile::TempDir::new().unwrap();
        // Not a repository, so any query fails with CommandFailed
        let err = client.current_branch(dir.path()).await.unwrap_err();
        match err {
            Error::CommandFailed { .. } => {}
            other => panic!("expected CommandFailed, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_overrun_maps_to_command_timeout() {
        // A deadline no subprocess can meet
        let client = GitClient::with_timeout(Duration::from_nanos(1));
        let dir = tempfile::TempDir::new().unwrap();
        let err = client.current_branch(dir.path()).await.unwrap_err();
        match err {
            Error::CommandTimeout { command, .. } => {
                assert!(command.contains("rev-parse"));
            }
            other => panic!("expected CommandTimeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_is_repository_false_for_plain_dir() {
        let client = GitClient::new();
        let dir = tempfile::TempDir::new().unwrap();
        assert!(!client.is_repository(dir.path()).await);
    }
}
