//! # Scan Pipeline
//!
//! Ties the pieces together: discover repository roots with the walker, fan
//! out status collection through the bounded executor, merge in fetch-cache
//! timestamps, and hand back the aggregated `Repository` set. The result
//! order is discovery/completion order; callers must not assume any.
//!
//! ## Status collection
//!
//! [`collect_status`] runs a fixed sequence of read-only queries against the
//! [`VersionControlPort`]. Each query fails independently and non-fatally:
//! branch falls back to `"unknown"`, remote to `"no remote"`, last commit to
//! `"No commits"`, counts to zero. Only the initial validity check is fatal,
//! and then only to that one path. The scan skips it and moves on.
//!
//! ## Folder inference
//!
//! Which folder a repository *should* live in is decided by an ordered chain
//! of strategies, each either matching or passing to the next:
//! 1. the account is a configured account (personal et al.),
//! 2. the account is a configured organization,
//! 3. the current path already looks organized (`.../<base>/<folder>/<name>`),
//!    with org-ness guessed from the folder's naming,
//! 4. hard default: folder = account, not an org.
//!
//! The chain never fails; it only degrades toward the default.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::executor;
use crate::fetch_cache::FetchTimeCache;
use crate::git::{extract_account, parse_clone_target, GitClient, VersionControlPort};
use crate::repository::{truncate_summary, Repository, ScanIndex};
use crate::walker;

/// File name of the persisted scan index, relative to the base directory.
pub const INDEX_FILE: &str = ".repo-scout-index.json";

/// Collect the status of one repository root.
///
/// Returns [`Error::NotARepository`] when the validity check fails; any other
/// per-query failure is absorbed into the record's defaults.
pub async fn collect_status<P>(port: &P, path: &Path, config: &Config) -> Result<Repository>
where
    P: VersionControlPort + ?Sized,
{
    if !port.is_repository(path).await {
        return Err(Error::NotARepository {
            path: path.to_path_buf(),
        });
    }

    let mut repo = Repository::new(path);

    if let Ok(branch) = port.current_branch(path).await {
        if !branch.is_empty() {
            repo.branch = branch;
        }
    }

    if let Ok(url) = port.remote_url(path).await {
        if !url.is_empty() {
            repo.remote_url = url;
            repo.account = extract_account(&repo.remote_url);
        }
    }

    repo.has_upstream = matches!(port.upstream_branch(path).await, Ok(u) if !u.is_empty());

    if let Ok(count) = port.change_count(path).await {
        repo.uncommitted = count;
        repo.is_clean = count == 0;
    }

    if repo.has_upstream {
        if let Ok((ahead, behind)) = port.ahead_behind(path).await {
            repo.ahead = ahead;
            repo.behind = behind;
        }
    }

    if let Ok(summary) = port.last_commit_summary(path).await {
        repo.last_commit = truncate_summary(&summary);
    }

    if let Ok(present) = port.stash_present(path).await {
        repo.has_stash = present;
    }

    let (folder_name, is_org) = infer_folder(&repo.account, path, config);
    repo.folder_name = folder_name;
    repo.is_org = is_org;

    Ok(repo)
}

/// Decide the canonical folder (and org-ness) for a repository.
pub fn infer_folder(account: &str, path: &Path, config: &Config) -> (String, bool) {
    if config.accounts.contains_key(account) {
        return (account.to_string(), false);
    }

    if config.organizations.contains_key(account) {
        return (account.to_string(), true);
    }

    if let Some(folder) = folder_from_path(path, config) {
        let is_org = looks_like_org(&folder);
        return (folder, is_org);
    }

    (account.to_string(), false)
}

/// Strategy 3: read the folder off an already-organized path.
///
/// Matches `.../<base-dir-name>/<folder>/<repo-name>` where `<repo-name>` is
/// the repository's own directory name.
fn folder_from_path(path: &Path, config: &Config) -> Option<String> {
    let marker = config.base_dir.file_name()?.to_string_lossy().into_owned();
    let name = path.file_name()?.to_string_lossy().into_owned();

    let segments: Vec<String> = path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    for window in segments.windows(3) {
        if window[0] == marker && window[2] == name {
            return Some(window[1].clone());
        }
    }
    None
}

/// Naming heuristic for organization folders.
fn looks_like_org(folder: &str) -> bool {
    folder.contains("-org") || folder.contains("org-") || folder.ends_with("Org")
}

/// Repository discovery and scanning engine.
pub struct Scanner<P: VersionControlPort + 'static> {
    config: Config,
    port: Arc<P>,
    worker_count: usize,
    index_path: PathBuf,
    fetch_cache: Arc<FetchTimeCache>,
}

impl Scanner<GitClient> {
    /// Scanner backed by the system git executable.
    pub fn new(config: Config, worker_count: usize) -> Scanner<GitClient> {
        Self::with_port(config, Arc::new(GitClient::new()), worker_count)
    }
}

impl<P: VersionControlPort + 'static> Scanner<P> {
    /// Scanner backed by an arbitrary port (fakes in tests).
    ///
    /// The fetch cache is loaded eagerly here; a missing or corrupt cache
    /// file degrades to an empty cache.
    pub fn with_port(config: Config, port: Arc<P>, worker_count: usize) -> Scanner<P> {
        let index_path = config.base_dir.join(INDEX_FILE);
        let fetch_cache = Arc::new(FetchTimeCache::load(&config.base_dir));
        Scanner {
            config,
            port,
            worker_count,
            index_path,
            fetch_cache,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The fetch cache owned by this scanner, shared with the fetch pipeline.
    pub fn fetch_cache(&self) -> Arc<FetchTimeCache> {
        Arc::clone(&self.fetch_cache)
    }

    /// Discover and analyze all repositories under `search_path` (or the
    /// configured base directory).
    ///
    /// Invalid repositories are skipped silently; an empty result is not an
    /// error. The only hard failures are a missing search root and batch
    /// cancellation.
    pub async fn scan(&self, search_path: Option<&Path>) -> Result<Vec<Repository>> {
        let root = search_path.unwrap_or(&self.config.base_dir);
        let paths = walker::find_repositories(root)?;
        log::debug!("discovered {} candidate roots under {}", paths.len(), root.display());

        let cancel = CancellationToken::new();
        let port = Arc::clone(&self.port);
        let config = Arc::new(self.config.clone());
        let cache = Arc::clone(&self.fetch_cache);

        let collected = executor::run_batch(paths, self.worker_count, &cancel, move |path| {
            let port = Arc::clone(&port);
            let config = Arc::clone(&config);
            let cache = Arc::clone(&cache);
            async move {
                match collect_status(port.as_ref(), &path, &config).await {
                    Ok(mut repo) => {
                        repo.last_fetch = cache.get(&path);
                        Some(repo)
                    }
                    Err(err) => {
                        log::debug!("skipping {}: {}", path.display(), err);
                        None
                    }
                }
            }
        })
        .await?;

        Ok(collected.into_iter().flatten().collect())
    }

    /// Write the scan index atomically (temp file + rename).
    pub fn save_index(&self, repos: &[Repository]) -> Result<()> {
        let index = ScanIndex {
            last_scan: Utc::now(),
            repositories: repos.to_vec(),
        };
        let json = serde_json::to_string_pretty(&index)?;

        let tmp = self.index_path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.index_path)?;
        Ok(())
    }

    /// Read the scan index back; a missing index is an empty repository set.
    pub fn load_index(&self) -> Result<Vec<Repository>> {
        let data = match fs::read_to_string(&self.index_path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        let index: ScanIndex = serde_json::from_str(&data)?;
        Ok(index.repositories)
    }
}

/// Find a repository by name within a scanned set.
///
/// Matches the exact name first, then a path segment, then a path suffix;
/// loose enough for shell use (`cd $(repo-scout cd widget)`).
pub fn find_repository<'a>(repos: &'a [Repository], name: &str) -> Option<&'a Repository> {
    let segment = format!("/{}", name);
    repos
        .iter()
        .find(|r| r.name == name)
        .or_else(|| {
            repos
                .iter()
                .find(|r| r.path.to_string_lossy().contains(&segment))
        })
        .or_else(|| {
            repos
                .iter()
                .find(|r| r.path.to_string_lossy().ends_with(name))
        })
}

/// Clone a repository using the SSH host alias configured for its owner, and
/// place it in the owner's configured folder under the base directory.
///
/// Returns the path the repository was cloned to.
pub async fn clone_repository(
    client: &GitClient,
    config: &Config,
    url: &str,
    target: Option<PathBuf>,
) -> Result<PathBuf> {
    let (owner, repo_name) = parse_clone_target(url)?;
    let ssh_host = config.ssh_host_for(&owner);
    let clone_url = format!("git@{}:{}/{}.git", ssh_host, owner, repo_name);

    let target = target.unwrap_or_else(|| {
        let dir = match config.folder_for_account(&owner) {
            Some(folder) => config.base_dir.join(folder),
            None => config.base_dir.clone(),
        };
        dir.join(&repo_name)
    });

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }

    log::info!("cloning {}/{} via {} into {}", owner, repo_name, ssh_host, target.display());
    client.clone(&clone_url, &target).await?;

    if let Some(account) = config.accounts.get(&owner) {
        if !account.email.is_empty() {
            if let Err(err) = client.set_user_email(&target, &account.email).await {
                log::warn!("could not set user.email in {}: {}", target.display(), err);
            }
        }
    }

    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{ACCOUNT_UNKNOWN, BRANCH_UNKNOWN, NO_COMMITS, NO_REMOTE};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Canned per-repository answers for the fake port.
    #[derive(Debug, Clone, Default)]
    struct FakeRepo {
        branch: Option<String>,
        remote: Option<String>,
        upstream: Option<String>,
        changes: Option<usize>,
        ahead_behind: Option<(usize, usize)>,
        last_commit: Option<String>,
        stash: bool,
    }

    /// In-memory [`VersionControlPort`]: paths absent from the map are not
    /// repositories; `None` fields simulate failing queries.
    #[derive(Debug, Default)]
    struct FakePort {
        repos: Mutex<HashMap<PathBuf, FakeRepo>>,
    }

    impl FakePort {
        fn insert(&self, path: &Path, repo: FakeRepo) {
            self.repos.lock().unwrap().insert(path.to_path_buf(), repo);
        }

        fn get(&self, path: &Path) -> Option<FakeRepo> {
            self.repos.lock().unwrap().get(path).cloned()
        }

        fn query<T>(&self, path: &Path, f: impl Fn(&FakeRepo) -> Option<T>) -> crate::error::Result<T> {
            self.get(path).and_then(|r| f(&r)).ok_or_else(|| Error::CommandFailed {
                command: "fake".to_string(),
                path: path.to_path_buf(),
                stderr: "query refused".to_string(),
            })
        }
    }

    #[async_trait]
    impl VersionControlPort for FakePort {
        async fn is_repository(&self, path: &Path) -> bool {
            self.get(path).is_some()
        }

        async fn current_branch(&self, path: &Path) -> crate::error::Result<String> {
            self.query(path, |r| r.branch.clone())
        }

        async fn remote_url(&self, path: &Path) -> crate::error::Result<String> {
            self.query(path, |r| r.remote.clone())
        }

        async fn upstream_branch(&self, path: &Path) -> crate::error::Result<String> {
            self.query(path, |r| r.upstream.clone())
        }

        async fn change_count(&self, path: &Path) -> crate::error::Result<usize> {
            self.query(path, |r| r.changes)
        }

        async fn ahead_behind(&self, path: &Path) -> crate::error::Result<(usize, usize)> {
            self.query(path, |r| r.ahead_behind)
        }

        async fn last_commit_summary(&self, path: &Path) -> crate::error::Result<String> {
            self.query(path, |r| r.last_commit.clone())
        }

        async fn stash_present(&self, path: &Path) -> crate::error::Result<bool> {
            self.get(path)
                .map(|r| r.stash)
                .ok_or_else(|| Error::NotARepository {
                    path: path.to_path_buf(),
                })
        }

        async fn fetch(&self, _path: &Path) -> crate::error::Result<()> {
            Ok(())
        }
    }

    fn config_with_base(base: &Path) -> Config {
        let mut config = Config::scaffold();
        config.base_dir = base.to_path_buf();
        config
    }

    fn healthy_fake() -> FakeRepo {
        FakeRepo {
            branch: Some("main".to_string()),
            remote: Some("git@github.com:acme/widget.git".to_string()),
            upstream: Some("origin/main".to_string()),
            changes: Some(0),
            ahead_behind: Some((2, 1)),
            last_commit: Some("2 hours ago: tighten parser".to_string()),
            stash: false,
        }
    }

    #[tokio::test]
    async fn test_collect_status_healthy_repo() {
        let port = FakePort::default();
        let path = Path::new("/base/widget");
        port.insert(path, healthy_fake());

        let config = config_with_base(Path::new("/base"));
        let repo = collect_status(&port, path, &config).await.unwrap();

        assert_eq!(repo.branch, "main");
        assert_eq!(repo.account, "acme");
        assert!(repo.has_upstream);
        assert_eq!((repo.ahead, repo.behind), (2, 1));
        assert!(repo.is_clean);
        assert_eq!(repo.is_clean, repo.uncommitted == 0);
    }

    #[tokio::test]
    async fn test_collect_status_not_a_repository() {
        let port = FakePort::default();
        let config = config_with_base(Path::new("/base"));
        let err = collect_status(&port, Path::new("/base/nope"), &config)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotARepository { .. }));
    }

    #[tokio::test]
    async fn test_collect_status_defaults_on_query_failures() {
        let port = FakePort::default();
        let path = Path::new("/base/husk");
        // Valid repository where every individual query fails
        port.insert(path, FakeRepo::default());

        let config = config_with_base(Path::new("/base"));
        let repo = collect_status(&port, path, &config).await.unwrap();

        assert_eq!(repo.branch, BRANCH_UNKNOWN);
        assert_eq!(repo.remote_url, NO_REMOTE);
        assert_eq!(repo.last_commit, NO_COMMITS);
        assert_eq!(repo.account, ACCOUNT_UNKNOWN);
        assert!(!repo.has_upstream);
        assert_eq!((repo.ahead, repo.behind), (0, 0));
        assert!(repo.is_clean);
    }

    #[tokio::test]
    async fn test_collect_status_dirty_consistency() {
        let port = FakePort::default();
        let path = Path::new("/base/dirty");
        let mut fake = healthy_fake();
        fake.changes = Some(7);
        port.insert(path, fake);

        let config = config_with_base(Path::new("/base"));
        let repo = collect_status(&port, path, &config).await.unwrap();
        assert!(!repo.is_clean);
        assert_eq!(repo.uncommitted, 7);
        assert_eq!(repo.is_clean, repo.uncommitted == 0);
    }

    #[tokio::test]
    async fn test_collect_status_no_upstream_skips_ahead_behind() {
        let port = FakePort::default();
        let path = Path::new("/base/local-only");
        let mut fake = healthy_fake();
        fake.upstream = None;
        port.insert(path, fake);

        let config = config_with_base(Path::new("/base"));
        let repo = collect_status(&port, path, &config).await.unwrap();
        assert!(!repo.has_upstream);
        assert_eq!((repo.ahead, repo.behind), (0, 0));
    }

    #[test]
    fn test_infer_folder_configured_account() {
        let mut config = config_with_base(Path::new("/base/Projects"));
        config.accounts.insert("jdoe".to_string(), Default::default());

        let (folder, is_org) = infer_folder("jdoe", Path::new("/base/Projects/widget"), &config);
        assert_eq!(folder, "jdoe");
        assert!(!is_org);
    }

    #[test]
    fn test_infer_folder_configured_org() {
        let mut config = config_with_base(Path::new("/base/Projects"));
        config
            .organizations
            .insert("acme-org".to_string(), "github-acme".to_string());

        let (folder, is_org) = infer_folder("acme-org", Path::new("/base/Projects/widget"), &config);
        assert_eq!(folder, "acme-org");
        assert!(is_org);
    }

    #[test]
    fn test_infer_folder_from_path_structure() {
        let config = config_with_base(Path::new("/home/u/Projects"));

        // Unknown account, but the path already looks organized
        let (folder, is_org) = infer_folder(
            "unknown",
            Path::new("/home/u/Projects/acme-org/widget"),
            &config,
        );
        assert_eq!(folder, "acme-org");
        assert!(is_org);

        let (folder, is_org) = infer_folder(
            "unknown",
            Path::new("/home/u/Projects/personal/widget"),
            &config,
        );
        assert_eq!(folder, "personal");
        assert!(!is_org);
    }

    #[test]
    fn test_infer_folder_default() {
        let config = config_with_base(Path::new("/home/u/Projects"));
        let (folder, is_org) = infer_folder("stranger", Path::new("/elsewhere/widget"), &config);
        assert_eq!(folder, "stranger");
        assert!(!is_org);
    }

    #[test]
    fn test_looks_like_org_heuristics() {
        assert!(looks_like_org("acme-org"));
        assert!(looks_like_org("org-acme"));
        assert!(looks_like_org("AcmeOrg"));
        assert!(!looks_like_org("personal"));
    }

    #[tokio::test]
    async fn test_scan_skips_invalid_repositories() {
        let tmp = TempDir::new().unwrap();
        let valid = tmp.path().join("valid");
        let invalid = tmp.path().join("invalid");
        fs::create_dir_all(valid.join(".git")).unwrap();
        fs::create_dir_all(invalid.join(".git")).unwrap();

        let port = FakePort::default();
        port.insert(&valid, healthy_fake());
        // `invalid` has a .git directory on disk but the port refuses it

        let config = config_with_base(tmp.path());
        let scanner = Scanner::with_port(config, Arc::new(port), 4);
        let repos = scanner.scan(None).await.unwrap();

        assert_eq!(repos.len(), 1);
        assert_eq!(repos[0].name, "valid");
    }

    #[tokio::test]
    async fn test_scan_merges_fetch_cache() {
        let tmp = TempDir::new().unwrap();
        let repo_path = tmp.path().join("widget");
        fs::create_dir_all(repo_path.join(".git")).unwrap();

        let port = FakePort::default();
        port.insert(&repo_path, healthy_fake());

        let config = config_with_base(tmp.path());
        let scanner = Scanner::with_port(config, Arc::new(port), 2);
        let when = Utc::now() - chrono::Duration::hours(6);
        scanner.fetch_cache().record_at(&repo_path, when).unwrap();

        let repos = scanner.scan(None).await.unwrap();
        assert_eq!(repos.len(), 1);
        assert_eq!(repos[0].last_fetch, Some(when));
    }

    #[tokio::test]
    async fn test_index_save_and_load() {
        let tmp = TempDir::new().unwrap();
        let repo_path = tmp.path().join("widget");
        fs::create_dir_all(repo_path.join(".git")).unwrap();

        let port = FakePort::default();
        port.insert(&repo_path, healthy_fake());

        let config = config_with_base(tmp.path());
        let scanner = Scanner::with_port(config, Arc::new(port), 2);
        let repos = scanner.scan(None).await.unwrap();

        scanner.save_index(&repos).unwrap();
        assert!(tmp.path().join(INDEX_FILE).exists());

        let loaded = scanner.load_index().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "widget");
    }

    #[tokio::test]
    async fn test_load_index_missing_is_empty() {
        let tmp = TempDir::new().unwrap();
        let config = config_with_base(tmp.path());
        let scanner = Scanner::with_port(config, Arc::new(FakePort::default()), 1);
        assert!(scanner.load_index().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_scan_missing_root_is_hard_error() {
        let tmp = TempDir::new().unwrap();
        let config = config_with_base(&tmp.path().join("missing"));
        let scanner = Scanner::with_port(config, Arc::new(FakePort::default()), 1);
        assert!(scanner.scan(None).await.is_err());
    }

    #[test]
    fn test_find_repository_matching() {
        let mut a = Repository::new(Path::new("/base/folder/widget"));
        a.name = "widget".to_string();
        let mut b = Repository::new(Path::new("/base/folder/gadget"));
        b.name = "gadget".to_string();
        let repos = vec![a, b];

        assert_eq!(find_repository(&repos, "widget").unwrap().name, "widget");
        assert_eq!(find_repository(&repos, "gadget").unwrap().name, "gadget");
        assert!(find_repository(&repos, "nothing").is_none());
    }
}
