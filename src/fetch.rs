//! # Fetch Orchestration
//!
//! Runs `git fetch` across a repository set with bounded parallelism.
//! Repositories without a configured remote are never attempted: in batch
//! mode their result slot is left at its default (so index `i` of the output
//! always corresponds to index `i` of the input), and in streaming mode they
//! simply never appear on the channel.
//!
//! Every true attempt, success or failure, records a timestamp in the
//! fetch-time cache; see the cache module for why failures count.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::executor;
use crate::fetch_cache::FetchTimeCache;
use crate::git::VersionControlPort;
use crate::repository::Repository;

/// Outcome of one fetch attempt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchResult {
    /// Repository name; empty in batch slots that were skipped (no remote).
    pub repo_name: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duration_ms: u64,
}

impl FetchResult {
    /// Whether this slot represents a real attempt (batch mode keeps
    /// index-aligned default slots for skipped repositories).
    pub fn attempted(&self) -> bool {
        !self.repo_name.is_empty()
    }
}

/// Bounded-concurrency fetch engine.
pub struct Fetcher<P: VersionControlPort + 'static> {
    port: Arc<P>,
    worker_count: usize,
    cache: Arc<FetchTimeCache>,
}

impl<P: VersionControlPort + 'static> Fetcher<P> {
    pub fn new(port: Arc<P>, cache: Arc<FetchTimeCache>, worker_count: usize) -> Fetcher<P> {
        Fetcher {
            port,
            worker_count,
            cache,
        }
    }

    async fn fetch_one(
        port: Arc<P>,
        cache: Arc<FetchTimeCache>,
        repo: Repository,
    ) -> FetchResult {
        let start = Instant::now();
        let outcome = port.fetch(&repo.path).await;

        // Attempted, not necessarily succeeded; see fetch_cache docs
        if let Err(err) = cache.record(&repo.path) {
            log::warn!("could not persist fetch time for {}: {}", repo.name, err);
        }

        FetchResult {
            repo_name: repo.name,
            success: outcome.is_ok(),
            error: outcome.err().map(|e| e.to_string()),
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    /// Fetch one repository immediately, outside any batch.
    pub async fn fetch_single(&self, repo: &Repository) -> FetchResult {
        Self::fetch_one(Arc::clone(&self.port), Arc::clone(&self.cache), repo.clone()).await
    }

    /// Fetch every repository with a remote; wait for the whole batch.
    ///
    /// The result vector is index-aligned with `repos`; skipped slots stay at
    /// `FetchResult::default()`.
    pub async fn fetch_all(&self, repos: &[Repository]) -> Result<Vec<FetchResult>> {
        let mut results: Vec<FetchResult> = vec![FetchResult::default(); repos.len()];

        let to_fetch: Vec<(usize, Repository)> = repos
            .iter()
            .enumerate()
            .filter(|(_, r)| r.has_remote())
            .map(|(i, r)| (i, r.clone()))
            .collect();

        if to_fetch.is_empty() {
            return Ok(results);
        }

        let port = Arc::clone(&self.port);
        let cache = Arc::clone(&self.cache);
        let cancel = CancellationToken::new();

        let fetched = executor::run_batch(
            to_fetch,
            self.worker_count,
            &cancel,
            move |(index, repo)| {
                let port = Arc::clone(&port);
                let cache = Arc::clone(&cache);
                async move { (index, Self::fetch_one(port, cache, repo).await) }
            },
        )
        .await?;

        for (index, result) in fetched {
            results[index] = result;
        }
        Ok(results)
    }

    /// Fetch every repository with a remote, streaming results as they land.
    ///
    /// Arrival order is nondeterministic. Once `cancel` fires, no further
    /// fetches are admitted; in-flight ones run to completion or timeout and
    /// still deliver their results before the channel closes.
    pub fn fetch_stream(
        &self,
        repos: Vec<Repository>,
        cancel: CancellationToken,
    ) -> mpsc::Receiver<FetchResult> {
        let to_fetch: Vec<Repository> = repos.into_iter().filter(|r| r.has_remote()).collect();

        let port = Arc::clone(&self.port);
        let cache = Arc::clone(&self.cache);

        executor::run_stream(to_fetch, self.worker_count, cancel, move |repo| {
            let port = Arc::clone(&port);
            let cache = Arc::clone(&cache);
            async move { Self::fetch_one(port, cache, repo).await }
        })
    }
}

/// Success/failure tallies over a result set, ignoring skipped slots.
pub fn summarize(results: &[FetchResult]) -> (usize, usize) {
    let mut succeeded = 0;
    let mut failed = 0;
    for result in results.iter().filter(|r| r.attempted()) {
        if result.success {
            succeeded += 1;
        } else {
            failed += 1;
        }
    }
    (succeeded, failed)
}
