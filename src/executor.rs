//! # Bounded Fan-Out
//!
//! A generic task-pool primitive: run an async function over N items with at
//! most `workers` executing at once. Both the status-scan pass and the fetch
//! pass are built on it, each with its own ceiling.
//!
//! Admission is controlled by a counting semaphore: a task acquires one unit
//! before its function runs and releases it on completion, success or not.
//! A [`CancellationToken`] gates admission only: once signalled, tasks that
//! have not yet acquired a permit are skipped, while tasks already running
//! are left to finish under their own per-operation timeouts. Nothing here
//! force-kills work in flight.
//!
//! Two call shapes are offered:
//! - [`run_batch`] waits for everything and returns results aligned to the
//!   input order (index `i` in corresponds to index `i` out). Cancellation
//!   during admission aborts the whole batch with [`Error::Cancelled`].
//! - [`run_stream`] hands back a channel receiving results in completion
//!   order, which is nondeterministic run to run. The channel closes only
//!   after every task has completed or been skipped, so consumers must be
//!   prepared for partial streams.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};

/// Worker count used when the caller passes 0.
pub const DEFAULT_WORKERS: usize = 10;

fn effective_workers(workers: usize) -> usize {
    if workers == 0 {
        DEFAULT_WORKERS
    } else {
        workers
    }
}

/// Run `task` over `items` with bounded concurrency, collecting all results.
///
/// The per-item function is infallible by construction (callers absorb or
/// filter item-level failures inside it), so the only batch-level error is
/// cancellation (or a panicking worker).
pub async fn run_batch<T, R, F, Fut>(
    items: Vec<T>,
    workers: usize,
    cancel: &CancellationToken,
    task: F,
) -> Result<Vec<R>>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(effective_workers(workers)));
    let mut set: JoinSet<Result<(usize, R)>> = JoinSet::new();

    for (index, item) in items.into_iter().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        let cancel = cancel.clone();
        let task = task.clone();

        set.spawn(async move {
            let _permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Error::Cancelled),
                permit = semaphore.acquire_owned() => {
                    permit.map_err(|_| Error::Cancelled)?
                }
            };
            Ok((index, task(item).await))
        });
    }

    let mut indexed = Vec::with_capacity(set.len());
    while let Some(joined) = set.join_next().await {
        let pair = joined.map_err(|err| Error::TaskJoin {
            message: err.to_string(),
        })??;
        indexed.push(pair);
    }

    indexed.sort_unstable_by_key(|(index, _)| *index);
    Ok(indexed.into_iter().map(|(_, result)| result).collect())
}

/// Run `task` over `items`, streaming results as they complete.
///
/// Results arrive in completion order. The receiver sees the channel close
/// once every task has finished or been skipped due to cancellation.
pub fn run_stream<T, R, F, Fut>(
    items: Vec<T>,
    workers: usize,
    cancel: CancellationToken,
    task: F,
) -> mpsc::Receiver<R>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
{
    let (tx, rx) = mpsc::channel(effective_workers(workers).max(1));
    let semaphore = Arc::new(Semaphore::new(effective_workers(workers)));

    tokio::spawn(async move {
        let mut set = JoinSet::new();

        for item in items {
            let semaphore = Arc::clone(&semaphore);
            let cancel = cancel.clone();
            let task = task.clone();
            let tx = tx.clone();

            set.spawn(async move {
                let _permit = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return,
                    permit = semaphore.acquire_owned() => {
                        match permit {
                            Ok(permit) => permit,
                            Err(_) => return,
                        }
                    }
                };
                let result = task(item).await;
                // Receiver may have been dropped; nothing to do about it
                let _ = tx.send(result).await;
            });
        }

        drop(tx);
        while set.join_next().await.is_some() {}
    });

    rx
}
