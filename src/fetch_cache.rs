//! # Fetch-Time Cache
//!
//! A small persisted map from repository path to the last time a fetch was
//! *attempted* there. The scan pipeline merges these timestamps into status
//! records so the UI can show staleness hints; the fetch pipeline records a
//! timestamp after every true attempt.
//!
//! ## Contract notes
//!
//! - A timestamp means "we tried to fetch then", **not** "we were up to date
//!   then": failed attempts are recorded too. This mirrors the tool's
//!   long-standing behavior; changing it to success-only would understate
//!   activity and overstate staleness in different ways, so it is kept as-is
//!   and called out here.
//! - The cache is advisory. It is never load-bearing for correctness, which
//!   is why persistence is non-transactional: the in-memory map is updated
//!   first and the whole file rewritten after, and a crash in between loses
//!   at most that one update.
//! - A missing or corrupt cache file loads as an empty cache with a warning,
//!   never an error.
//!
//! Readers take a shared lock (the scan merge is read-heavy); the occasional
//! update takes the exclusive lock. No lock is ever held across subprocess
//! I/O, only across the in-memory map and the file write.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};

/// File name of the persisted cache, relative to the base directory.
pub const FETCH_CACHE_FILE: &str = ".repo-scout-fetch-cache.json";

/// Persisted map of repository path -> last fetch attempt.
#[derive(Debug)]
pub struct FetchTimeCache {
    file: PathBuf,
    entries: RwLock<HashMap<String, DateTime<Utc>>>,
}

impl FetchTimeCache {
    /// Load the cache that lives under `base_dir`.
    pub fn load(base_dir: &Path) -> FetchTimeCache {
        let file = base_dir.join(FETCH_CACHE_FILE);
        let entries = match Self::read_file(&file) {
            Ok(entries) => entries,
            Err(Error::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => {
                log::warn!("{}; starting with an empty fetch cache", err);
                HashMap::new()
            }
        };

        FetchTimeCache {
            file,
            entries: RwLock::new(entries),
        }
    }

    fn read_file(file: &Path) -> Result<HashMap<String, DateTime<Utc>>> {
        let data = fs::read_to_string(file)?;
        serde_json::from_str(&data).map_err(|err| Error::CacheCorrupt {
            path: file.to_path_buf(),
            message: err.to_string(),
        })
    }

    /// Last fetch attempt recorded for `path`, if any.
    pub fn get(&self, path: &Path) -> Option<DateTime<Utc>> {
        let entries = self.entries.read().ok()?;
        entries.get(&path.to_string_lossy().into_owned()).copied()
    }

    /// Record a fetch attempt at `path` as of now, and persist.
    pub fn record(&self, path: &Path) -> Result<()> {
        self.record_at(path, Utc::now())
    }

    /// Record a fetch attempt with an explicit timestamp, and persist.
    pub fn record_at(&self, path: &Path, when: DateTime<Utc>) -> Result<()> {
        // Persist while still holding the write lock so a concurrent record
        // cannot overwrite the file with a staler snapshot.
        let mut entries = self.entries.write().map_err(|_| Error::LockPoisoned {
            context: "fetch cache write".to_string(),
        })?;
        entries.insert(path.to_string_lossy().into_owned(), when);
        Self::persist(&self.file, &entries)
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rewrite the whole cache file from the given snapshot.
    fn persist(file: &Path, entries: &HashMap<String, DateTime<Utc>>) -> Result<()> {
        let json = serde_json::to_string_pretty(entries)?;
        fs::write(file, json)?;
        Ok(())
    }
}
