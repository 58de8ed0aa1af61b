//! # Error Handling
//!
//! This module defines the centralized error handling mechanism for
//! `repo-scout`. It uses the `thiserror` library to create a single `Error`
//! enum covering every anticipated failure mode, with contextual fields so
//! messages stay actionable.
//!
//! Most failures in this tool are deliberately *absorbed* close to where they
//! occur: a single repository that fails to answer a status query falls back
//! to a defaulted field, an unreadable directory is skipped during discovery,
//! and a corrupt fetch cache is treated as empty. The variants here exist for
//! the cases where a failure must be reported, either per item (e.g. a
//! destination conflict during organize) or as a hard setup error (e.g. the
//! base directory does not exist).

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for repo-scout operations
#[derive(Error, Debug)]
pub enum Error {
    /// The path has no valid version-control metadata root.
    ///
    /// Callers scanning a batch skip the path rather than propagating this.
    #[error("not a git repository: {}", path.display())]
    NotARepository { path: PathBuf },

    /// A git subprocess exceeded its wall-clock deadline.
    #[error("git {command} timed out in {}", path.display())]
    CommandTimeout { command: String, path: PathBuf },

    /// A git subprocess exited nonzero or wrote to stderr.
    #[error("git {command} failed in {}: {stderr}", path.display())]
    CommandFailed {
        command: String,
        path: PathBuf,
        stderr: String,
    },

    /// Repository discovery could not start (e.g. the search root is missing).
    ///
    /// Unreadable directories *inside* the walk are skipped, not reported.
    #[error("discovery error at {}: {message}", path.display())]
    Discovery { path: PathBuf, message: String },

    /// An organize destination already exists and `--force` was not given.
    #[error("destination already exists for {name}: {}", destination.display())]
    DestinationConflict { name: String, destination: PathBuf },

    /// The persisted fetch cache could not be parsed.
    ///
    /// The cache layer downgrades this to an empty cache; the variant is kept
    /// so the condition stays inspectable in tests and logs.
    #[error("fetch cache unreadable at {}: {message}", path.display())]
    CacheCorrupt { path: PathBuf, message: String },

    /// An error occurred while parsing the configuration file.
    #[error("configuration error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// A clone target could not be parsed into `owner/repo`.
    #[error("invalid repository URL format: {url}")]
    CloneUrl { url: String },

    /// A repository name lookup found no match.
    #[error("repository '{name}' not found")]
    RepoNotFound { name: String },

    /// The batch was cancelled before all tasks were admitted.
    #[error("operation cancelled")]
    Cancelled,

    /// A worker task panicked or was aborted by the runtime.
    #[error("worker task failed: {message}")]
    TaskJoin { message: String },

    /// A mutex or read/write lock has been poisoned.
    #[error("lock poisoned: {context}")]
    LockPoisoned { context: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON (de)serialization error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
