//! # repo-scout
//!
//! Keep a directory full of git clones under control: discover every
//! repository beneath a base directory, collect working-tree and sync status
//! concurrently, fetch remotes in bulk, and move clones into an
//! account-based folder layout.
//!
//! The library is split into a small engine (walker, scanner, fetcher,
//! organizer) driven by the `repo-scout` binary. All git access goes through
//! the [`git::VersionControlPort`] trait so the engine can be tested without
//! a real git binary.

pub mod config;
pub mod error;
pub mod executor;
pub mod fetch;
pub mod fetch_cache;
pub mod git;
pub mod organize;
pub mod output;
pub mod repository;
pub mod scanner;
pub mod walker;

pub use config::Config;
pub use error::{Error, Result};
pub use repository::{Repository, ScanIndex};
pub use scanner::Scanner;
