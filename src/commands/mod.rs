//! # CLI Command Implementations
//!
//! One file per subcommand. Each module defines an `Args` struct derived with
//! `clap` and an `execute` function that drives the `repo_scout` library.
//!
//! Commands share a [`Context`] carrying the global flags (config path
//! override and worker count) so every command resolves configuration the
//! same way.

use std::path::PathBuf;

use anyhow::Result;
use repo_scout::git::GitClient;
use repo_scout::{Config, Scanner};

pub mod cd;
pub mod clone;
pub mod completions;
pub mod config;
pub mod fetch;
pub mod init;
pub mod organize;
pub mod scan;
pub mod status;

/// Global flags shared by every subcommand.
pub struct Context {
    pub config_path: Option<PathBuf>,
    pub workers: usize,
    pub quiet: bool,
}

impl Context {
    /// Load the active configuration, creating a scaffold file on first run.
    pub fn load_config(&self) -> Result<Config> {
        Ok(Config::load(self.config_path.as_deref())?)
    }

    /// A scanner backed by the system git executable.
    pub fn scanner(&self) -> Result<Scanner<GitClient>> {
        Ok(Scanner::new(self.load_config()?, self.workers))
    }
}
