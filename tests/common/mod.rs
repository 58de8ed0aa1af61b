//! Shared test utilities for the E2E tests.
//!
//! Each test gets a [`TestFixture`]: a temporary base directory plus a
//! config file pointing at it, so the binary never touches the real user
//! configuration.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new();
//!     let mut cmd = cargo_bin_cmd!("repo-scout");
//!     cmd.args(["--config", &fixture.config_arg(), "scan"])
//!         .assert()
//!         .success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::Path;
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::git_available;
    pub use super::TestFixture;
}

/// Whether a usable `git` binary is on PATH.
///
/// Tests that need real repositories call this and return early when git is
/// missing, mirroring how network-dependent tests are skipped.
#[allow(dead_code)]
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// A temporary base directory with a config file pointing at it.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a fixture with an empty base directory and a matching config.
    pub fn new() -> Self {
        let temp_dir = assert_fs::TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.child("base");
        base.create_dir_all().expect("Failed to create base dir");
        let config = format!("base_dir: {}\n", base.path().display());
        temp_dir
            .child("config.yaml")
            .write_str(&config)
            .expect("Failed to write config file");
        Self { temp_dir }
    }

    /// The configured base directory.
    pub fn base_dir(&self) -> std::path::PathBuf {
        self.temp_dir.path().join("base")
    }

    /// The `--config` argument value for this fixture.
    pub fn config_arg(&self) -> String {
        self.temp_dir
            .path()
            .join("config.yaml")
            .display()
            .to_string()
    }

    /// Replace the config file with the given YAML.
    #[allow(dead_code)]
    pub fn with_config(self, content: &str) -> Self {
        self.temp_dir
            .child("config.yaml")
            .write_str(content)
            .expect("Failed to write config file");
        self
    }

    /// Create a real git repository with one commit under the base dir.
    ///
    /// Panics if git is unavailable; call [`git_available`] first.
    #[allow(dead_code)]
    pub fn add_git_repo(&self, name: &str) -> std::path::PathBuf {
        let path = self.base_dir().join(name);
        std::fs::create_dir_all(&path).expect("Failed to create repo dir");
        git(&path, &["init", "--quiet"]);
        git(&path, &["config", "user.email", "test@example.com"]);
        git(&path, &["config", "user.name", "Test"]);
        std::fs::write(path.join("README.md"), "# test\n").expect("Failed to write file");
        git(&path, &["add", "."]);
        git(&path, &["commit", "--quiet", "-m", "initial commit"]);
        path
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }
}

fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .status()
        .expect("Failed to run git");
    assert!(status.success(), "git {:?} failed in {}", args, dir.display());
}
