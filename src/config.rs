//! # Configuration
//!
//! Loads and persists the repo-scout configuration: the base directory that
//! holds all working copies, the known accounts (with their SSH host aliases
//! and commit emails), the known organizations, and the desired folder
//! structure under the base directory.
//!
//! The file lives at `~/.config/repo-scout/config.yaml` by default (platform
//! equivalent via `dirs`). YAML is the canonical format; a JSON file is also
//! accepted since the index and cache artifacts are JSON and some users keep
//! everything in one format. A missing file is not an error; a scaffold
//! config is written so the user has something to edit.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Directory under which repositories live and are organized.
    #[serde(default)]
    pub base_dir: PathBuf,

    /// Known accounts, keyed by remote username.
    #[serde(default)]
    pub accounts: HashMap<String, AccountConfig>,

    /// Known organizations, keyed by org name, mapping to an SSH host alias.
    #[serde(default)]
    pub organizations: HashMap<String, String>,

    /// Desired folder layout: folder name -> usernames that belong in it.
    #[serde(default)]
    pub folder_structure: HashMap<String, Vec<String>>,
}

/// Per-account configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AccountConfig {
    /// Free-form account kind: "personal", "work", "org", ...
    #[serde(rename = "type", default)]
    pub kind: String,

    /// SSH host alias from `~/.ssh/config` used for this account's remotes.
    #[serde(default)]
    pub ssh_host: String,

    /// Commit email to configure in repositories cloned for this account.
    #[serde(default)]
    pub email: String,
}

impl Config {
    /// Default config file path (`<config dir>/repo-scout/config.yaml`).
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("repo-scout")
            .join("config.yaml")
    }

    /// Default base directory (`~/Projects`).
    pub fn default_base_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("Projects")
    }

    /// Load configuration from `path`, or from the default location.
    ///
    /// If the file does not exist, a scaffold configuration is written there
    /// and returned, mirroring first-run behavior users expect from the tool.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::default_path);

        if path.exists() {
            return Self::from_file(&path);
        }

        let config = Self::scaffold();
        config.save(&path)?;
        Ok(config)
    }

    /// Parse configuration from a file, trying YAML then JSON.
    pub fn from_file(path: &Path) -> Result<Config> {
        let data = fs::read_to_string(path)?;

        let mut config: Config = match serde_yaml::from_str(&data) {
            Ok(config) => config,
            // serde_yaml handles most JSON, but not all of it; fall back
            Err(yaml_err) => serde_json::from_str(&data).map_err(|_| Error::ConfigParse {
                message: format!("{}: {}", path.display(), yaml_err),
                hint: Some("the config file must be valid YAML (or JSON)".to_string()),
            })?,
        };

        if config.base_dir.as_os_str().is_empty() {
            config.base_dir = Self::default_base_dir();
        }
        Ok(config)
    }

    /// Save configuration as YAML, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_yaml::to_string(self)?;
        fs::write(path, data)?;
        Ok(())
    }

    /// Empty scaffold configuration written on first run.
    pub fn scaffold() -> Config {
        Config {
            base_dir: Self::default_base_dir(),
            accounts: HashMap::new(),
            organizations: HashMap::new(),
            folder_structure: HashMap::new(),
        }
    }

    /// The folder (from `folder_structure`) a username belongs in, if any.
    pub fn folder_for_account(&self, username: &str) -> Option<&str> {
        for (folder, members) in &self.folder_structure {
            if members.iter().any(|m| m == username) {
                return Some(folder.as_str());
            }
        }
        None
    }

    /// SSH host alias for an owner, checking accounts then organizations.
    ///
    /// Falls back to `github.com` so clone URLs always resolve somewhere.
    pub fn ssh_host_for(&self, owner: &str) -> &str {
        if let Some(account) = self.accounts.get(owner) {
            if !account.ssh_host.is_empty() {
                return &account.ssh_host;
            }
        }
        if let Some(host) = self.organizations.get(owner) {
            if !host.is_empty() {
                return host;
            }
        }
        "github.com"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_yaml() -> &'static str {
        r#"
base_dir: /home/user/Projects
accounts:
  jdoe:
    type: personal
    ssh_host: github-jdoe
    email: jdoe@example.com
organizations:
  acme-org: github-acme
folder_structure:
  personal:
    - jdoe
  orgs:
    - acme-org
"#
    }

    #[test]
    fn test_parse_yaml_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, sample_yaml()).unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.base_dir, PathBuf::from("/home/user/Projects"));
        assert_eq!(config.accounts["jdoe"].ssh_host, "github-jdoe");
        assert_eq!(config.organizations["acme-org"], "github-acme");
        assert_eq!(config.folder_structure["personal"], vec!["jdoe"]);
    }

    #[test]
    fn test_parse_json_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"base_dir": "/p", "accounts": {}, "organizations": {}, "folder_structure": {}}"#,
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.base_dir, PathBuf::from("/p"));
    }

    #[test]
    fn test_missing_base_dir_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "accounts: {}\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert!(!config.base_dir.as_os_str().is_empty());
    }

    #[test]
    fn test_invalid_config_has_hint() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "base_dir: [this is: not valid").unwrap();

        let err = Config::from_file(&path).unwrap_err();
        assert!(format!("{}", err).contains("hint:"));
    }

    #[test]
    fn test_load_writes_scaffold() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let config = Config::load(Some(&path)).unwrap();
        assert!(path.exists());
        assert!(config.accounts.is_empty());

        // A second load reads the file it just wrote
        let reloaded = Config::load(Some(&path)).unwrap();
        assert_eq!(reloaded.base_dir, config.base_dir);
    }

    #[test]
    fn test_folder_for_account() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, sample_yaml()).unwrap();
        let config = Config::from_file(&path).unwrap();

        assert_eq!(config.folder_for_account("jdoe"), Some("personal"));
        assert_eq!(config.folder_for_account("acme-org"), Some("orgs"));
        assert_eq!(config.folder_for_account("stranger"), None);
    }

    #[test]
    fn test_ssh_host_lookup() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, sample_yaml()).unwrap();
        let config = Config::from_file(&path).unwrap();

        assert_eq!(config.ssh_host_for("jdoe"), "github-jdoe");
        assert_eq!(config.ssh_host_for("acme-org"), "github-acme");
        assert_eq!(config.ssh_host_for("stranger"), "github.com");
    }

    #[test]
    fn test_save_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");

        let mut config = Config::scaffold();
        config.accounts.insert(
            "jdoe".to_string(),
            AccountConfig {
                kind: "personal".to_string(),
                ssh_host: "github-jdoe".to_string(),
                email: String::new(),
            },
        );
        config.save(&path).unwrap();

        let reloaded = Config::from_file(&path).unwrap();
        assert_eq!(reloaded.accounts["jdoe"].kind, "personal");
    }
}
