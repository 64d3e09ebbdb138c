//! Configuration file support for postreview.
//!
//! Loads `postreview.toml` from the repository directory, falling back to
//! `<config dir>/postreview/config.toml` for anything the project leaves unset.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Settings read from a config file. Every key is optional.
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Path to the git executable
    pub git: Option<PathBuf>,
    /// Estimated command length at which an archive batch is closed
    pub batch_limit: Option<usize>,
    /// Console log format: pretty, json or compact
    pub log_format: Option<String>,
    /// Tracing filter level
    pub log_level: Option<String>,
    /// Append JSON event lines to this file
    pub log_file: Option<PathBuf>,
}

/// The per-repository config file name
pub const CONFIG_FILE_NAME: &str = "postreview.toml";

impl ProjectConfig {
    /// Load configuration from the repository directory.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if file exists and parses successfully
    /// - `Ok(None)` if file does not exist
    /// - `Err(...)` if file exists but fails to parse (hard error)
    pub fn load(repo_dir: &Path) -> Result<Option<Self>> {
        Self::load_file(&repo_dir.join(CONFIG_FILE_NAME))
    }

    /// Load the user-wide configuration, if the platform has a config dir.
    pub fn load_user() -> Result<Option<Self>> {
        match dirs::config_dir() {
            Some(dir) => Self::load_file(&dir.join("postreview").join("config.toml")),
            None => Ok(None),
        }
    }

    /// Project file first, user file for whatever it leaves unset.
    pub fn load_layered(repo_dir: &Path) -> Result<Self> {
        let project = Self::load(repo_dir)?.unwrap_or_default();
        let user = Self::load_user()?.unwrap_or_default();
        Ok(project.or(user))
    }

    fn load_file(config_path: &Path) -> Result<Option<Self>> {
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let config: ProjectConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        Ok(Some(config))
    }

    /// Fill unset keys from `fallback`.
    pub fn or(self, fallback: ProjectConfig) -> ProjectConfig {
        ProjectConfig {
            git: self.git.or(fallback.git),
            batch_limit: self.batch_limit.or(fallback.batch_limit),
            log_format: self.log_format.or(fallback.log_format),
            log_level: self.log_level.or(fallback.log_level),
            log_file: self.log_file.or(fallback.log_file),
        }
    }
}
