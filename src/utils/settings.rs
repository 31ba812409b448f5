//! Settings and configuration utilities.
//!
//! Settings are read once at startup from `$HOME/.git-log-analyser/settings.json`
//! (or an explicit path) and resolved into the values threaded through a run,
//! such as the [`GitTool`] every fetch uses.

use std::collections::{BTreeMap, HashMap};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::git::runner::DEFAULT_GIT_PROGRAM;
use crate::git::GitTool;

/// Environment variable naming the git executable.
pub const GIT_PROGRAM_VAR: &str = "GIT_LOG_ANALYSER_GIT";

/// Settings loaded from `$HOME/.git-log-analyser/settings.json`.
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    /// Extra environment for git invocations, also consulted when an
    /// environment variable is not set.
    #[serde(default)]
    pub env: HashMap<String, String>,

    /// Path or name of the git executable.
    #[serde(default)]
    pub git: Option<String>,

    /// Replacement for the built-in ticket prefix alias table.
    #[serde(default)]
    pub ticket_aliases: Option<BTreeMap<String, String>>,
}

impl Settings {
    /// Loads settings from the default location.
    pub fn load() -> Result<Self> {
        let settings_path = Self::get_settings_path()?;
        Self::load_from_path(&settings_path)
    }

    /// Loads settings from a specific path; a missing file yields defaults.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            debug!(path = %path.display(), "No settings file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

        serde_json::from_str::<Self>(&content)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))
    }

    /// Returns the default settings path.
    pub fn get_settings_path() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().context("Failed to determine home directory")?;

        Ok(home_dir.join(".git-log-analyser").join("settings.json"))
    }

    /// Returns an environment variable with fallback to settings.
    pub fn get_env_var(&self, key: &str) -> Option<String> {
        match env::var(key) {
            Ok(value) => Some(value),
            Err(_) => self.env.get(key).cloned(),
        }
    }

    /// Resolves the git executable and its environment block.
    ///
    /// The program comes from the `git` setting, then [`GIT_PROGRAM_VAR`],
    /// then `git` on the `PATH`.
    pub fn git_tool(&self) -> GitTool {
        let program = self
            .git
            .clone()
            .or_else(|| self.get_env_var(GIT_PROGRAM_VAR))
            .unwrap_or_else(|| DEFAULT_GIT_PROGRAM.to_string());

        let tool = self
            .env
            .iter()
            .fold(GitTool::new(program), |tool, (key, value)| {
                tool.with_env(key, value)
            });
        debug!(program = %tool.program(), "Resolved git tool");
        tool
    }
}
