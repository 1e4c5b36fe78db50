//! Application configuration management.
//!
//! This module handles loading and saving the watched-roots list. The
//! configuration lives in a JSON document; the history store keeps its
//! own document alongside it.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Directories covered by the `watch` command and history backfills.
    #[serde(default)]
    pub watch_roots: Vec<PathBuf>,
}

impl Config {
    /// Load the configuration from `path`.
    ///
    /// A missing or unreadable file yields the defaults; the failure is
    /// logged at debug level so a corrupt config never blocks startup.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        match Self::load_internal(path) {
            Ok(config) => config,
            Err(e) => {
                log::debug!("Failed to load config, using defaults: {e:#}");
                Self::default()
            }
        }
    }

    fn load_internal(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save the configuration to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    /// Add a watched root. Returns `false` if it was already present.
    pub fn add_root(&mut self, root: PathBuf) -> bool {
        if self.watch_roots.contains(&root) {
            return false;
        }
        self.watch_roots.push(root);
        true
    }

    /// Remove a watched root. Returns `false` if it was not present.
    pub fn remove_root(&mut self, root: &Path) -> bool {
        let before = self.watch_roots.len();
        self.watch_roots.retain(|watched| watched != root);
        self.watch_roots.len() != before
    }
}

/// Default platform-specific configuration file path.
pub fn default_config_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join("config.json"))
}

/// Default history document path, kept alongside the configuration.
pub fn default_history_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join("history.json"))
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "dupewatch", "dupewatch")
        .ok_or_else(|| anyhow::anyhow!("Failed to determine project directories"))
}
