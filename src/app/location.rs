//! Default destination preference and recently used locations
//!
//! Stored next to settings.toml as `locations.toml`. The store is only read
//! by the CLI layer; the transfer core receives the resolved directory as a
//! plain value.

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Number of recent locations remembered
pub const MAX_RECENT: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationStore {
    #[serde(default)]
    pub default_location: Option<PathBuf>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
    /// Most recent first, no duplicates
    #[serde(default)]
    pub recent: Vec<PathBuf>,
}

impl LocationStore {
    /// Load from the config directory; a missing file yields an empty store
    pub fn load() -> anyhow::Result<Self> {
        let path = crate::util::paths::get_locations_path()?;
        Self::load_from(&path)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let path = crate::util::paths::get_locations_path()?;
        self.save_to(&path)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse {:?}", path))
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        let temp_path = path.with_extension("toml.tmp");
        std::fs::write(&temp_path, &content).context("Failed to write temp locations file")?;
        std::fs::rename(&temp_path, path).context("Failed to rename temp locations file")?;

        tracing::debug!("Saved locations to {:?}", path);
        Ok(())
    }

    /// The configured default, if it still is a directory
    pub fn default_location(&self) -> Option<&Path> {
        let location = self.default_location.as_deref()?;
        if location.is_dir() {
            Some(location)
        } else {
            tracing::warn!("Default location {:?} is no longer a directory", location);
            None
        }
    }

    /// Make `location` the default and push it to the front of the recent list
    pub fn set_default(&mut self, location: PathBuf) {
        self.remember(location.clone());
        self.default_location = Some(location);
        self.last_updated = Some(Utc::now());
    }

    /// Record a location as recently used without changing the default
    pub fn remember(&mut self, location: PathBuf) {
        self.recent.retain(|existing| existing != &location);
        self.recent.insert(0, location);
        self.recent.truncate(MAX_RECENT);
    }

    /// Forget the default; recent locations are kept
    pub fn clear_default(&mut self) {
        self.default_location = None;
        self.last_updated = Some(Utc::now());
    }
}
