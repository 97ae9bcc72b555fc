use crate::transfer::file::DEFAULT_CHUNK_SIZE;
use crate::transfer::orchestrator::DEFAULT_MAX_ATTEMPTS;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Upper bound for `transfer.max_attempts`
pub const MAX_ATTEMPTS_LIMIT: u32 = 100;

/// Application configuration (saved to config/settings.toml)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub transfer: TransferConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Bytes read and written per chunk
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Consecutive failures before a session stops
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Render progress bars when attached to a terminal
    #[serde(default = "default_show_progress")]
    pub show_progress: bool,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_show_progress() -> bool {
    true
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            max_attempts: default_max_attempts(),
            show_progress: default_show_progress(),
        }
    }
}

/// Validation errors for configuration values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// `transfer.chunk_size` must be at least one byte
    ZeroChunkSize,
    /// `transfer.max_attempts` outside `1..=MAX_ATTEMPTS_LIMIT`
    MaxAttemptsOutOfRange(u32),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::ZeroChunkSize => write!(f, "transfer.chunk_size must be greater than 0"),
            ValidationError::MaxAttemptsOutOfRange(value) => write!(
                f,
                "transfer.max_attempts must be between 1 and {} (got {})",
                MAX_ATTEMPTS_LIMIT, value
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

impl Config {
    /// Load configuration from the config directory's settings.toml
    pub fn load() -> anyhow::Result<Self> {
        let config_path = crate::util::paths::get_app_config_path()?;
        Self::load_from(&config_path)
    }

    /// Save configuration to the config directory's settings.toml
    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = crate::util::paths::get_app_config_path()?;
        self.save_to(&config_path)
    }

    /// Load from an explicit file; a missing file yields defaults
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::info!("Config not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        let config: Config =
            toml::from_str(&content).with_context(|| format!("Failed to parse {:?}", path))?;

        config.check().context("Invalid configuration")?;
        Ok(config)
    }

    /// Validate, then write atomically (temp file + rename)
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        self.check().context("Cannot save invalid config")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        let temp_path = path.with_extension("toml.tmp");
        std::fs::write(&temp_path, &content).context("Failed to write temp config file")?;
        std::fs::rename(&temp_path, path).context("Failed to rename temp config file")?;

        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Collect every problem at once rather than stopping at the first
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.transfer.chunk_size == 0 {
            errors.push(ValidationError::ZeroChunkSize);
        }
        if !(1..=MAX_ATTEMPTS_LIMIT).contains(&self.transfer.max_attempts) {
            errors.push(ValidationError::MaxAttemptsOutOfRange(
                self.transfer.max_attempts,
            ));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    fn check(&self) -> anyhow::Result<()> {
        self.validate().map_err(|errors| {
            anyhow::anyhow!(
                "{}",
                errors
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        })
    }
}
