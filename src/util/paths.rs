use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::RwLock;

/// Environment variable naming an explicit config directory
pub const CONFIG_DIR_ENV: &str = "DATAMGR_CONFIG_DIR";

// Global config directory override (for --config flag and tests)
static CONFIG_DIR_OVERRIDE: RwLock<Option<PathBuf>> = RwLock::new(None);

/// Set config directory override (used by --config flag and tests)
pub fn set_config_dir_override(path: Option<PathBuf>) {
    let mut override_path = CONFIG_DIR_OVERRIDE
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *override_path = path;
}

/// Get current config directory override
pub fn get_config_dir_override() -> Option<PathBuf> {
    CONFIG_DIR_OVERRIDE
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}

/// Find config directory by searching in priority order:
/// 1. Override from --config flag or set_config_dir_override() (highest priority)
/// 2. Environment variable DATAMGR_CONFIG_DIR
/// 3. User config directory (`~/.config/datamgr/` on Unix, `%APPDATA%\datamgr\` on Windows)
///
/// The chosen directory is created if it does not exist yet.
pub fn find_config_directory() -> Result<PathBuf> {
    let config_dir = if let Some(override_path) = get_config_dir_override() {
        tracing::debug!("Using config directory override: {:?}", override_path);
        override_path
    } else if let Some(env_path) = std::env::var_os(CONFIG_DIR_ENV).filter(|v| !v.is_empty()) {
        let env_config = PathBuf::from(env_path);
        tracing::debug!("Using config directory from {}: {:?}", CONFIG_DIR_ENV, env_config);
        env_config
    } else {
        get_user_config_dir()?
    };

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create config directory {:?}", config_dir))?;
        tracing::info!("Created config directory at: {:?}", config_dir);
    }
    Ok(config_dir)
}

/// Get platform-specific user config directory
/// - Windows: `%APPDATA%\datamgr`
/// - Unix: `~/.config/datamgr`
fn get_user_config_dir() -> Result<PathBuf> {
    let base_dir = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine user config directory"))?;
    Ok(base_dir.join("datamgr"))
}

/// Get absolute path to settings.toml
pub fn get_app_config_path() -> Result<PathBuf> {
    let config_dir = find_config_directory()?;
    Ok(config_dir.join("settings.toml"))
}

/// Get absolute path to locations.toml (default and recent locations)
pub fn get_locations_path() -> Result<PathBuf> {
    let config_dir = find_config_directory()?;
    Ok(config_dir.join("locations.toml"))
}

/// Get absolute path to application-wide logs directory
pub fn get_logs_dir() -> Result<PathBuf> {
    let config_dir = find_config_directory()?;
    Ok(config_dir.join(".logs"))
}
