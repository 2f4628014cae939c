//! Thumbnail subsystem configuration
//!
//! Loaded from `~/.config/vtl/config.toml`; every field has a default
//! so a missing or partial file works out of the box.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Configuration for the thumbnail cache and loader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThumbnailConfig {
    /// Maximum number of thumbnails tracked by the cache.
    #[serde(default = "default_cache_max_size")]
    pub cache_max_size: usize,
    /// How many recently stored thumbnails are held strongly before
    /// they become reclaimable.
    #[serde(default = "default_strong_window_size")]
    pub strong_window_size: usize,
    /// Combined capacity of the visible and background request lanes;
    /// requests beyond it are dropped rather than blocking the UI.
    #[serde(default = "default_max_queue_len")]
    pub max_queue_len: usize,
}

pub fn default_cache_max_size() -> usize {
    1000
}

pub fn default_strong_window_size() -> usize {
    64
}

pub fn default_max_queue_len() -> usize {
    512
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            cache_max_size: default_cache_max_size(),
            strong_window_size: default_strong_window_size(),
            max_queue_len: default_max_queue_len(),
        }
    }
}

/// Get the config file path (~/.config/vtl/config.toml)
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Get the config directory path (~/.config/vtl)
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("vtl"))
}

/// Load configuration from file, or return defaults if not found
pub fn load() -> Result<ThumbnailConfig> {
    let config_path = config_path()?;

    if config_path.exists() {
        let contents = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {config_path:?}"))?;
        let config: ThumbnailConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {config_path:?}"))?;
        Ok(config)
    } else {
        Ok(ThumbnailConfig::default())
    }
}

/// Save configuration to file
pub fn save(config: &ThumbnailConfig) -> Result<()> {
    let config_path = config_path()?;

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {parent:?}"))?;
    }

    let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;
    fs::write(&config_path, contents)
        .with_context(|| format!("Failed to write config file: {config_path:?}"))?;

    Ok(())
}
