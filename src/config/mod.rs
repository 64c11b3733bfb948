//! Configuration module
//!
//! Handles loading and saving of bidder.toml configuration files.
//! Defines Config, Battery, Pricing, and SchedulerSettings types.

mod types;

#[allow(unused_imports)]
pub use types::{Battery, Config, Pricing, SchedulerSettings};

use crate::error::{BidderError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// File looked up in the working directory when no config path is given
pub const DEFAULT_CONFIG_FILE: &str = "bidder.toml";

/// Load configuration from a TOML file
pub fn load(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|e| {
        BidderError::Config(format!(
            "Cannot read config from '{}': {}. Run 'espa-bidder config init' to create one.",
            path.display(),
            e
        ))
    })?;

    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Load the given config, or `bidder.toml` if present, or fall back to defaults
pub fn load_or_default(path: Option<PathBuf>) -> Result<Config> {
    match path {
        Some(path) => load(&path),
        None => {
            let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
            if fallback.exists() {
                load(&fallback)
            } else {
                tracing::debug!("no {} found, using built-in defaults", DEFAULT_CONFIG_FILE);
                Ok(Config::default())
            }
        }
    }
}

/// Save configuration to a TOML file
pub fn save(config: &Config, path: &Path) -> Result<()> {
    let toml = toml::to_string_pretty(config)
        .map_err(|e| BidderError::Config(format!("Failed to serialize config: {}", e)))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, toml)?;
    Ok(())
}
