use crate::config;
use crate::error::Result;
use std::fs;
use std::path::PathBuf;

/// Reset persisted state by deleting the state file
pub fn reset(config_path: Option<PathBuf>) -> Result<()> {
    let config = config::load_or_default(config_path)?;

    if config.state_file.exists() {
        fs::remove_file(&config.state_file)?;
        println!("State file deleted: {}", config.state_file.display());
        println!("Saved day-ahead forecast cleared.");
    } else {
        println!("State file does not exist: {}", config.state_file.display());
        println!("Nothing to reset.");
    }

    Ok(())
}
