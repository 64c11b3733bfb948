use crate::config::{self, Config, DEFAULT_CONFIG_FILE};
use crate::error::Result;
use std::path::PathBuf;

/// Initialize bidder.toml configuration file
pub fn init(path: Option<PathBuf>) -> Result<()> {
    let config_path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    if config_path.exists() {
        eprintln!(
            "Configuration file already exists at: {}",
            config_path.display()
        );
        eprintln!("Remove it first if you want to reinitialize.");
        return Ok(());
    }

    let config = Config::default();
    config::save(&config, &config_path)?;

    println!("Configuration file created: {}", config_path.display());
    println!("\nNext steps:");
    println!(
        "1. Edit {} to match your battery and pricing options",
        config_path.display()
    );
    println!("2. Run 'espa-bidder offer <STEP> <MARKET_JSON> <RESOURCE_JSON>' to write an offer");

    Ok(())
}
