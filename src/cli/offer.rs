use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config;
use crate::error::{BidderError, Result};
use crate::models::{MarketData, ResourceData};
use crate::renderer::Renderer;
use crate::state;
use crate::strategy;

/// Offer file name for a time step
pub fn offer_file_name(step: i64) -> String {
    format!("offer_{}.json", step)
}

/// Time step encoded in an offer file name
pub fn parse_offer_step(name: &str) -> Option<i64> {
    name.strip_prefix("offer_")?
        .strip_suffix(".json")?
        .parse()
        .ok()
}

fn read_input<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|e| {
        BidderError::Market(format!(
            "Cannot read {} from '{}': {}",
            what,
            path.display(),
            e
        ))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        BidderError::Market(format!(
            "Invalid {} in '{}': {}",
            what,
            path.display(),
            e
        ))
    })
}

/// Build and save the offer for one platform call
pub fn run(
    step: i64,
    market_path: PathBuf,
    resource_path: PathBuf,
    config_path: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    dry_run: bool,
) -> Result<()> {
    let config = config::load_or_default(config_path)?;

    let market: MarketData = read_input(&market_path, "market data")?;
    let resource: ResourceData = read_input(&resource_path, "resource data")?;

    let mut state = state::load(&config.state_file)?;

    let bid = strategy::build_offer(&config, &market, &resource, state.day_ahead.as_ref())?;

    if dry_run {
        let renderer = Renderer::new(&config);
        crate::display::print_markdown(&renderer.render(&bid.offer, Some(step)));
        return Ok(());
    }

    let output_dir = output_dir.unwrap_or_else(|| config.output_dir.clone());
    if !output_dir.exists() {
        fs::create_dir_all(&output_dir)?;
    }

    let output_path = output_dir.join(offer_file_name(step));
    info!("saving {}", output_path.display());
    fs::write(&output_path, serde_json::to_string_pretty(&bid.offer)?)?;

    println!("Offer written to: {}", output_path.display());

    state.record(step, bid.forecast);
    state::save(&state, &config.state_file)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_offer_file_name_roundtrip() {
        assert_eq!(offer_file_name(28), "offer_28.json");
        assert_eq!(parse_offer_step("offer_28.json"), Some(28));
    }

    #[test]
    fn test_parse_offer_step_rejects_other_files() {
        assert_eq!(parse_offer_step("offer_x.json"), None);
        assert_eq!(parse_offer_step("market_28.json"), None);
        assert_eq!(parse_offer_step("offer_28.toml"), None);
    }

    #[test]
    fn test_read_input_reports_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("market_1.json");
        fs::write(&path, "{\"uid\": 3}").unwrap();

        let err = read_input::<MarketData>(&path, "market data").unwrap_err();
        assert!(err.to_string().contains("Invalid market data"));
        assert!(err.to_string().contains("market_1.json"));
    }
}
