use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::cli::offer::parse_offer_step;
use crate::config;
use crate::error::{BidderError, Result};
use crate::models::Offer;
use crate::renderer::Renderer;

/// Display the offer with the highest time step
pub fn latest(config_path: Option<PathBuf>, output_dir: Option<PathBuf>) -> Result<()> {
    let config = config::load_or_default(config_path)?;
    let output_dir = output_dir.unwrap_or_else(|| config.output_dir.clone());

    let (step, latest_file) = find_latest_offer(&output_dir)?;

    let content = fs::read_to_string(&latest_file)?;
    let offer: Offer = serde_json::from_str(&content)?;

    let renderer = Renderer::new(&config);
    crate::display::print_markdown(&renderer.render(&offer, Some(step)));

    Ok(())
}

/// Find the offer file with the highest time step in the output directory
fn find_latest_offer(output_dir: &Path) -> Result<(i64, PathBuf)> {
    if !output_dir.exists() {
        return Err(BidderError::Config(format!(
            "Output directory does not exist: {}",
            output_dir.display()
        )));
    }

    WalkDir::new(output_dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            let step = parse_offer_step(entry.file_name().to_str()?)?;
            Some((step, entry.into_path()))
        })
        .max_by_key(|(step, _)| *step)
        .ok_or_else(|| {
            BidderError::Config(
                "No offer files found. Run 'espa-bidder offer' first.".to_string(),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_latest_uses_numeric_step_order() {
        let temp = TempDir::new().unwrap();
        for name in ["offer_9.json", "offer_10.json", "offer_2.json", "notes.json"] {
            fs::write(temp.path().join(name), "{}").unwrap();
        }

        let (step, path) = find_latest_offer(temp.path()).unwrap();
        assert_eq!(step, 10);
        assert!(path.ends_with("offer_10.json"));
    }

    #[test]
    fn test_empty_directory_is_error() {
        let temp = TempDir::new().unwrap();
        let err = find_latest_offer(temp.path()).unwrap_err();
        assert!(err.to_string().contains("No offer files found"));
    }

    #[test]
    fn test_missing_directory_is_error() {
        let err = find_latest_offer(Path::new("/nonexistent/offers")).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
