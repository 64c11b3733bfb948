//! State persistence module
//!
//! The bidder is re-created on every platform call; anything that must survive
//! between calls is stored here in JSON format (.bidder-state.json).

mod types;

pub use types::{PriceHistory, State};

use crate::error::{BidderError, Result};
use std::fs;
use std::path::Path;

/// Load state, or a fresh state if the file does not exist yet
pub fn load(path: &Path) -> Result<State> {
    if !path.exists() {
        return Ok(State::default());
    }

    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| {
        BidderError::State(format!(
            "Cannot parse state file '{}': {}. Run 'espa-bidder state reset' to start over.",
            path.display(),
            e
        ))
    })
}

/// Save state as pretty-printed JSON
pub fn save(state: &State, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(state)?;
    fs::write(path, json)?;
    Ok(())
}
