use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{BidderError, Result};

/// Bidder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory where offer files are written
    pub output_dir: PathBuf,

    /// Path to state file persisted between platform calls
    pub state_file: PathBuf,

    /// Pricing node used when the resource data carries no bus
    pub default_bus: String,

    /// Storage unit parameters
    pub battery: Battery,

    /// Offer pricing options
    pub pricing: Pricing,

    /// Day-ahead scheduler settings
    pub scheduler: SchedulerSettings,
}

/// Standard battery parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Battery {
    /// Maximum state of charge (MWh)
    pub socmax: f64,

    /// Minimum state of charge (MWh)
    pub socmin: f64,

    /// Maximum charge rate (MW)
    pub chmax: f64,

    /// Maximum discharge rate (MW)
    pub dcmax: f64,

    /// Round-trip efficiency, applied on the charge side
    pub efficiency: f64,

    /// Length of a real-time market interval
    pub duration_minutes: f64,
}

/// Offer pricing options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pricing {
    pub price_ceiling: f64,
    pub price_floor: f64,

    /// Added to every discharge price before the offer is written
    pub discharge_markup: f64,

    /// Subtracted from every charge price before the offer is written
    pub charge_markdown: f64,

    /// Maximum number of segments in a binned offer curve
    pub max_bins: usize,

    /// Real-time offers open each period with full-capacity zero-price segments
    pub rt_zero_offers: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerSettings {
    /// SoC grid step (MWh)
    pub soc_resolution: f64,
}

impl Battery {
    /// Usable energy window (MWh)
    pub fn capacity(&self) -> f64 {
        self.socmax - self.socmin
    }

    /// Fraction of an hour covered by one real-time interval
    pub fn interval_hours(&self) -> f64 {
        self.duration_minutes / 60.0
    }
}

impl Config {
    /// Reject parameter combinations the strategies cannot work with
    pub fn validate(&self) -> Result<()> {
        let b = &self.battery;
        if b.socmin < 0.0 || b.socmin >= b.socmax {
            return Err(BidderError::Config(format!(
                "socmin ({}) must be non-negative and below socmax ({})",
                b.socmin, b.socmax
            )));
        }
        if !(b.efficiency > 0.0 && b.efficiency <= 1.0) {
            return Err(BidderError::Config(format!(
                "efficiency must be in (0, 1], got {}",
                b.efficiency
            )));
        }
        if b.chmax <= 0.0 || b.dcmax <= 0.0 || b.duration_minutes <= 0.0 {
            return Err(BidderError::Config(
                "chmax, dcmax and duration_minutes must be positive".to_string(),
            ));
        }
        if self.scheduler.soc_resolution <= 0.0 {
            return Err(BidderError::Config(format!(
                "soc_resolution must be positive, got {}",
                self.scheduler.soc_resolution
            )));
        }
        if self.pricing.price_floor > self.pricing.price_ceiling {
            return Err(BidderError::Config(format!(
                "price_floor ({}) exceeds price_ceiling ({})",
                self.pricing.price_floor, self.pricing.price_ceiling
            )));
        }
        if self.pricing.max_bins == 0 {
            return Err(BidderError::Config("max_bins must be at least 1".to_string()));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            state_file: PathBuf::from("./.bidder-state.json"),
            default_bus: "NEVP".to_string(),
            battery: Battery::default(),
            pricing: Pricing::default(),
            scheduler: SchedulerSettings::default(),
        }
    }
}

impl Default for Battery {
    fn default() -> Self {
        Self {
            socmax: 608.0,
            socmin: 128.0,
            chmax: 125.0,
            dcmax: 125.0,
            efficiency: 0.892,
            duration_minutes: 5.0,
        }
    }
}

impl Default for Pricing {
    fn default() -> Self {
        Self {
            price_ceiling: 999.0,
            price_floor: 0.0,
            discharge_markup: 1.0,
            charge_markdown: 0.0,
            max_bins: 10,
            rt_zero_offers: true,
        }
    }
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            soc_resolution: 1.0,
        }
    }
}
