use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// State carried between platform calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct State {
    /// State file format version
    pub version: String,

    /// Last time state was updated
    pub last_updated: DateTime<Utc>,

    /// Time step of the last offer written
    #[serde(default)]
    pub last_step: Option<i64>,

    /// Forecast used by the most recent day-ahead offer
    #[serde(default)]
    pub day_ahead: Option<PriceHistory>,
}

/// Energy prices a day-ahead offer was built from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceHistory {
    pub market_type: String,
    pub bus: String,
    pub timestamps: Vec<String>,
    pub prices: Vec<f64>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            last_updated: Utc::now(),
            last_step: None,
            day_ahead: None,
        }
    }
}

impl State {
    /// Record a completed offer for `step`
    pub fn record(&mut self, step: i64, forecast: Option<PriceHistory>) {
        self.last_step = Some(step);
        if forecast.is_some() {
            self.day_ahead = forecast;
        }
        self.last_updated = Utc::now();
    }
}
