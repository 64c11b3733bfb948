use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{BidderError, Result};

/// Timestamp layout used by the platform for interval keys
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M";

/// Character length of a formatted timestamp
const TIMESTAMP_FORMAT_LEN: usize = 12;

/// Parse a platform timestamp key such as `202407011300`
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    Ok(NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)?)
}

/// Which kind of offer a market call expects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketKind {
    DayAhead,
    RealTime,
}

impl MarketKind {
    /// Classify a platform market type string (e.g. `TSDAM`, `RTM`)
    pub fn from_market_type(market_type: &str) -> Result<Self> {
        if market_type.contains("DAM") {
            Ok(MarketKind::DayAhead)
        } else if market_type.contains("RTM") {
            Ok(MarketKind::RealTime)
        } else {
            Err(BidderError::Market(format!(
                "Unable to find offer function for market_type={}",
                market_type
            )))
        }
    }
}

/// Market data passed in by the platform for one call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketData {
    /// Market clearing identifier; ends with the clearing time
    pub uid: String,

    pub market_type: String,

    /// Intervals covered by this market, in order
    pub timestamps: Vec<String>,

    /// Clearing time, when the platform supplies it explicitly
    #[serde(default)]
    pub current_time: Option<String>,

    /// Results of previously cleared markets, keyed by market type
    #[serde(default)]
    pub previous: HashMap<String, PreviousMarket>,
}

/// A previously cleared market
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreviousMarket {
    #[serde(default)]
    pub timestamp: Vec<String>,

    #[serde(default)]
    pub prices: Option<ClearedPrices>,
}

/// Cleared prices per product
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClearedPrices {
    /// Energy prices keyed by bus
    #[serde(rename = "EN", default)]
    pub energy: HashMap<String, Vec<f64>>,
}

impl MarketData {
    pub fn kind(&self) -> Result<MarketKind> {
        MarketKind::from_market_type(&self.market_type)
    }

    /// Last interval of the market horizon
    pub fn last_timestamp(&self) -> Result<&str> {
        self.timestamps
            .iter()
            .max()
            .map(String::as_str)
            .ok_or_else(|| BidderError::Market("market has no timestamps".to_string()))
    }

    /// Current clearing time
    pub fn now(&self) -> Result<NaiveDateTime> {
        if let Some(current) = &self.current_time {
            return parse_timestamp(current);
        }

        let digits = TIMESTAMP_FORMAT_LEN;
        if self.uid.len() < digits || !self.uid.is_char_boundary(self.uid.len() - digits) {
            return Err(BidderError::Market(format!(
                "market uid '{}' does not end with a timestamp",
                self.uid
            )));
        }
        parse_timestamp(&self.uid[self.uid.len() - digits..])
    }

    /// Energy price forecast for `bus` from the previous market of the same type
    pub fn previous_prices(&self, bus: &str) -> Option<&[f64]> {
        self.previous
            .get(&self.market_type)
            .and_then(|prev| prev.prices.as_ref())
            .and_then(|prices| prices.energy.get(bus))
            .map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn sample() -> MarketData {
        serde_json::from_str(
            r#"{
                "uid": "TSDAM202407011000",
                "market_type": "TSDAM",
                "timestamps": ["202407020000", "202407020100"],
                "previous": {
                    "TSDAM": {
                        "timestamp": ["202407010000", "202407010100"],
                        "prices": {"EN": {"NEVP": [21.5, 40.0]}}
                    }
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_market_kind_classification() {
        assert_eq!(
            MarketKind::from_market_type("TSDAM").unwrap(),
            MarketKind::DayAhead
        );
        assert_eq!(
            MarketKind::from_market_type("RTM").unwrap(),
            MarketKind::RealTime
        );
        let err = MarketKind::from_market_type("FOO").unwrap_err();
        assert!(err.to_string().contains("market_type=FOO"));
    }

    #[test]
    fn test_now_from_uid_suffix() {
        let now = sample().now().unwrap();
        assert_eq!(now.day(), 1);
        assert_eq!(now.hour(), 10);
    }

    #[test]
    fn test_now_prefers_current_time() {
        let mut market = sample();
        market.current_time = Some("202407011215".to_string());
        let now = market.now().unwrap();
        assert_eq!(now.minute(), 15);
    }

    #[test]
    fn test_now_rejects_short_uid() {
        let mut market = sample();
        market.uid = "DAM1".to_string();
        assert!(market.now().is_err());
    }

    #[test]
    fn test_previous_prices_lookup() {
        let market = sample();
        assert_eq!(market.previous_prices("NEVP"), Some(&[21.5, 40.0][..]));
        assert_eq!(market.previous_prices("CISO"), None);
    }

    #[test]
    fn test_last_timestamp() {
        let market = sample();
        assert_eq!(market.last_timestamp().unwrap(), "202407020100");
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert!(parse_timestamp("2024-07-01").is_err());
    }
}
