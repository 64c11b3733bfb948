use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::error::{BidderError, Result};

/// A cleared order on the energy ledger: (quantity MW, price $/MWh).
/// Negative quantities are charging.
pub type LedgerOrder = (f64, f64);

/// Resource data passed in by the platform for one call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceData {
    /// Resource identifier used as the offer key
    pub rid: String,

    /// Pricing node of the resource
    #[serde(default)]
    pub bus: Option<String>,

    #[serde(default)]
    pub status: HashMap<String, ResourceStatus>,

    /// Scheduled dispatch from cleared markets
    #[serde(default)]
    pub schedule: HashMap<String, EnergySchedule>,

    /// Cleared orders not yet delivered
    #[serde(default)]
    pub ledger: HashMap<String, EnergyLedger>,
}

/// Physical status of a resource at call time
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ResourceStatus {
    /// State of charge (MWh)
    pub soc: f64,

    /// Current dispatch (MW, positive is discharge)
    #[serde(default)]
    pub dispatch: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnergySchedule {
    #[serde(rename = "EN", default)]
    pub energy: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnergyLedger {
    #[serde(rename = "EN", default)]
    pub energy: BTreeMap<String, Vec<LedgerOrder>>,
}

impl ResourceData {
    /// Status of this resource
    pub fn status(&self) -> Result<ResourceStatus> {
        self.status.get(&self.rid).copied().ok_or_else(|| {
            BidderError::Market(format!("resource data has no status for '{}'", self.rid))
        })
    }

    /// Scheduled energy dispatch keyed by interval, if any market has cleared yet
    pub fn energy_schedule(&self) -> Option<&BTreeMap<String, f64>> {
        self.schedule.get(&self.rid).map(|s| &s.energy)
    }

    /// Energy ledger keyed by interval; empty when nothing has cleared
    pub fn energy_ledger(&self) -> BTreeMap<String, Vec<LedgerOrder>> {
        self.ledger
            .get(&self.rid)
            .map(|l| l.energy.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resource_with_ledger() {
        let resource: ResourceData = serde_json::from_str(
            r#"{
                "rid": "R1",
                "bus": "NEVP",
                "status": {"R1": {"soc": 300.0, "dispatch": -20.0}},
                "schedule": {"R1": {"EN": {"202407011005": -50.0}}},
                "ledger": {"R1": {"EN": {"202407011005": [[-50.0, 18.5], [10.0, 44.0]]}}}
            }"#,
        )
        .unwrap();

        let status = resource.status().unwrap();
        assert_eq!(status.soc, 300.0);
        assert_eq!(status.dispatch, -20.0);

        let ledger = resource.energy_ledger();
        assert_eq!(ledger["202407011005"], vec![(-50.0, 18.5), (10.0, 44.0)]);
        assert_eq!(
            resource.energy_schedule().unwrap()["202407011005"],
            -50.0
        );
    }

    #[test]
    fn test_missing_sections_default_empty() {
        let resource: ResourceData = serde_json::from_str(
            r#"{"rid": "R1", "status": {"R1": {"soc": 128.0}}}"#,
        )
        .unwrap();

        assert!(resource.bus.is_none());
        assert!(resource.energy_schedule().is_none());
        assert!(resource.energy_ledger().is_empty());
        assert_eq!(resource.status().unwrap().dispatch, 0.0);
    }

    #[test]
    fn test_missing_status_is_error() {
        let resource: ResourceData =
            serde_json::from_str(r#"{"rid": "R1", "status": {}}"#).unwrap();
        let err = resource.status().unwrap_err();
        assert!(err.to_string().contains("no status for 'R1'"));
    }
}
