use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Offer value for one interval: a single price/quantity or a curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OfferValue {
    Scalar(f64),
    Curve(Vec<f64>),
}

impl OfferValue {
    /// Apply `f` to every element
    pub fn map(&self, f: impl Fn(f64) -> f64) -> OfferValue {
        match self {
            OfferValue::Scalar(v) => OfferValue::Scalar(f(*v)),
            OfferValue::Curve(vs) => OfferValue::Curve(vs.iter().map(|v| f(*v)).collect()),
        }
    }

    /// Sum of all elements
    pub fn total(&self) -> f64 {
        match self {
            OfferValue::Scalar(v) => *v,
            OfferValue::Curve(vs) => vs.iter().sum(),
        }
    }

    pub fn values(&self) -> Vec<f64> {
        match self {
            OfferValue::Scalar(v) => vec![*v],
            OfferValue::Curve(vs) => vs.clone(),
        }
    }
}

/// Interval-keyed offer block
pub type Block = BTreeMap<String, OfferValue>;

/// Interval-keyed scalar series
pub type Series = BTreeMap<String, f64>;

/// Offer for one storage resource, in the platform's field layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceOffer {
    pub block_ch_mc: Block,
    pub block_ch_mq: Block,
    pub block_dc_mc: Block,
    pub block_dc_mq: Block,
    pub block_soc_mc: Block,
    pub block_soc_mq: Block,

    pub cost_rgu: Series,
    pub cost_rgd: Series,
    pub cost_spr: Series,
    pub cost_nsp: Series,

    pub chmax: Series,
    pub dcmax: Series,

    #[serde(flatten)]
    pub constants: OfferConstants,
}

/// Scalar offer parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferConstants {
    pub soc_begin: f64,
    pub init_en: f64,
    pub init_status: i32,
    pub ramp_dn: f64,
    pub ramp_up: f64,
    pub socmax: f64,
    pub socmin: f64,
    pub eff_ch: f64,
    pub eff_dc: f64,
    pub soc_end: f64,
    pub bid_soc: bool,
}

/// Complete offer file content, keyed by resource id
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Offer {
    pub resources: BTreeMap<String, ResourceOffer>,
}

impl Offer {
    pub fn single(rid: &str, offer: ResourceOffer) -> Self {
        let mut resources = BTreeMap::new();
        resources.insert(rid.to_string(), offer);
        Self { resources }
    }
}

/// Same value for every interval
pub fn uniform_series(timestamps: &[String], value: f64) -> Series {
    timestamps.iter().map(|t| (t.clone(), value)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offer_value_untagged_serialization() {
        let scalar = serde_json::to_string(&OfferValue::Scalar(12.5)).unwrap();
        assert_eq!(scalar, "12.5");

        let curve = serde_json::to_string(&OfferValue::Curve(vec![1.0, 2.0])).unwrap();
        assert_eq!(curve, "[1.0,2.0]");

        let parsed: OfferValue = serde_json::from_str("[3, 4.5]").unwrap();
        assert_eq!(parsed, OfferValue::Curve(vec![3.0, 4.5]));
        let parsed: OfferValue = serde_json::from_str("7").unwrap();
        assert_eq!(parsed, OfferValue::Scalar(7.0));
    }

    #[test]
    fn test_offer_value_map_and_total() {
        let curve = OfferValue::Curve(vec![1.0, 2.0, 3.0]);
        assert_eq!(curve.map(|v| v + 1.0), OfferValue::Curve(vec![2.0, 3.0, 4.0]));
        assert_eq!(curve.total(), 6.0);
        assert_eq!(OfferValue::Scalar(4.0).map(|v| v * 2.0).total(), 8.0);
    }

    #[test]
    fn test_uniform_series() {
        let ts = vec!["202407010000".to_string(), "202407010100".to_string()];
        let series = uniform_series(&ts, 125.0);
        assert_eq!(series.len(), 2);
        assert!(series.values().all(|v| *v == 125.0));
    }

    #[test]
    fn test_offer_is_keyed_by_resource() {
        let constants = OfferConstants {
            soc_begin: 128.0,
            init_en: 0.0,
            init_status: 1,
            ramp_dn: 9999.0,
            ramp_up: 9999.0,
            socmax: 608.0,
            socmin: 128.0,
            eff_ch: 0.892,
            eff_dc: 1.0,
            soc_end: 128.0,
            bid_soc: false,
        };
        let offer = Offer::single(
            "R1",
            ResourceOffer {
                block_ch_mc: Block::new(),
                block_ch_mq: Block::new(),
                block_dc_mc: Block::new(),
                block_dc_mq: Block::new(),
                block_soc_mc: Block::new(),
                block_soc_mq: Block::new(),
                cost_rgu: Series::new(),
                cost_rgd: Series::new(),
                cost_spr: Series::new(),
                cost_nsp: Series::new(),
                chmax: Series::new(),
                dcmax: Series::new(),
                constants,
            },
        );

        let json: serde_json::Value = serde_json::to_value(&offer).unwrap();
        assert_eq!(json["R1"]["bid_soc"], serde_json::json!(false));
        assert_eq!(json["R1"]["init_status"], serde_json::json!(1));
        assert!(json["R1"]["block_ch_mc"].is_object());
    }
}
