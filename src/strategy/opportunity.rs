//! Opportunity costs of deviating from a schedule
//!
//! For every period the charge cost is the highest price worth paying to charge
//! and the discharge cost is the lowest price worth accepting to discharge, given
//! the next-best buy and sell prices around the scheduled cycles.

use tracing::debug;

use super::scheduler::Schedule;
use crate::error::{BidderError, Result};

const NET_EPS: f64 = 1e-9;

/// Per-period marginal costs derived from a schedule
#[derive(Debug, Clone, PartialEq)]
pub struct OpportunityCosts {
    pub charge: Vec<f64>,
    pub discharge: Vec<f64>,
}

fn min_of(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

fn max_of(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

/// `prices[start..end]`, empty when the range is inverted
fn span(prices: &[f64], start: usize, end: usize) -> &[f64] {
    let end = end.min(prices.len());
    if start < end {
        &prices[start..end]
    } else {
        &[]
    }
}

struct Evaluator<'a> {
    prices: &'a [f64],
    net: Vec<f64>,
    efficiency: f64,
    price_floor: f64,
}

impl<'a> Evaluator<'a> {
    fn is_charging(&self, idx: usize) -> bool {
        self.net[idx] < -NET_EPS
    }

    fn is_discharging(&self, idx: usize) -> bool {
        self.net[idx] > NET_EPS
    }

    fn last(&self) -> usize {
        self.prices.len() - 1
    }

    /// Scheduled to charge in `idx`
    fn during_charge(&self, idx: usize) -> (f64, f64) {
        let p = self.prices;
        let eff = self.efficiency;

        // next discharge, or end of horizon
        let j = (idx + 1..p.len())
            .find(|&k| self.is_discharging(k))
            .unwrap_or(self.last());

        if idx == 0 {
            let tail = eff * p[j];
            let oc_ch = min_of(span(p, 1, j)).map_or(tail, |m| m.min(tail));
            return (oc_ch, oc_ch + 0.01);
        }

        // next best purchase price, next best sale price
        let buy = min_of(&p[..idx]).unwrap_or(p[idx]);
        let sell = if j == idx + 1 {
            0.0
        } else if j == idx + 2 {
            p[j - 1]
        } else {
            max_of(span(p, idx, j + 1)).unwrap_or(p[idx])
        };

        let others = p[..idx].iter().chain(&p[idx + 1..]).copied().reduce(f64::min);
        let oc_ch = others.unwrap_or(p[idx]) * eff;
        let oc_dis = buy * eff + sell - p[idx];
        (oc_ch, oc_dis)
    }

    /// Scheduled to discharge in `idx`
    fn during_discharge(&self, idx: usize) -> (f64, f64) {
        let p = self.prices;
        let eff = self.efficiency;

        // last charge before the previous period, or start of horizon
        let j = (0..idx.saturating_sub(1))
            .rev()
            .find(|&k| self.is_charging(k))
            .unwrap_or(0);

        let sell = if idx == self.last() {
            0.0
        } else {
            max_of(&p[idx + 1..]).unwrap_or(0.0)
        };

        let buy = if idx >= 1 && j == idx - 1 {
            p[j].min(0.0)
        } else if idx >= 2 && j == idx - 2 {
            p[j + 1]
        } else {
            min_of(span(p, j + 1, idx)).unwrap_or(p[idx])
        };

        let oc_ch = (p[idx] - buy) * eff - sell;
        let oc_dis = min_of(span(p, j, idx)).unwrap_or(p[idx]) / eff;
        (oc_ch, oc_dis)
    }

    /// Idle before the first scheduled charge at `first_charge`
    fn before_first_charge(&self, first_charge: usize, idx: usize) -> (f64, f64) {
        let p = self.prices;
        let oc_ch = min_of(&p[idx..=first_charge]).unwrap_or(p[idx]) * self.efficiency;
        let oc_dis = min_of(&p[..idx]).unwrap_or(p[idx]) / self.efficiency;
        (oc_ch, oc_dis)
    }

    /// Idle after the last scheduled discharge at `last_discharge`
    fn after_last_discharge(&self, last_discharge: usize, idx: usize) -> (f64, f64) {
        let p = self.prices;
        let oc_ch = if idx + 2 <= p.len() {
            max_of(&p[idx + 1..]).unwrap_or(self.price_floor) * self.efficiency
        } else {
            self.price_floor
        };
        let oc_dis = min_of(&p[last_discharge..=idx]).unwrap_or(p[idx]) / self.efficiency;
        (oc_ch, oc_dis)
    }

    /// Idle between a charge and a later discharge
    fn between_cycles(&self, idx: usize) -> Result<(f64, f64)> {
        let p = self.prices;
        let eff = self.efficiency;

        let next_dis = (idx..p.len())
            .find(|&k| self.is_discharging(k))
            .ok_or_else(|| {
                BidderError::Schedule(format!("no discharge after idle period {}", idx))
            })?;
        let prev_ch = (0..idx)
            .rev()
            .find(|&k| self.is_charging(k))
            .ok_or_else(|| {
                BidderError::Schedule(format!("no charge before idle period {}", idx))
            })?;

        let oc_ch = if idx <= prev_ch + 1 {
            p[prev_ch]
        } else {
            let held = max_of(&p[prev_ch + 1..idx]).unwrap_or(p[prev_ch]);
            (held * eff).max(p[prev_ch])
        };

        let oc_dis = if idx + 1 >= next_dis {
            p[next_dis].min(p[idx + 1] / eff)
        } else {
            let ahead = min_of(&p[idx + 1..=next_dis]).unwrap_or(p[next_dis]);
            p[next_dis].min(ahead / eff)
        };

        Ok((oc_ch, oc_dis))
    }
}

/// Compute charge and discharge opportunity costs for `schedule` under `prices`
pub fn opportunity_costs(
    prices: &[f64],
    schedule: &Schedule,
    efficiency: f64,
    price_floor: f64,
) -> Result<OpportunityCosts> {
    if prices.len() != schedule.len() {
        return Err(BidderError::Schedule(format!(
            "schedule covers {} periods but {} prices were given",
            schedule.len(),
            prices.len()
        )));
    }

    let eval = Evaluator {
        prices,
        net: schedule.net(),
        efficiency,
        price_floor,
    };

    let first_charge = (0..prices.len())
        .find(|&k| eval.is_charging(k))
        .ok_or_else(|| BidderError::Schedule("schedule never charges".to_string()))?;
    let last_discharge = (0..prices.len())
        .rev()
        .find(|&k| eval.is_discharging(k))
        .ok_or_else(|| BidderError::Schedule("schedule never discharges".to_string()))?;

    let mut charge = Vec::with_capacity(prices.len());
    let mut discharge = Vec::with_capacity(prices.len());

    for idx in 0..prices.len() {
        let (oc_ch, oc_dis) = if eval.is_charging(idx) {
            eval.during_charge(idx)
        } else if eval.is_discharging(idx) {
            eval.during_discharge(idx)
        } else if idx < first_charge {
            eval.before_first_charge(first_charge, idx)
        } else if idx > last_discharge {
            eval.after_last_discharge(last_discharge, idx)
        } else {
            eval.between_cycles(idx)?
        };

        debug!(
            "price...\ttime {}\tlmp {}\tch {:.3}\tdc {:.3}",
            idx, prices[idx], oc_ch, oc_dis
        );
        charge.push(oc_ch);
        discharge.push(oc_dis);
    }

    if charge.iter().all(|c| *c == 0.0) {
        return Err(BidderError::Schedule(
            "opportunity costs: charge list has no values".to_string(),
        ));
    }
    if discharge.iter().all(|d| *d == 0.0) {
        return Err(BidderError::Schedule(
            "opportunity costs: discharge list has no values".to_string(),
        ));
    }

    Ok(OpportunityCosts { charge, discharge })
}
