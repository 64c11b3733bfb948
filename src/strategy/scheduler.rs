//! Profit-maximizing charge/discharge schedule over a price forecast
//!
//! Backward dynamic programming over a discretized state-of-charge grid.
//! The grid is refined until full-rate charge and discharge moves land on it.
//! The battery starts empty (at `socmin`) and may use the window up to `socmax`.
//! Each period is priced as one hour of operation at the forecast price.

use tracing::{debug, warn};

use crate::config::Battery;
use crate::error::{BidderError, Result};

/// Quantities below this are treated as zero
const QUANTITY_EPS: f64 = 1e-9;

/// Tolerance when matching SoC amounts to grid points
const GRID_EPS: f64 = 1e-6;

/// Finest subdivision of `soc_resolution` tried when aligning the grid
const MAX_REFINEMENT: usize = 64;

/// Upper bound on SoC grid points
const MAX_LEVELS: usize = 100_000;

/// Per-period charge and discharge quantities (MW, both non-negative)
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    pub charge: Vec<f64>,
    pub discharge: Vec<f64>,
}

impl Schedule {
    /// Net injection per period: discharge minus charge
    pub fn net(&self) -> Vec<f64> {
        self.charge
            .iter()
            .zip(&self.discharge)
            .map(|(ch, dc)| dc - ch)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.charge.len()
    }
}

fn is_multiple(value: f64, step: f64) -> bool {
    let ratio = value / step;
    (ratio - ratio.round()).abs() <= GRID_EPS
}

/// Largest grid step at or below `soc_resolution` that holds a full-rate charge
/// (`efficiency * chmax`) and a full-rate discharge (`dcmax`) exactly.
/// Steps that also divide the SoC window are preferred.
fn grid_step(battery: &Battery, soc_resolution: f64) -> f64 {
    let full_charge = battery.efficiency * battery.chmax;
    let capacity = battery.capacity();

    let mut rates_only = None;
    for k in 1..=MAX_REFINEMENT {
        let step = soc_resolution / k as f64;
        if capacity / step > MAX_LEVELS as f64 {
            break;
        }
        if is_multiple(full_charge, step) && is_multiple(battery.dcmax, step) {
            if is_multiple(capacity, step) {
                return step;
            }
            rates_only.get_or_insert(step);
        }
    }

    rates_only.unwrap_or_else(|| {
        warn!(
            "no SoC grid up to {} MWh fits the rate limits; full-rate moves are rounded down",
            soc_resolution
        );
        soc_resolution
    })
}

/// Cheapest (charge, discharge) pair that moves SoC by `delta` at `price`
fn transition(delta: f64, price: f64, battery: &Battery) -> (f64, f64) {
    let eff = battery.efficiency;
    if price < 0.0 {
        // paid to consume: charge at the highest rate the discharge limit can balance
        let charge = battery.chmax.min((battery.dcmax + delta) / eff);
        let discharge = (eff * charge - delta).max(0.0);
        (charge, discharge)
    } else if delta >= 0.0 {
        ((delta / eff).min(battery.chmax), 0.0)
    } else {
        (0.0, -delta)
    }
}

/// Build the profit-maximizing schedule for `prices`
pub fn schedule(prices: &[f64], battery: &Battery, soc_resolution: f64) -> Result<Schedule> {
    if prices.is_empty() {
        return Err(BidderError::Schedule(
            "price forecast is empty".to_string(),
        ));
    }

    let n = prices.len();
    let step = grid_step(battery, soc_resolution);
    let levels = (battery.capacity() / step + GRID_EPS).floor() as usize + 1;
    let max_up = (battery.efficiency * battery.chmax / step + GRID_EPS).floor() as usize;
    let max_down = (battery.dcmax / step + GRID_EPS).floor() as usize;
    debug!("SoC grid: {} levels of {} MWh", levels, step);

    // value[t][k]: minimum cost from period t onwards holding level k
    let mut value = vec![vec![0.0_f64; levels]; n + 1];
    let mut policy = vec![vec![0_usize; levels]; n];

    for t in (0..n).rev() {
        let price = prices[t];
        for k in 0..levels {
            let lo = k.saturating_sub(max_down);
            let hi = (k + max_up).min(levels - 1);

            let mut best_next = k;
            let (ch, dc) = transition(0.0, price, battery);
            let mut best_cost = price * (ch - dc) + value[t + 1][k];

            for next in lo..=hi {
                if next == k {
                    continue;
                }
                let delta = (next as f64 - k as f64) * step;
                let (ch, dc) = transition(delta, price, battery);
                let cost = price * (ch - dc) + value[t + 1][next];
                let better = cost < best_cost - QUANTITY_EPS
                    || (cost <= best_cost + QUANTITY_EPS
                        && next.abs_diff(k) < best_next.abs_diff(k));
                if better {
                    best_cost = cost;
                    best_next = next;
                }
            }

            value[t][k] = best_cost;
            policy[t][k] = best_next;
        }
    }

    let mut charge = Vec::with_capacity(n);
    let mut discharge = Vec::with_capacity(n);
    let mut level = 0_usize;
    for t in 0..n {
        let next = policy[t][level];
        let delta = (next as f64 - level as f64) * step;
        let (ch, dc) = transition(delta, prices[t], battery);
        debug!(
            "quantities...\ttime {}\tcharge {:.3}\tdischarge {:.3}",
            t, ch, dc
        );
        charge.push(ch);
        discharge.push(dc);
        level = next;
    }

    if charge.iter().all(|c| c.abs() <= QUANTITY_EPS) {
        return Err(BidderError::Schedule(
            "scheduler: charge list has no values".to_string(),
        ));
    }
    if discharge.iter().all(|d| d.abs() <= QUANTITY_EPS) {
        return Err(BidderError::Schedule(
            "scheduler: discharge list has no values".to_string(),
        ));
    }

    Ok(Schedule { charge, discharge })
}

#[cfg(test)]
mod tests {
    use super::*;

    impl Schedule {
        fn profit(&self, prices: &[f64]) -> f64 {
            prices.iter().zip(self.net()).map(|(p, net)| p * net).sum()
        }
    }

    fn battery() -> Battery {
        Battery::default()
    }

    #[test]
    fn test_alternating_prices_cycle_twice() {
        let prices = [10.0, 50.0, 10.0, 50.0];
        let s = schedule(&prices, &battery(), 1.0).unwrap();

        assert!(s.charge[0] > 0.0);
        assert_eq!(s.discharge[0], 0.0);
        assert_eq!(s.charge[1], 0.0);
        assert!(s.discharge[1] > 0.0);
        assert!(s.charge[2] > 0.0);
        assert!(s.discharge[3] > 0.0);
        assert!(s.profit(&prices) > 0.0);
    }

    #[test]
    fn test_respects_rate_limits() {
        let prices = [5.0, 5.0, 5.0, 5.0, 5.0, 90.0, 90.0, 90.0, 90.0];
        let b = battery();
        let s = schedule(&prices, &b, 1.0).unwrap();

        for (ch, dc) in s.charge.iter().zip(&s.discharge) {
            assert!(*ch <= b.chmax + 1e-9);
            assert!(*dc <= b.dcmax + 1e-9);
        }
    }

    #[test]
    fn test_state_of_charge_stays_in_window() {
        let prices = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 100.0, 1.0, 2.0, 100.0];
        let b = battery();
        let s = schedule(&prices, &b, 1.0).unwrap();

        let mut soc = 0.0;
        for (ch, dc) in s.charge.iter().zip(&s.discharge) {
            soc += b.efficiency * ch - dc;
            assert!(soc >= -1e-6);
            assert!(soc <= b.capacity() + 1e-6);
        }
    }

    #[test]
    fn test_never_discharges_before_charging() {
        let prices = [80.0, 10.0, 60.0];
        let s = schedule(&prices, &battery(), 1.0).unwrap();

        assert_eq!(s.discharge[0], 0.0);
        assert!(s.charge[1] > 0.0);
        assert!(s.discharge[2] > 0.0);
    }

    #[test]
    fn test_flat_prices_are_an_error() {
        let err = schedule(&[20.0, 20.0, 20.0], &battery(), 1.0).unwrap_err();
        assert!(err.to_string().contains("charge list has no values"));
    }

    #[test]
    fn test_empty_prices_are_an_error() {
        assert!(schedule(&[], &battery(), 1.0).is_err());
    }

    #[test]
    fn test_negative_price_charges_at_full_rate() {
        let prices = [-20.0, 40.0];
        let b = battery();
        let s = schedule(&prices, &b, 1.0).unwrap();

        assert!((s.charge[0] - b.chmax).abs() < 1e-9);
        assert!(s.discharge[1] > 0.0);
    }

    #[test]
    fn test_full_rate_charge_is_reachable() {
        let prices = [10.0, 50.0];
        let b = battery();
        let s = schedule(&prices, &b, 1.0).unwrap();

        assert!((s.charge[0] - b.chmax).abs() < 1e-9);
        assert!((s.discharge[1] - 111.5).abs() < 1e-9);
        assert!((s.profit(&prices) - 4325.0).abs() < 1e-6);
    }

    #[test]
    fn test_coarse_resolution_is_refined_to_rate_limits() {
        let prices = [10.0, 50.0];
        let b = battery();
        let s = schedule(&prices, &b, 10.0).unwrap();

        assert!((s.charge[0] - b.chmax).abs() < 1e-9);
        assert!((s.discharge[1] - 111.5).abs() < 1e-9);
    }

    #[test]
    fn test_full_rate_discharge_is_reachable() {
        let prices = [5.0, 5.0, 90.0, 80.0];
        let b = battery();
        let s = schedule(&prices, &b, 1.0).unwrap();

        // 223 MWh stored: full rate in the dearer hour, the rest after
        assert!((s.discharge[2] - b.dcmax).abs() < 1e-9);
        assert!((s.discharge[3] - (223.0 - b.dcmax)).abs() < 1e-9);
    }

    #[test]
    fn test_grid_step_divides_rate_limits() {
        let b = battery();
        assert_eq!(grid_step(&b, 1.0), 0.5);
        assert_eq!(grid_step(&b, 10.0), 0.5);

        let aligned = Battery {
            efficiency: 0.9,
            chmax: 100.0,
            dcmax: 100.0,
            ..Battery::default()
        };
        assert_eq!(grid_step(&aligned, 1.0), 1.0);
    }

    #[test]
    fn test_net_is_discharge_minus_charge() {
        let s = Schedule {
            charge: vec![10.0, 0.0],
            discharge: vec![0.0, 8.0],
        };
        assert_eq!(s.net(), vec![-10.0, 8.0]);
        assert_eq!(s.len(), 2);
    }
}
