use std::collections::BTreeMap;
use std::ops::Bound;

use tracing::{debug, info, warn};

use super::binner::Binner;
use super::{offer_constants, EnergyBlocks};
use crate::config::Config;
use crate::error::Result;
use crate::models::{LedgerOrder, MarketData, OfferValue, ResourceData, ResourceOffer};

/// Capacity and energy below this are not offered
const MIN_OFFER: f64 = 1e-2;

#[derive(Default)]
struct Curve {
    mq: Vec<f64>,
    mc: Vec<f64>,
}

impl Curve {
    fn push(&mut self, quantity: f64, price: f64) {
        self.mq.push(quantity);
        self.mc.push(price);
    }

    fn quantity(&self) -> f64 {
        self.mq.iter().sum()
    }
}

/// Running SoC position while walking the ledger
struct Position {
    available: f64,
    headroom: f64,
    best_charge: f64,
    best_discharge: f64,
}

/// Real-time offer: ledger-aware charge/discharge curves plus a SoC valuation
/// curve at the end of the horizon.
pub fn real_time_offer(
    config: &Config,
    market: &MarketData,
    resource: &ResourceData,
) -> Result<ResourceOffer> {
    let battery = &config.battery;
    let pricing = &config.pricing;
    let status = resource.status()?;
    let ledger = resource.energy_ledger();

    let mut pos = Position {
        available: status.soc - battery.socmin,
        headroom: battery.socmax - status.soc,
        best_charge: pricing.price_ceiling,
        best_discharge: pricing.price_floor,
    };

    let t_end = market.last_timestamp()?.to_string();
    debug!("Last timestamp set to {}", t_end);

    let mut charge: BTreeMap<String, Curve> = BTreeMap::new();
    let mut discharge: BTreeMap<String, Curve> = BTreeMap::new();

    for t in &market.timestamps {
        let ch = charge.entry(t.clone()).or_default();
        let dc = discharge.entry(t.clone()).or_default();

        let Some(orders) = ledger.get(t) else {
            ch.push(battery.chmax, 0.0);
            dc.push(battery.dcmax, 0.0);
            debug!("no ledger entry in period {}.", t);
            continue;
        };

        if pricing.rt_zero_offers {
            ch.push(battery.chmax, 0.0);
            dc.push(battery.dcmax, 0.0);
        }

        debug!(
            "generating energy ledger in period {}. number of orders={}",
            t,
            orders.len()
        );
        for (i, order) in orders.iter().enumerate() {
            debug!("{}: looking into order {}: {:?}", t, i + 1, order);
            apply_order(&mut pos, *order, t, config);
        }
    }

    // orders cleared beyond this market's horizon
    let post_market: Vec<LedgerOrder> = ledger
        .range::<str, _>((Bound::Excluded(t_end.as_str()), Bound::Unbounded))
        .flat_map(|(_, orders)| orders.iter().copied())
        .collect();
    debug!("ledger includes {} additional orders", post_market.len());
    for (_, price) in &post_market {
        pos.best_charge = pos.best_charge.min(*price);
        pos.best_discharge = pos.best_discharge.max(*price);
    }
    debug!("best charging price: {}", pos.best_charge);
    debug!("best discharging price: {}", pos.best_discharge);

    for t in &market.timestamps {
        if let Some(dc) = discharge.get_mut(t) {
            let capacity = battery.dcmax - dc.quantity();
            if capacity > MIN_OFFER {
                dc.push(capacity, pos.best_discharge);
                debug!("added {} discharging capacity in time {}", capacity, t);
            }
        }
        if let Some(ch) = charge.get_mut(t) {
            let capacity = battery.chmax - ch.quantity();
            if capacity > MIN_OFFER {
                ch.push(capacity, pos.best_charge);
                debug!("added {} charging capacity in time {}", capacity, t);
            }
        }
    }

    let soc_curve = value_remaining_energy(&pos, post_market, config);
    info!("SoC offer has {} elements", soc_curve.mq.len());
    let (soc_mq, soc_mc) = Binner::new(pricing.max_bins).collate(&soc_curve.mq, &soc_curve.mc)?;
    info!("Binned SoC offer has {} elements", soc_mq.len());
    debug!("binned soc quantities are {:?}", soc_mq);
    debug!("binned soc prices are {:?}", soc_mc);

    let mut blocks = EnergyBlocks::default();
    for (t, curve) in charge {
        blocks.ch_mq.insert(t.clone(), OfferValue::Curve(curve.mq));
        blocks.ch_mc.insert(t, OfferValue::Curve(curve.mc));
    }
    for (t, curve) in discharge {
        blocks.dc_mq.insert(t.clone(), OfferValue::Curve(curve.mq));
        blocks.dc_mc.insert(t, OfferValue::Curve(curve.mc));
    }
    blocks.soc_mq.insert(t_end.clone(), OfferValue::Curve(soc_mq));
    blocks.soc_mc.insert(t_end, OfferValue::Curve(soc_mc));

    let mut constants = offer_constants(config, status);
    constants.bid_soc = true;

    Ok(blocks.into_offer(&market.timestamps, config, constants))
}

/// Track SoC and best prices through one cleared order
fn apply_order(pos: &mut Position, (quantity, price): LedgerOrder, t: &str, config: &Config) {
    let battery = &config.battery;
    let energy = quantity * battery.interval_hours();

    if -pos.headroom <= energy && energy < 0.0 {
        let stored = -energy * battery.efficiency;
        pos.available += stored;
        pos.headroom -= stored;
        pos.best_charge = pos.best_charge.min(price);
    } else if 0.0 < energy && energy <= pos.available {
        pos.available -= energy;
        pos.headroom += energy;
        pos.best_discharge = pos.best_discharge.max(price);
    } else if energy < -pos.headroom {
        warn!(
            "Period {}: Scheduled charge exceeds SoC headroom. Setting headroom to zero and available to max.",
            t
        );
        pos.headroom = 0.0;
        pos.available = battery.capacity();
        pos.best_charge = pos.best_charge.min(price);
    } else if energy > pos.available {
        warn!(
            "Period {}: Scheduled discharge exceeds SoC available. Setting available to zero and headroom to max.",
            t
        );
        pos.headroom = battery.capacity();
        pos.available = 0.0;
        pos.best_discharge = pos.best_discharge.max(price);
    } else {
        debug!("Period {}: ignoring zero-quantity order at ${}", t, price);
    }

    if pos.available < 0.0 {
        warn!("Scheduled energy flows result in SoC below min in {}", t);
    }
    if pos.headroom < 0.0 {
        warn!("Scheduled energy flows result in SoC above max in {}", t);
    }
}

/// Value energy left at the end of the horizon against later cleared sales,
/// highest price first; anything unsold is held at the price ceiling.
fn value_remaining_energy(pos: &Position, mut orders: Vec<LedgerOrder>, config: &Config) -> Curve {
    let hours = config.battery.interval_hours();
    orders.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut curve = Curve::default();
    let mut remaining = pos.available;
    info!(
        "{:.3} MWh available at end of horizon. Allocating value...",
        remaining
    );

    for (quantity, price) in orders {
        let energy = quantity * hours;
        if 0.0 < energy && energy <= remaining {
            debug!("post horizon SoC quantity {} valued at {}.", quantity, price);
            remaining -= energy;
            curve.push(energy, price);
        } else if 0.0 < remaining && remaining < energy {
            curve.push(remaining, price);
            remaining = 0.0;
        } else if remaining < MIN_OFFER {
            break;
        }
    }

    if remaining > MIN_OFFER {
        curve.push(remaining, config.pricing.price_ceiling);
    }
    curve.push(pos.headroom, 0.0);
    curve
}
