use tracing::{debug, warn};

use super::opportunity::opportunity_costs;
use super::scheduler::schedule;
use super::{offer_constants, EnergyBlocks};
use crate::config::Config;
use crate::error::{BidderError, Result};
use crate::models::{parse_timestamp, MarketData, OfferValue, ResourceData, ResourceOffer};
use crate::state::PriceHistory;

/// Day-ahead offer: scheduled quantities priced at their opportunity cost.
///
/// Returns the offer and the forecast it used, so the forecast can be kept
/// for later calls whose market data omits previous prices.
pub fn day_ahead_offer(
    config: &Config,
    market: &MarketData,
    resource: &ResourceData,
    history: Option<&PriceHistory>,
) -> Result<(ResourceOffer, PriceHistory)> {
    let timestamps = &market.timestamps;
    if timestamps.is_empty() {
        return Err(BidderError::Market("market has no timestamps".to_string()));
    }

    let bus = resource
        .bus
        .clone()
        .unwrap_or_else(|| config.default_bus.clone());
    let prices = forecast_prices(market, &bus, history)?;
    if prices.len() < timestamps.len() {
        return Err(BidderError::Market(format!(
            "price forecast has {} points but the market has {} intervals",
            prices.len(),
            timestamps.len()
        )));
    }
    let prices = &prices[..timestamps.len()];

    let battery = &config.battery;
    let plan = schedule(prices, battery, config.scheduler.soc_resolution)?;
    let costs = opportunity_costs(prices, &plan, battery.efficiency, config.pricing.price_floor)?;

    let mut blocks = EnergyBlocks::default();
    for (i, t) in timestamps.iter().enumerate() {
        debug!(
            "{} offer tuple ({:.3}, ${:.3}) does not require binning.",
            t, plan.charge[i], costs.charge[i]
        );
        blocks.ch_mq.insert(t.clone(), OfferValue::Scalar(plan.charge[i]));
        blocks.ch_mc.insert(t.clone(), OfferValue::Scalar(costs.charge[i]));
        blocks.dc_mq.insert(t.clone(), OfferValue::Scalar(plan.discharge[i]));
        blocks.dc_mc.insert(t.clone(), OfferValue::Scalar(costs.discharge[i]));
        blocks.soc_mq.insert(t.clone(), OfferValue::Scalar(0.0));
        blocks.soc_mc.insert(t.clone(), OfferValue::Scalar(0.0));
    }

    let (soc_begin, init_en) = estimate_initial_state(config, market, resource)?;
    let mut constants = offer_constants(config, resource.status()?);
    constants.soc_begin = soc_begin;
    constants.init_en = init_en;
    debug!("ready to save DA offer");

    let forecast = PriceHistory {
        market_type: market.market_type.clone(),
        bus,
        timestamps: timestamps.clone(),
        prices: prices.to_vec(),
    };

    Ok((blocks.into_offer(timestamps, config, constants), forecast))
}

/// Forecast prices: previous market results, else the last saved forecast
fn forecast_prices(
    market: &MarketData,
    bus: &str,
    history: Option<&PriceHistory>,
) -> Result<Vec<f64>> {
    if let Some(prices) = market.previous_prices(bus) {
        return Ok(prices.to_vec());
    }

    match history {
        Some(saved) => {
            if saved.market_type != market.market_type {
                warn!(
                    "saved forecast is from market {} but this market is {}",
                    saved.market_type, market.market_type
                );
            }
            if saved.bus != bus {
                warn!(
                    "saved forecast is for bus {} but the resource is at {}",
                    saved.bus, bus
                );
            }
            debug!(
                "market data has no previous {} prices; using saved forecast",
                market.market_type
            );
            Ok(saved.prices.clone())
        }
        None => Err(BidderError::Market(format!(
            "no previous {} energy prices for bus {} and no saved forecast",
            market.market_type, bus
        ))),
    }
}

/// Starting SoC and dispatch for the first interval of the market.
///
/// Already scheduled dispatch between now and the first interval is netted out
/// of the current SoC; charging is scaled by the charge efficiency.
fn estimate_initial_state(
    config: &Config,
    market: &MarketData,
    resource: &ResourceData,
) -> Result<(f64, f64)> {
    let battery = &config.battery;
    let status = resource.status()?;
    let first = &market.timestamps[0];

    let (soc, dispatch) = match resource.energy_schedule() {
        Some(scheduled) if !scheduled.is_empty() => {
            let t_init = parse_timestamp(first)?;
            let t_now = market.now()?;

            let mut delivered = 0.0;
            for (t, quantity) in scheduled {
                let t = parse_timestamp(t)?;
                if t_now <= t && t < t_init {
                    delivered += if *quantity < 0.0 {
                        quantity * battery.efficiency
                    } else {
                        *quantity
                    };
                }
            }

            let soc = status.soc - delivered * battery.interval_hours();
            let dispatch = scheduled.get(first).copied().unwrap_or(0.0);
            (soc, dispatch)
        }
        _ => (status.soc, 0.0),
    };

    Ok((soc.clamp(battery.socmin, battery.socmax), dispatch))
}
