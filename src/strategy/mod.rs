//! Offer strategies
//!
//! Day-ahead offers come from a forecast schedule and its opportunity costs.
//! Real-time offers are built from the cleared energy ledger.

mod binner;
mod day_ahead;
mod opportunity;
mod real_time;
mod scheduler;

pub use day_ahead::day_ahead_offer;
pub use real_time::real_time_offer;

use tracing::{debug, info};

use crate::config::Config;
use crate::error::Result;
use crate::models::{
    uniform_series, Block, MarketData, MarketKind, Offer, OfferConstants, ResourceData,
    ResourceOffer, ResourceStatus,
};
use crate::state::PriceHistory;

/// Reserve products offered at zero cost
const RESERVE_PRODUCTS: usize = 4;

/// Ramp limits wide enough to never bind
const UNLIMITED_RAMP: f64 = 9999.0;

/// An offer plus the day-ahead forecast it was built from
#[derive(Debug, Clone)]
pub struct Bid {
    pub offer: Offer,
    pub forecast: Option<PriceHistory>,
}

/// Per-interval energy and SoC blocks of an offer
#[derive(Debug, Clone, Default)]
pub(crate) struct EnergyBlocks {
    pub ch_mc: Block,
    pub ch_mq: Block,
    pub dc_mc: Block,
    pub dc_mq: Block,
    pub soc_mc: Block,
    pub soc_mq: Block,
}

impl EnergyBlocks {
    /// Attach default reserve, capacity, and constant fields
    pub(crate) fn into_offer(
        self,
        timestamps: &[String],
        config: &Config,
        constants: OfferConstants,
    ) -> ResourceOffer {
        let [cost_rgu, cost_rgd, cost_spr, cost_nsp] =
            [(); RESERVE_PRODUCTS].map(|_| uniform_series(timestamps, 0.0));

        ResourceOffer {
            block_ch_mc: self.ch_mc,
            block_ch_mq: self.ch_mq,
            block_dc_mc: self.dc_mc,
            block_dc_mq: self.dc_mq,
            block_soc_mc: self.soc_mc,
            block_soc_mq: self.soc_mq,
            cost_rgu,
            cost_rgd,
            cost_spr,
            cost_nsp,
            chmax: uniform_series(timestamps, config.battery.chmax),
            dcmax: uniform_series(timestamps, config.battery.dcmax),
            constants,
        }
    }
}

/// Offer constants for the resource's current status
pub(crate) fn offer_constants(config: &Config, status: ResourceStatus) -> OfferConstants {
    let battery = &config.battery;
    OfferConstants {
        soc_begin: status.soc,
        init_en: status.dispatch,
        init_status: 1,
        ramp_dn: UNLIMITED_RAMP,
        ramp_up: UNLIMITED_RAMP,
        socmax: battery.socmax,
        socmin: battery.socmin,
        eff_ch: battery.efficiency,
        eff_dc: 1.0,
        soc_end: battery.socmin,
        bid_soc: false,
    }
}

/// Subtract `adjustment` from every charge price
pub fn decrease_charge_offers(offer: &mut ResourceOffer, adjustment: f64) {
    debug!("old charge block is {:?}", offer.block_ch_mc);
    shift_block(&mut offer.block_ch_mc, -adjustment);
    info!("decreasing charging offers by ${}", adjustment);
}

/// Add `adjustment` to every discharge price
pub fn increase_discharge_offers(offer: &mut ResourceOffer, adjustment: f64) {
    debug!("old discharge block is {:?}", offer.block_dc_mc);
    shift_block(&mut offer.block_dc_mc, adjustment);
    info!("increasing discharging offers by ${}", adjustment);
}

fn shift_block(block: &mut Block, by: f64) {
    for value in block.values_mut() {
        *value = value.map(|price| price + by);
    }
}

/// Build the offer for this market call
pub fn build_offer(
    config: &Config,
    market: &MarketData,
    resource: &ResourceData,
    history: Option<&PriceHistory>,
) -> Result<Bid> {
    let (mut resource_offer, forecast) = match market.kind()? {
        MarketKind::DayAhead => {
            info!("generating DA offer...");
            let (offer, forecast) = day_ahead_offer(config, market, resource, history)?;
            (offer, Some(forecast))
        }
        MarketKind::RealTime => {
            info!(
                "generating RT offer for t={}...",
                market.timestamps.first().map(String::as_str).unwrap_or("?")
            );
            (real_time_offer(config, market, resource)?, None)
        }
    };

    if config.pricing.charge_markdown != 0.0 {
        decrease_charge_offers(&mut resource_offer, config.pricing.charge_markdown);
    }
    if config.pricing.discharge_markup != 0.0 {
        increase_discharge_offers(&mut resource_offer, config.pricing.discharge_markup);
    }

    Ok(Bid {
        offer: Offer::single(&resource.rid, resource_offer),
        forecast,
    })
}
