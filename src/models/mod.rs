//! Data models module
//!
//! Defines the platform's market and resource inputs and the offer output.
//! Includes MarketData, MarketKind, ResourceData, OfferValue, ResourceOffer, Offer.

pub mod market;
pub mod offer;
pub mod resource;

pub use market::{parse_timestamp, MarketData, MarketKind};
#[allow(unused_imports)]
pub use offer::{uniform_series, Block, Offer, OfferConstants, OfferValue, ResourceOffer, Series};
pub use resource::{LedgerOrder, ResourceData, ResourceStatus};
