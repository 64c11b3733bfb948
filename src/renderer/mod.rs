//! Markdown renderer module
//!
//! Summarizes an offer file in Markdown for terminal display.
//! Renders sections: Summary, Energy Offers, SoC Valuation.

use crate::config::Config;
use crate::models::{Offer, OfferValue, ResourceOffer};

/// Markdown renderer for offers
pub struct Renderer<'a> {
    config: &'a Config,
}

impl<'a> Renderer<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Render every resource in an offer to Markdown
    pub fn render(&self, offer: &Offer, step: Option<i64>) -> String {
        let mut output = String::new();

        match step {
            Some(step) => output.push_str(&format!("# Offer: step {}\n\n", step)),
            None => output.push_str("# Offer\n\n"),
        }

        for (rid, resource) in &offer.resources {
            output.push_str(&self.render_resource(rid, resource));
            output.push_str("\n\n");
        }

        output.trim_end().to_string()
    }

    fn render_resource(&self, rid: &str, offer: &ResourceOffer) -> String {
        let mut output = String::new();

        output.push_str(&format!("**Resource:** `{}`\n\n", rid));
        output.push_str(&self.render_summary(offer));
        output.push_str("\n\n");
        output.push_str(&self.render_energy(offer));

        if has_soc_offer(offer) {
            output.push_str("\n\n");
            output.push_str(&self.render_soc(offer));
        }

        output
    }

    /// Render summary table
    fn render_summary(&self, offer: &ResourceOffer) -> String {
        let c = &offer.constants;
        let intervals = offer.block_ch_mq.len();
        let rated = self.config.battery.chmax.max(self.config.battery.dcmax) * intervals as f64;
        let charge: f64 = offer.block_ch_mq.values().map(OfferValue::total).sum();
        let discharge: f64 = offer.block_dc_mq.values().map(OfferValue::total).sum();

        let mut output = String::new();
        output.push_str("## Summary\n\n");
        output.push_str("| Field | Value |\n");
        output.push_str("|-------|-------|\n");
        output.push_str(&format!("| Intervals | {} |\n", intervals));
        output.push_str(&format!("| SoC begin | {:.2} MWh |\n", c.soc_begin));
        output.push_str(&format!(
            "| SoC window | {:.0} – {:.0} MWh |\n",
            c.socmin, c.socmax
        ));
        output.push_str(&format!("| Initial dispatch | {:.2} MW |\n", c.init_en));
        output.push_str(&format!(
            "| SoC bidding | {} |\n",
            if c.bid_soc { "yes" } else { "no" }
        ));
        output.push_str(&format!(
            "| Charge offered | {:.2} MW ({}) |\n",
            charge,
            share(charge, rated)
        ));
        output.push_str(&format!(
            "| Discharge offered | {:.2} MW ({}) |",
            discharge,
            share(discharge, rated)
        ));

        output
    }

    /// Render per-interval charge and discharge offers
    fn render_energy(&self, offer: &ResourceOffer) -> String {
        let mut output = String::new();

        output.push_str("## Energy Offers\n\n");
        output.push_str("| Interval | Charge MW | Charge $ | Discharge MW | Discharge $ |\n");
        output.push_str("|----------|-----------|----------|--------------|-------------|\n");

        for t in offer.block_ch_mq.keys() {
            output.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                t,
                cell(offer.block_ch_mq.get(t)),
                cell(offer.block_ch_mc.get(t)),
                cell(offer.block_dc_mq.get(t)),
                cell(offer.block_dc_mc.get(t)),
            ));
        }

        output.trim_end().to_string()
    }

    /// Render SoC valuation curve
    fn render_soc(&self, offer: &ResourceOffer) -> String {
        let mut output = String::new();

        output.push_str("## SoC Valuation\n\n");
        output.push_str("| Interval | MWh | $ |\n");
        output.push_str("|----------|-----|---|\n");

        for (t, quantity) in &offer.block_soc_mq {
            if quantity.total() == 0.0 {
                continue;
            }
            output.push_str(&format!(
                "| {} | {} | {} |\n",
                t,
                cell(Some(quantity)),
                cell(offer.block_soc_mc.get(t))
            ));
        }

        output.trim_end().to_string()
    }
}

fn has_soc_offer(offer: &ResourceOffer) -> bool {
    offer.block_soc_mq.values().any(|v| v.total() != 0.0)
}

fn share(value: f64, rated: f64) -> String {
    if rated > 0.0 {
        format!("{:.0}% of rated", 100.0 * value / rated)
    } else {
        "n/a".to_string()
    }
}

/// Format a block entry; curves are joined with " / "
fn cell(value: Option<&OfferValue>) -> String {
    match value {
        None => "-".to_string(),
        Some(value) => value
            .values()
            .iter()
            .map(|v| format!("{:.2}", v))
            .collect::<Vec<_>>()
            .join(" / "),
    }
}
