//! Collapse quantity/price pairs into a bounded number of offer segments

use crate::error::{BidderError, Result};

const PRICE_EPS: f64 = 1e-6;
const QUANTITY_EPS: f64 = 1e-9;

/// Offer curve binner
#[derive(Debug, Clone, Copy)]
pub struct Binner {
    max_bins: usize,
}

impl Binner {
    pub fn new(max_bins: usize) -> Self {
        Self {
            max_bins: max_bins.max(1),
        }
    }

    /// Merge `(mq[i], mc[i])` segments into at most `max_bins` segments sorted by price.
    ///
    /// Non-positive quantities are dropped, equal prices are combined, and then the
    /// closest neighbouring prices are merged at their quantity-weighted price.
    pub fn collate(&self, mq: &[f64], mc: &[f64]) -> Result<(Vec<f64>, Vec<f64>)> {
        if mq.len() != mc.len() {
            return Err(BidderError::Offer(format!(
                "quantity and price lists have different lengths ({} vs {})",
                mq.len(),
                mc.len()
            )));
        }

        let mut segments: Vec<(f64, f64)> = mq
            .iter()
            .zip(mc)
            .filter(|(q, _)| **q > QUANTITY_EPS)
            .map(|(q, p)| (*q, *p))
            .collect();
        segments.sort_by(|a, b| a.1.total_cmp(&b.1));

        let mut merged: Vec<(f64, f64)> = Vec::with_capacity(segments.len());
        for (q, p) in segments {
            match merged.last_mut() {
                Some(last) if (last.1 - p).abs() <= PRICE_EPS => last.0 += q,
                _ => merged.push((q, p)),
            }
        }

        while merged.len() > self.max_bins {
            let at = merged
                .windows(2)
                .enumerate()
                .min_by(|(_, a), (_, b)| (a[1].1 - a[0].1).total_cmp(&(b[1].1 - b[0].1)))
                .map(|(i, _)| i)
                .unwrap_or(0);
            let (q1, p1) = merged[at];
            let (q2, p2) = merged.remove(at + 1);
            let quantity = q1 + q2;
            merged[at] = (quantity, (q1 * p1 + q2 * p2) / quantity);
        }

        Ok(merged.into_iter().unzip())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorts_by_price_and_drops_empty_segments() {
        let binner = Binner::new(10);
        let (mq, mc) = binner
            .collate(&[5.0, 0.0, 3.0], &[40.0, 10.0, 20.0])
            .unwrap();
        assert_eq!(mq, vec![3.0, 5.0]);
        assert_eq!(mc, vec![20.0, 40.0]);
    }

    #[test]
    fn test_equal_prices_are_combined() {
        let binner = Binner::new(10);
        let (mq, mc) = binner
            .collate(&[1.0, 2.0, 4.0], &[30.0, 30.0, 50.0])
            .unwrap();
        assert_eq!(mq, vec![3.0, 4.0]);
        assert_eq!(mc, vec![30.0, 50.0]);
    }

    #[test]
    fn test_nearly_equal_prices_are_combined() {
        let binner = Binner::new(10);
        let (mq, mc) = binner
            .collate(&[10.0, 5.0, 2.0], &[20.0, 20.0 + 5e-7, 20.0 + 1e-4])
            .unwrap();
        assert_eq!(mq, vec![15.0, 2.0]);
        assert_eq!(mc, vec![20.0, 20.0 + 1e-4]);
    }

    #[test]
    fn test_limits_segment_count_preserving_quantity() {
        let binner = Binner::new(2);
        let (mq, mc) = binner
            .collate(&[1.0, 1.0, 2.0], &[10.0, 11.0, 50.0])
            .unwrap();

        assert_eq!(mq.len(), 2);
        assert_eq!(mq, vec![2.0, 2.0]);
        assert!((mc[0] - 10.5).abs() < 1e-9);
        assert_eq!(mc[1], 50.0);
    }

    #[test]
    fn test_mismatched_lengths_are_rejected() {
        let binner = Binner::new(3);
        let err = binner.collate(&[1.0], &[1.0, 2.0]).unwrap_err();
        assert!(err.to_string().contains("different lengths"));
    }

    #[test]
    fn test_empty_input_gives_empty_curve() {
        let (mq, mc) = Binner::new(3).collate(&[], &[]).unwrap();
        assert!(mq.is_empty());
        assert!(mc.is_empty());
    }
}
