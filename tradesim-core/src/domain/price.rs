//! Price points — one synthetic time step of a scenario path.

use serde::{Deserialize, Serialize};

/// Distance kept between a clamped structural support and the price.
pub const SUPPORT_EPSILON: f64 = 0.01;

/// One step of a synthetic price path.
///
/// `structural_support` approximates the most recent swing low. It is `None`
/// until the generator has seen enough bars to place one, and it never sits
/// above `price`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub index: usize,
    pub price: f64,
    /// ATR-like scalar used by volatility-scaled stops.
    pub volatility: f64,
    pub structural_support: Option<f64>,
}

impl PricePoint {
    /// Build a point, clamping the support below the price.
    pub fn new(index: usize, price: f64, volatility: f64, structural_support: Option<f64>) -> Self {
        Self {
            index,
            price,
            volatility,
            structural_support: structural_support.map(|s| clamp_support(s, price)),
        }
    }
}

/// Clamp a structural support so it never exceeds the current price.
pub fn clamp_support(support: f64, price: f64) -> f64 {
    if support > price - SUPPORT_EPSILON {
        price - SUPPORT_EPSILON
    } else {
        support
    }
}

/// Read-only helpers over a price path.
pub trait PriceSeries {
    fn entry_price(&self) -> Option<f64>;
    fn final_price(&self) -> Option<f64>;
    fn max_price(&self) -> Option<f64>;
    fn min_price(&self) -> Option<f64>;
}

impl PriceSeries for [PricePoint] {
    fn entry_price(&self) -> Option<f64> {
        self.first().map(|p| p.price)
    }

    fn final_price(&self) -> Option<f64> {
        self.last().map(|p| p.price)
    }

    fn max_price(&self) -> Option<f64> {
        self.iter().map(|p| p.price).reduce(f64::max)
    }

    fn min_price(&self) -> Option<f64> {
        self.iter().map(|p| p.price).reduce(f64::min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(prices: &[f64]) -> Vec<PricePoint> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &p)| PricePoint::new(i, p, 1.0, None))
            .collect()
    }

    #[test]
    fn support_above_price_is_clamped() {
        let p = PricePoint::new(0, 100.0, 1.0, Some(105.0));
        assert_eq!(p.structural_support, Some(100.0 - SUPPORT_EPSILON));
    }

    #[test]
    fn support_below_price_is_kept() {
        let p = PricePoint::new(0, 100.0, 1.0, Some(95.0));
        assert_eq!(p.structural_support, Some(95.0));
    }

    #[test]
    fn series_helpers() {
        let points = path(&[100.0, 110.0, 90.0, 105.0]);
        assert_eq!(points.entry_price(), Some(100.0));
        assert_eq!(points.final_price(), Some(105.0));
        assert_eq!(points.max_price(), Some(110.0));
        assert_eq!(points.min_price(), Some(90.0));
    }

    #[test]
    fn series_helpers_empty() {
        let points: Vec<PricePoint> = Vec::new();
        assert_eq!(points.entry_price(), None);
        assert_eq!(points.max_price(), None);
    }
}
