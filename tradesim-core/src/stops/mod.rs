//! Trailing-stop engine — three stop policies racing over the same price path.
//!
//! ## Policies
//!
//! - [`FixedDistance`] — constant distance below price
//! - [`VolatilityScaled`] — ATR multiple below price
//! - [`StructuralSwing`] — just under the latest swing low
//!
//! All three share one trailing loop ([`trail`]) which enforces the ratchet
//! invariant: the stop may rise but never fall, and once hit it stays flat.

pub mod engine;
pub mod grading;
pub mod policy;
pub mod ratchet;

pub use engine::{trail, StopPoint, StopPolicyResult, TrailState};
pub use grading::{capture_ratio, Grade, GradeThresholds};
pub use policy::{
    FixedDistance, StopPolicy, StopPolicyKind, StructuralSwing, TrailingParams, VolatilityScaled,
};
pub use ratchet::Ratchet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::PricePoint;

/// Results for all three policies over one path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopComparison {
    pub fixed: StopPolicyResult,
    pub volatility: StopPolicyResult,
    pub structural: StopPolicyResult,
}

/// Stop levels of all three policies at one playback step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StopLevels {
    pub fixed: Option<f64>,
    pub volatility: Option<f64>,
    pub structural: Option<f64>,
}

impl StopComparison {
    pub fn get(&self, kind: StopPolicyKind) -> &StopPolicyResult {
        match kind {
            StopPolicyKind::Fixed => &self.fixed,
            StopPolicyKind::Volatility => &self.volatility,
            StopPolicyKind::Structural => &self.structural,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &StopPolicyResult> {
        [&self.fixed, &self.volatility, &self.structural].into_iter()
    }

    /// Results ordered by profit, best first. Ties keep policy order.
    pub fn ranked(&self) -> Vec<&StopPolicyResult> {
        let mut ranked: Vec<&StopPolicyResult> = self.iter().collect();
        ranked.sort_by(|a, b| b.profit.total_cmp(&a.profit));
        ranked
    }

    pub fn at(&self, step: usize) -> StopLevels {
        StopLevels {
            fixed: self.fixed.stop_at(step),
            volatility: self.volatility.stop_at(step),
            structural: self.structural.stop_at(step),
        }
    }
}

/// Run all three policies over `path` with the default grade thresholds.
pub fn run_trailing_stop_comparison(path: &[PricePoint], params: &TrailingParams) -> StopComparison {
    run_trailing_stop_comparison_with(path, params, &GradeThresholds::default())
}

/// Run all three policies over `path`.
///
/// Parameters are sanitized first; the path is only read.
pub fn run_trailing_stop_comparison_with(
    path: &[PricePoint],
    params: &TrailingParams,
    thresholds: &GradeThresholds,
) -> StopComparison {
    let params = params.sanitized();
    let comparison = StopComparison {
        fixed: trail(path, &params.fixed(), thresholds),
        volatility: trail(path, &params.volatility(), thresholds),
        structural: trail(path, &params.structural(), thresholds),
    };
    for result in comparison.iter() {
        debug!(
            policy = %result.policy,
            exit_index = ?result.exit_index,
            profit = result.profit,
            grade = %result.grade,
            "trailing stop result"
        );
    }
    comparison
}
