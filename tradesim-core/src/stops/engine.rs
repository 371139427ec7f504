//! Trailing loop — runs one policy over a price path and grades it.
//!
//! Per bar while active:
//! 1. Ask the policy for a proposed stop.
//! 2. Ratchet it (the stop may only rise; non-finite proposals are skipped).
//! 3. From bar 1 on, exit if the price is at or below the stop. The fill is
//!    the stop level itself; slippage is not modeled.
//!
//! After the exit the loop switches to [`TrailState::Exited`] and every later
//! history entry repeats the exit price.

use serde::{Deserialize, Serialize};

use crate::domain::{PricePoint, PriceSeries};

use super::grading::{capture_ratio, Grade, GradeThresholds};
use super::policy::{StopPolicy, StopPolicyKind};
use super::ratchet::Ratchet;

/// Stop level recorded for one bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StopPoint {
    pub index: usize,
    pub stop_level: f64,
}

/// Outcome of one policy over one path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopPolicyResult {
    pub policy: StopPolicyKind,
    pub exited: bool,
    /// Bar on which the stop was hit (`None` while still active).
    pub exit_index: Option<usize>,
    /// Fill price, equal to the stop level on the exit bar.
    pub exit_price: Option<f64>,
    /// Exit price (or final price if still active) minus entry price.
    pub profit: f64,
    pub capture_ratio: f64,
    /// Letter grade, or `InProgress` if the stop never triggered.
    pub grade: Grade,
    /// Letter grade computed even while active (marked to the final price).
    pub letter_grade: Grade,
    pub bars_held: usize,
    /// Maximum favorable excursion while the trade was open.
    pub mfe: f64,
    /// Maximum adverse excursion while the trade was open.
    pub mae: f64,
    /// One entry per price point.
    pub history: Vec<StopPoint>,
}

impl StopPolicyResult {
    /// Stop level at a playback cursor, clamped to the last bar.
    pub fn stop_at(&self, step: usize) -> Option<f64> {
        let last = self.history.len().checked_sub(1)?;
        self.history.get(step.min(last)).map(|p| p.stop_level)
    }

    /// Whether the stop had been hit at or before `step`.
    pub fn exited_by(&self, step: usize) -> bool {
        self.exit_index.is_some_and(|i| i <= step)
    }
}

/// Trailing state for a single policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrailState {
    Active,
    Exited { index: usize, price: f64 },
}

/// Run `policy` over `path`.
pub fn trail(
    path: &[PricePoint],
    policy: &dyn StopPolicy,
    thresholds: &GradeThresholds,
) -> StopPolicyResult {
    let (Some(entry_price), Some(final_price), Some(max_price)) =
        (path.entry_price(), path.final_price(), path.max_price())
    else {
        return StopPolicyResult {
            policy: policy.kind(),
            exited: false,
            exit_index: None,
            exit_price: None,
            profit: 0.0,
            capture_ratio: 0.0,
            grade: Grade::InProgress,
            letter_grade: thresholds.letter(0.0, 0.0),
            bars_held: 0,
            mfe: 0.0,
            mae: 0.0,
            history: Vec::new(),
        };
    };

    let mut ratchet = Ratchet::new();
    let mut state = TrailState::Active;
    let mut levels: Vec<Option<f64>> = Vec::with_capacity(path.len());
    let mut bars_held = 0;
    let mut mfe = 0.0_f64;
    let mut mae = 0.0_f64;

    for (i, point) in path.iter().enumerate() {
        let stop_level = match state {
            TrailState::Exited { price, .. } => Some(price),
            TrailState::Active => {
                // None until the policy proposes a finite stop
                let stop = ratchet.apply(policy.potential_stop(point));
                bars_held = i;
                mfe = mfe.max(point.price - entry_price);
                mae = mae.max(entry_price - point.price);
                if let Some(level) = stop {
                    if i > 0 && point.price <= level {
                        state = TrailState::Exited {
                            index: point.index,
                            price: level,
                        };
                    }
                }
                stop
            }
        };
        levels.push(stop_level);
    }

    // Bars before the first usable stop show the first level that was set,
    // or the path low if none ever was.
    let placeholder = levels
        .iter()
        .flatten()
        .copied()
        .next()
        .or_else(|| path.min_price())
        .unwrap_or(entry_price);
    let history: Vec<StopPoint> = path
        .iter()
        .zip(&levels)
        .map(|(point, level)| StopPoint {
            index: point.index,
            stop_level: level.unwrap_or(placeholder),
        })
        .collect();

    let (exit_index, exit_price) = match state {
        TrailState::Exited { index, price } => (Some(index), Some(price)),
        TrailState::Active => (None, None),
    };
    let profit = exit_price.unwrap_or(final_price) - entry_price;
    let capture = capture_ratio(profit, entry_price, max_price);
    let letter_grade = thresholds.letter(profit, capture);
    let exited = exit_index.is_some();

    StopPolicyResult {
        policy: policy.kind(),
        exited,
        exit_index,
        exit_price,
        profit,
        capture_ratio: capture,
        grade: if exited {
            letter_grade
        } else {
            Grade::InProgress
        },
        letter_grade,
        bars_held,
        mfe,
        mae,
        history,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stops::policy::{FixedDistance, VolatilityScaled};

    fn path(prices: &[f64]) -> Vec<PricePoint> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &p)| PricePoint::new(i, p, 1.0, None))
            .collect()
    }

    fn fixed(distance: f64) -> FixedDistance {
        FixedDistance { distance }
    }

    #[test]
    fn exit_fills_at_stop_and_flatlines() {
        // Stop trails to 107 at bar 2, then bar 3 closes at 104.
        let result = trail(
            &path(&[100.0, 105.0, 110.0, 104.0, 120.0]),
            &fixed(3.0),
            &GradeThresholds::default(),
        );
        assert!(result.exited);
        assert_eq!(result.exit_index, Some(3));
        assert_eq!(result.exit_price, Some(107.0));
        assert!((result.profit - 7.0).abs() < 1e-12);
        let levels: Vec<f64> = result.history.iter().map(|p| p.stop_level).collect();
        assert_eq!(levels, vec![97.0, 102.0, 107.0, 107.0, 107.0]);
        // capture = 7 / 20 = 0.35 → C
        assert_eq!(result.grade, Grade::C);
        assert_eq!(result.bars_held, 3);
    }

    #[test]
    fn no_exit_on_entry_bar() {
        // Zero distance puts the stop at the entry price on bar 0.
        let result = trail(&path(&[100.0, 101.0]), &fixed(0.0), &GradeThresholds::default());
        assert_eq!(result.history[0].stop_level, 100.0);
        // Bar 1 ratchets to 101 and the close equals the stop.
        assert_eq!(result.exit_index, Some(1));
    }

    #[test]
    fn still_active_is_in_progress() {
        let result = trail(
            &path(&[100.0, 102.0, 104.0]),
            &fixed(5.0),
            &GradeThresholds::default(),
        );
        assert!(!result.exited);
        assert_eq!(result.exit_index, None);
        assert_eq!(result.grade, Grade::InProgress);
        assert_eq!(result.letter_grade, Grade::APlus);
        assert!((result.profit - 4.0).abs() < 1e-12);
    }

    #[test]
    fn losing_exit_grades_d() {
        let result = trail(
            &path(&[100.0, 99.0, 94.0]),
            &fixed(5.0),
            &GradeThresholds::default(),
        );
        assert_eq!(result.exit_price, Some(95.0));
        assert_eq!(result.grade, Grade::D);
        assert!((result.mae - 6.0).abs() < 1e-12);
    }

    #[test]
    fn flat_path_is_defined() {
        let result = trail(
            &path(&[100.0, 100.0, 100.0]),
            &fixed(1.0),
            &GradeThresholds::default(),
        );
        assert_eq!(result.capture_ratio, 0.0);
        assert!(result.profit.is_finite());
        assert_eq!(result.letter_grade, Grade::CMinus);
    }

    #[test]
    fn empty_path_is_defined() {
        let result = trail(&[], &fixed(1.0), &GradeThresholds::default());
        assert!(result.history.is_empty());
        assert_eq!(result.grade, Grade::InProgress);
        assert_eq!(result.stop_at(3), None);
    }

    #[test]
    fn stop_at_clamps_cursor() {
        let result = trail(
            &path(&[100.0, 105.0, 110.0]),
            &fixed(5.0),
            &GradeThresholds::default(),
        );
        assert_eq!(result.stop_at(1), Some(100.0));
        assert_eq!(result.stop_at(99), Some(105.0));
    }

    #[test]
    fn exited_by_cursor() {
        let result = trail(
            &path(&[100.0, 105.0, 110.0, 104.0, 120.0]),
            &fixed(3.0),
            &GradeThresholds::default(),
        );
        assert!(!result.exited_by(2));
        assert!(result.exited_by(3));
        assert!(result.exited_by(4));
    }

    #[test]
    fn mfe_tracks_best_price_while_open() {
        let result = trail(
            &path(&[100.0, 105.0, 110.0, 104.0, 120.0]),
            &fixed(3.0),
            &GradeThresholds::default(),
        );
        // 120 came after the exit and is not counted.
        assert!((result.mfe - 10.0).abs() < 1e-12);
    }

    #[test]
    fn non_finite_volatility_keeps_history_defined() {
        let mut points = path(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0, 106.0, 107.0, 108.0, 109.0]);
        points[0].volatility = f64::NAN;
        let policy = VolatilityScaled { multiplier: 2.0 };
        let result = trail(&points, &policy, &GradeThresholds::default());

        assert_eq!(result.history.len(), 10);
        assert!(result.history.iter().all(|p| p.stop_level.is_finite()));
        // Bar 1 sets the first stop at 101 - 2 and bar 0 shows it too.
        assert_eq!(result.stop_at(0), Some(99.0));
        assert_eq!(result.stop_at(1), Some(99.0));
        assert_eq!(result.stop_at(9), Some(107.0));
        assert!(!result.exited);
        assert!(result.profit.is_finite());
    }

    #[test]
    fn never_finite_stop_never_exits() {
        let mut points = path(&[100.0, 90.0, 80.0]);
        for p in &mut points {
            p.volatility = f64::INFINITY;
        }
        let policy = VolatilityScaled { multiplier: 2.0 };
        let result = trail(&points, &policy, &GradeThresholds::default());

        assert!(!result.exited);
        assert_eq!(result.grade, Grade::InProgress);
        assert!(result.history.iter().all(|p| p.stop_level == 80.0));
        assert_eq!(result.profit, -20.0);
    }
}
