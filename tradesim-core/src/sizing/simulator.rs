//! Equity path simulation for one sizing policy over a shared outcome sequence.
//!
//! Per step for a trader that is still alive:
//! 1. `risk = balance * risk_fraction(streak)`
//! 2. `pnl = +risk * reward_ratio` on a win, `-risk` on a loss
//! 3. `balance = max(0, balance + pnl)`; at or below the ruin threshold the
//!    balance is set to exactly 0 and the trader is ruined
//! 4. peak, drawdown, alive and stress are appended
//!
//! Ruin is absorbing: a ruined trader repeats its last balance and drawdown and
//! never consumes another outcome.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{Outcome, OutcomeSequence};

use super::policy::{RiskSizer, SizingPolicyKind};
use super::streak::LossStreak;
use super::stress::StressWeights;
use super::{RevengeTiers, SizingPolicies};

/// Inputs shared by every policy in a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizingConfig {
    pub initial_balance: f64,
    /// Payout multiple of the amount risked on a winning trade.
    pub reward_ratio: f64,
    /// Balance at or below which the trader is ruined.
    pub ruin_threshold: f64,
    pub conservative_fraction: f64,
    pub aggressive_fraction: f64,
    pub revenge: RevengeTiers,
    pub stress: StressWeights,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            initial_balance: 10_000.0,
            reward_ratio: 2.0,
            ruin_threshold: 100.0,
            conservative_fraction: 0.02,
            aggressive_fraction: 0.05,
            revenge: RevengeTiers::default(),
            stress: StressWeights::default(),
        }
    }
}

impl SizingConfig {
    /// Clamp every field into its valid range, logging each change.
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();

        let initial_balance = if self.initial_balance.is_finite() && self.initial_balance > 0.0 {
            self.initial_balance
        } else {
            warn!(
                value = self.initial_balance,
                replacement = defaults.initial_balance,
                "initial_balance must be positive"
            );
            defaults.initial_balance
        };

        let reward_ratio = if self.reward_ratio.is_finite() && self.reward_ratio >= 0.0 {
            self.reward_ratio
        } else {
            warn!(value = self.reward_ratio, "reward_ratio must be non-negative, using 0");
            0.0
        };

        let ruin_threshold = if self.ruin_threshold.is_nan() || self.ruin_threshold < 0.0 {
            warn!(value = self.ruin_threshold, "ruin_threshold must be non-negative, using 0");
            0.0
        } else if self.ruin_threshold >= initial_balance {
            // Any drop below the starting balance is ruin.
            let clamped = initial_balance * (1.0 - f64::EPSILON);
            warn!(
                value = self.ruin_threshold,
                initial_balance,
                clamped,
                "ruin_threshold must sit below initial_balance, clamping"
            );
            clamped
        } else {
            self.ruin_threshold
        };

        Self {
            initial_balance,
            reward_ratio,
            ruin_threshold,
            conservative_fraction: unit_fraction("conservative_fraction", self.conservative_fraction),
            aggressive_fraction: unit_fraction("aggressive_fraction", self.aggressive_fraction),
            revenge: RevengeTiers {
                base: unit_fraction("revenge.base", self.revenge.base),
                after_two: unit_fraction("revenge.after_two", self.revenge.after_two),
                after_three: unit_fraction("revenge.after_three", self.revenge.after_three),
                after_four: unit_fraction("revenge.after_four", self.revenge.after_four),
            },
            stress: StressWeights {
                drawdown_ceiling: non_negative("stress.drawdown_ceiling", self.stress.drawdown_ceiling),
                tilt_weight: non_negative("stress.tilt_weight", self.stress.tilt_weight),
            },
        }
    }

    pub fn policies(&self) -> SizingPolicies {
        SizingPolicies::from_config(self)
    }
}

fn unit_fraction(field: &str, value: f64) -> f64 {
    if (0.0..=1.0).contains(&value) {
        return value;
    }
    let clamped = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
    warn!(field, value, clamped, "risk fraction outside [0, 1], clamping");
    clamped
}

fn non_negative(field: &str, value: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        return value;
    }
    warn!(field, value, "invalid stress weight, using 0");
    0.0
}

/// One trader's equity path. Every series has `outcomes + 1` entries; index 0
/// is the state before the first trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraderPath {
    pub policy: SizingPolicyKind,
    pub balance_series: Vec<f64>,
    /// Percent below the running peak, always >= 0.
    pub drawdown_series: Vec<f64>,
    pub alive_series: Vec<bool>,
    /// In `[0, 1]`.
    pub stress_series: Vec<f64>,
    /// Fraction of balance risked on each step (0 at index 0 and after ruin).
    pub risk_series: Vec<f64>,
    /// Outcome consumed on each step (`None` at index 0 and after ruin).
    pub outcome_series: Vec<Option<Outcome>>,
    /// Step at which the trader was ruined.
    pub ruined_at: Option<usize>,
}

/// Snapshot of a trader at a playback cursor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathFrame {
    pub step: usize,
    pub balance: f64,
    pub drawdown: f64,
    pub alive: bool,
    pub stress: f64,
}

impl TraderPath {
    /// Number of entries in each series.
    pub fn len(&self) -> usize {
        self.balance_series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balance_series.is_empty()
    }

    pub fn final_balance(&self) -> f64 {
        self.balance_series.last().copied().unwrap_or(0.0)
    }

    pub fn survived(&self) -> bool {
        self.ruined_at.is_none()
    }

    pub fn max_drawdown(&self) -> f64 {
        self.drawdown_series.iter().copied().fold(0.0, f64::max)
    }

    /// State at `step`, clamped to the last entry.
    pub fn frame(&self, step: usize) -> Option<PathFrame> {
        let last = self.len().checked_sub(1)?;
        let step = step.min(last);
        Some(PathFrame {
            step,
            balance: self.balance_series[step],
            drawdown: self.drawdown_series[step],
            alive: self.alive_series[step],
            stress: self.stress_series[step],
        })
    }
}

/// Simulate one sizer over `outcomes`. The config is sanitized first.
pub fn simulate_trader(
    outcomes: &OutcomeSequence,
    sizer: &dyn RiskSizer,
    config: &SizingConfig,
) -> TraderPath {
    simulate_sanitized(outcomes, sizer, &config.sanitized())
}

pub(crate) fn simulate_sanitized(
    outcomes: &OutcomeSequence,
    sizer: &dyn RiskSizer,
    config: &SizingConfig,
) -> TraderPath {
    let len = outcomes.len() + 1;
    let mut path = TraderPath {
        policy: sizer.kind(),
        balance_series: Vec::with_capacity(len),
        drawdown_series: Vec::with_capacity(len),
        alive_series: Vec::with_capacity(len),
        stress_series: Vec::with_capacity(len),
        risk_series: Vec::with_capacity(len),
        outcome_series: Vec::with_capacity(len),
        ruined_at: None,
    };

    let mut balance = config.initial_balance;
    let mut peak = balance;
    let mut drawdown = 0.0;
    let mut streak = LossStreak::Calm;

    path.balance_series.push(balance);
    path.drawdown_series.push(drawdown);
    path.alive_series.push(balance > config.ruin_threshold);
    path.stress_series.push(0.0);
    path.risk_series.push(0.0);
    path.outcome_series.push(None);

    for (i, &outcome) in outcomes.iter().enumerate() {
        let step = i + 1;

        if path.ruined_at.is_some() {
            path.balance_series.push(balance);
            path.drawdown_series.push(drawdown);
            path.alive_series.push(false);
            path.stress_series.push(1.0);
            path.risk_series.push(0.0);
            path.outcome_series.push(None);
            continue;
        }

        let fraction = sizer.risk_fraction(streak);
        let risk = balance * fraction;
        let pnl = match outcome {
            Outcome::Win => risk * config.reward_ratio,
            Outcome::Loss => -risk,
        };
        balance = (balance + pnl).max(0.0);
        streak = streak.next(outcome);

        let alive = balance > config.ruin_threshold;
        if !alive {
            balance = 0.0;
            path.ruined_at = Some(step);
        }

        peak = peak.max(balance);
        drawdown = if peak > 0.0 {
            (peak - balance) / peak * 100.0
        } else {
            0.0
        };
        let stress = if alive {
            config.stress.stress(drawdown, sizer.tilt(streak))
        } else {
            1.0
        };

        path.balance_series.push(balance);
        path.drawdown_series.push(drawdown);
        path.alive_series.push(alive);
        path.stress_series.push(stress);
        path.risk_series.push(fraction);
        path.outcome_series.push(Some(outcome));
    }

    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sizing::FixedFractional;
    use Outcome::{Loss, Win};

    fn conservative(fraction: f64) -> FixedFractional {
        FixedFractional {
            kind: SizingPolicyKind::Conservative,
            fraction,
        }
    }

    #[test]
    fn series_lengths_include_initial_state() {
        let outcomes = OutcomeSequence::new(vec![Win, Loss, Win]);
        let path = simulate_trader(&outcomes, &conservative(0.02), &SizingConfig::default());
        assert_eq!(path.len(), 4);
        assert_eq!(path.drawdown_series.len(), 4);
        assert_eq!(path.alive_series.len(), 4);
        assert_eq!(path.stress_series.len(), 4);
        assert_eq!(path.balance_series[0], 10_000.0);
        assert_eq!(path.outcome_series[0], None);
    }

    #[test]
    fn win_pays_reward_ratio() {
        let outcomes = OutcomeSequence::new(vec![Win]);
        let path = simulate_trader(&outcomes, &conservative(0.02), &SizingConfig::default());
        // risk 200, reward 2 → +400
        assert!((path.balance_series[1] - 10_400.0).abs() < 1e-9);
        assert_eq!(path.drawdown_series[1], 0.0);
    }

    #[test]
    fn loss_creates_drawdown() {
        let outcomes = OutcomeSequence::new(vec![Win, Loss]);
        let path = simulate_trader(&outcomes, &conservative(0.02), &SizingConfig::default());
        // 10_400 → 10_192, 2% below the peak
        assert!((path.drawdown_series[2] - 2.0).abs() < 1e-9);
    }

    #[test]
    fn ruin_clamps_to_zero_and_absorbs() {
        let config = SizingConfig {
            ruin_threshold: 5_000.0,
            ..SizingConfig::default()
        };
        let outcomes = OutcomeSequence::new(vec![Loss, Win, Win, Win]);
        let path = simulate_trader(&outcomes, &conservative(0.6), &config);
        assert_eq!(path.ruined_at, Some(1));
        assert_eq!(&path.balance_series[1..], &[0.0, 0.0, 0.0, 0.0]);
        assert_eq!(&path.alive_series[..], &[true, false, false, false, false]);
        assert!(path.drawdown_series[1..].iter().all(|&d| d == 100.0));
        assert!(path.stress_series[1..].iter().all(|&s| s == 1.0));
        assert!(path.outcome_series[2..].iter().all(Option::is_none));
        assert!(!path.survived());
    }

    #[test]
    fn frame_clamps_cursor() {
        let outcomes = OutcomeSequence::new(vec![Win, Loss]);
        let path = simulate_trader(&outcomes, &conservative(0.02), &SizingConfig::default());
        let frame = path.frame(10).unwrap();
        assert_eq!(frame.step, 2);
        assert_eq!(frame.balance, path.final_balance());
    }

    #[test]
    fn sanitize_rejects_bad_balance_and_threshold() {
        let config = SizingConfig {
            initial_balance: -1.0,
            reward_ratio: f64::NAN,
            ruin_threshold: 50_000.0,
            conservative_fraction: 1.5,
            ..SizingConfig::default()
        }
        .sanitized();
        assert_eq!(config.initial_balance, 10_000.0);
        assert_eq!(config.reward_ratio, 0.0);
        assert!(config.ruin_threshold < 10_000.0);
        assert!(config.ruin_threshold > 9_999.99);
        assert_eq!(config.conservative_fraction, 1.0);
    }

    #[test]
    fn sanitize_zeroes_negative_threshold() {
        let config = SizingConfig {
            ruin_threshold: -5.0,
            ..SizingConfig::default()
        }
        .sanitized();
        assert_eq!(config.ruin_threshold, 0.0);
    }

    #[test]
    fn account_below_default_floor_is_ruined_by_first_loss() {
        // A 50-unit account under the default floor of 100.
        let config = SizingConfig {
            initial_balance: 50.0,
            ..SizingConfig::default()
        };
        let outcomes = OutcomeSequence::new(vec![Loss, Loss, Loss]);
        let path = simulate_trader(&outcomes, &conservative(0.02), &config);
        assert_eq!(path.alive_series, vec![true, false, false, false]);
        assert_eq!(path.ruined_at, Some(1));
        assert_eq!(path.balance_series, vec![50.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn account_below_default_floor_survives_wins() {
        let config = SizingConfig {
            initial_balance: 50.0,
            ..SizingConfig::default()
        };
        let outcomes = OutcomeSequence::new(vec![Win, Win]);
        let path = simulate_trader(&outcomes, &conservative(0.02), &config);
        assert!(path.survived());
        assert!(path.alive_series.iter().all(|&alive| alive));
        assert!(path.final_balance() > 50.0);
    }

    #[test]
    fn sanitize_keeps_defaults() {
        assert_eq!(SizingConfig::default().sanitized(), SizingConfig::default());
    }
}
