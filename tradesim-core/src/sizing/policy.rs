//! Risk sizers — how much of the balance each policy puts at risk per trade.
//!
//! Sizers are balance-aware through the simulator but outcome-agnostic: they
//! only see the loss streak, never the upcoming outcome.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::ParseError;

use super::streak::LossStreak;

/// The three policies compared side by side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizingPolicyKind {
    Conservative,
    Aggressive,
    Emotional,
}

impl SizingPolicyKind {
    pub const ALL: [SizingPolicyKind; 3] = [
        SizingPolicyKind::Conservative,
        SizingPolicyKind::Aggressive,
        SizingPolicyKind::Emotional,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SizingPolicyKind::Conservative => "conservative",
            SizingPolicyKind::Aggressive => "aggressive",
            SizingPolicyKind::Emotional => "emotional",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SizingPolicyKind::Conservative => "Disciplined Trader",
            SizingPolicyKind::Aggressive => "Aggressive Trader",
            SizingPolicyKind::Emotional => "Revenge Trader",
        }
    }
}

impl fmt::Display for SizingPolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SizingPolicyKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "conservative" => Ok(SizingPolicyKind::Conservative),
            "aggressive" => Ok(SizingPolicyKind::Aggressive),
            "emotional" | "revenge" => Ok(SizingPolicyKind::Emotional),
            _ => Err(ParseError::UnknownSizingPolicy(s.to_string())),
        }
    }
}

/// Position sizing logic
///
/// # Responsibilities
/// - Convert the current loss streak into a fraction of balance to risk
/// - Report how "tilted" the trader is, for the stress metric
///
/// # Non-Responsibilities
/// - Sizers do NOT see the upcoming outcome
/// - Sizers do NOT track balance or ruin (the simulator does)
pub trait RiskSizer: Send + Sync {
    fn kind(&self) -> SizingPolicyKind;

    /// Fraction of the current balance risked on the next trade.
    fn risk_fraction(&self, streak: LossStreak) -> f64;

    /// Emotional pressure in `[0, 1]` from the streak alone.
    fn tilt(&self, _streak: LossStreak) -> f64 {
        0.0
    }
}

/// Constant fraction of balance, independent of history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedFractional {
    pub kind: SizingPolicyKind,
    pub fraction: f64,
}

impl RiskSizer for FixedFractional {
    fn kind(&self) -> SizingPolicyKind {
        self.kind
    }

    fn risk_fraction(&self, _streak: LossStreak) -> f64 {
        self.fraction
    }
}

/// Risk fractions per loss-streak bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevengeTiers {
    /// After a win, or after a single loss.
    pub base: f64,
    pub after_two: f64,
    pub after_three: f64,
    /// Four or more losses in a row.
    pub after_four: f64,
}

impl Default for RevengeTiers {
    fn default() -> Self {
        Self {
            base: 0.02,
            after_two: 0.05,
            after_three: 0.10,
            after_four: 0.20,
        }
    }
}

impl RevengeTiers {
    pub fn fraction(&self, streak: LossStreak) -> f64 {
        match streak {
            LossStreak::Calm | LossStreak::OneLoss => self.base,
            LossStreak::TwoLosses => self.after_two,
            LossStreak::ThreeLosses => self.after_three,
            LossStreak::Tilted => self.after_four,
        }
    }
}

/// Revenge sizing: size up after consecutive losses, reset on a win.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevengeSizer {
    pub tiers: RevengeTiers,
}

impl RiskSizer for RevengeSizer {
    fn kind(&self) -> SizingPolicyKind {
        SizingPolicyKind::Emotional
    }

    fn risk_fraction(&self, streak: LossStreak) -> f64 {
        self.tiers.fraction(streak)
    }

    fn tilt(&self, streak: LossStreak) -> f64 {
        (streak.consecutive_losses() as f64 / 4.0).min(1.0)
    }
}
