//! Position-sizing simulator — three risk policies trading the same outcome sequence.
//!
//! ## Policies
//!
//! - conservative — [`FixedFractional`], small constant fraction
//! - aggressive — [`FixedFractional`], large constant fraction
//! - emotional — [`RevengeSizer`], sizes up after consecutive losses
//!
//! Every policy is handed the same `&OutcomeSequence`, so any divergence in
//! the resulting equity paths comes from sizing alone.

pub mod policy;
pub mod simulator;
pub mod streak;
pub mod stress;
pub mod summary;

pub use policy::{FixedFractional, RevengeSizer, RevengeTiers, RiskSizer, SizingPolicyKind};
pub use simulator::{simulate_trader, PathFrame, SizingConfig, TraderPath};
pub use streak::LossStreak;
pub use stress::StressWeights;
pub use summary::{max_drawdown_pct, PathSummary};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::OutcomeSequence;

/// Concrete sizers for one configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizingPolicies {
    pub conservative: FixedFractional,
    pub aggressive: FixedFractional,
    pub emotional: RevengeSizer,
}

impl SizingPolicies {
    pub fn from_config(config: &SizingConfig) -> Self {
        Self {
            conservative: FixedFractional {
                kind: SizingPolicyKind::Conservative,
                fraction: config.conservative_fraction,
            },
            aggressive: FixedFractional {
                kind: SizingPolicyKind::Aggressive,
                fraction: config.aggressive_fraction,
            },
            emotional: RevengeSizer {
                tiers: config.revenge,
            },
        }
    }

    pub fn get(&self, kind: SizingPolicyKind) -> &dyn RiskSizer {
        match kind {
            SizingPolicyKind::Conservative => &self.conservative,
            SizingPolicyKind::Aggressive => &self.aggressive,
            SizingPolicyKind::Emotional => &self.emotional,
        }
    }
}

/// Equity paths for all three policies over one outcome sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizingComparison {
    pub conservative: TraderPath,
    pub aggressive: TraderPath,
    pub emotional: TraderPath,
}

impl SizingComparison {
    pub fn get(&self, kind: SizingPolicyKind) -> &TraderPath {
        match kind {
            SizingPolicyKind::Conservative => &self.conservative,
            SizingPolicyKind::Aggressive => &self.aggressive,
            SizingPolicyKind::Emotional => &self.emotional,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &TraderPath> {
        [&self.conservative, &self.aggressive, &self.emotional].into_iter()
    }

    pub fn summaries(&self) -> Vec<PathSummary> {
        self.iter().map(PathSummary::from_path).collect()
    }
}

/// Run all three sizing policies over the same `outcomes`.
pub fn run_position_sizing_comparison(
    outcomes: &OutcomeSequence,
    config: &SizingConfig,
) -> SizingComparison {
    let config = config.sanitized();
    let policies = config.policies();
    let comparison = SizingComparison {
        conservative: simulator::simulate_sanitized(outcomes, &policies.conservative, &config),
        aggressive: simulator::simulate_sanitized(outcomes, &policies.aggressive, &config),
        emotional: simulator::simulate_sanitized(outcomes, &policies.emotional, &config),
    };
    for path in comparison.iter() {
        debug!(
            policy = %path.policy,
            final_balance = path.final_balance(),
            ruined_at = ?path.ruined_at,
            "sizing path"
        );
    }
    comparison
}
