/// Consecutive-loss state machine driving revenge sizing.
///
/// States are loss-count buckets; a win always returns to `Calm`, a loss moves
/// one bucket up and `Tilted` (4+) absorbs further losses.
use serde::{Deserialize, Serialize};

use crate::domain::Outcome;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossStreak {
    #[default]
    Calm,
    OneLoss,
    TwoLosses,
    ThreeLosses,
    /// Four or more losses in a row.
    Tilted,
}

impl LossStreak {
    pub fn next(self, outcome: Outcome) -> Self {
        match outcome {
            Outcome::Win => LossStreak::Calm,
            Outcome::Loss => match self {
                LossStreak::Calm => LossStreak::OneLoss,
                LossStreak::OneLoss => LossStreak::TwoLosses,
                LossStreak::TwoLosses => LossStreak::ThreeLosses,
                LossStreak::ThreeLosses | LossStreak::Tilted => LossStreak::Tilted,
            },
        }
    }

    /// Losses in a row, saturating at 4.
    pub fn consecutive_losses(self) -> usize {
        match self {
            LossStreak::Calm => 0,
            LossStreak::OneLoss => 1,
            LossStreak::TwoLosses => 2,
            LossStreak::ThreeLosses => 3,
            LossStreak::Tilted => 4,
        }
    }
}
