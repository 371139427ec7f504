//! Trade outcomes and the shared outcome sequence.

use std::ops::Deref;

use serde::{Deserialize, Serialize};

/// Binary result of one trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Win,
    Loss,
}

impl Outcome {
    pub fn is_win(self) -> bool {
        matches!(self, Outcome::Win)
    }
}

/// Sequence of market outcomes shared by every sizing policy in a comparison.
///
/// There is no mutable access: once generated, the same instance is handed by
/// reference to each policy so they all face identical market results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeSequence {
    outcomes: Vec<Outcome>,
}

impl OutcomeSequence {
    pub fn new(outcomes: Vec<Outcome>) -> Self {
        Self { outcomes }
    }

    pub fn as_slice(&self) -> &[Outcome] {
        &self.outcomes
    }

    pub fn win_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_win()).count()
    }

    pub fn loss_count(&self) -> usize {
        self.outcomes.len() - self.win_count()
    }

    /// Realised fraction of wins (0.0 for an empty sequence).
    pub fn win_rate(&self) -> f64 {
        if self.outcomes.is_empty() {
            return 0.0;
        }
        self.win_count() as f64 / self.outcomes.len() as f64
    }

    /// Longest run of consecutive losses.
    pub fn longest_losing_streak(&self) -> usize {
        let mut longest = 0;
        let mut current = 0;
        for outcome in &self.outcomes {
            if outcome.is_win() {
                current = 0;
            } else {
                current += 1;
                longest = longest.max(current);
            }
        }
        longest
    }
}

impl Deref for OutcomeSequence {
    type Target = [Outcome];

    fn deref(&self) -> &[Outcome] {
        &self.outcomes
    }
}

impl FromIterator<Outcome> for OutcomeSequence {
    fn from_iter<I: IntoIterator<Item = Outcome>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
