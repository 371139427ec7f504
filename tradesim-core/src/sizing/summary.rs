//! Path summaries — scalar statistics read off a finished `TraderPath`.

use serde::{Deserialize, Serialize};

use super::policy::SizingPolicyKind;
use super::simulator::TraderPath;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSummary {
    pub policy: SizingPolicyKind,
    pub initial_balance: f64,
    pub final_balance: f64,
    pub peak_balance: f64,
    pub max_drawdown_pct: f64,
    pub total_return_pct: f64,
    pub wins: usize,
    pub losses: usize,
    pub ruined_at: Option<usize>,
}

impl PathSummary {
    pub fn from_path(path: &TraderPath) -> Self {
        let initial_balance = path.balance_series.first().copied().unwrap_or(0.0);
        let final_balance = path.final_balance();
        let peak_balance = path.balance_series.iter().copied().fold(0.0, f64::max);
        let total_return_pct = if initial_balance > 0.0 {
            (final_balance - initial_balance) / initial_balance * 100.0
        } else {
            0.0
        };
        let wins = path
            .outcome_series
            .iter()
            .filter(|o| o.is_some_and(|o| o.is_win()))
            .count();
        let losses = path
            .outcome_series
            .iter()
            .filter(|o| o.is_some_and(|o| !o.is_win()))
            .count();

        Self {
            policy: path.policy,
            initial_balance,
            final_balance,
            peak_balance,
            max_drawdown_pct: max_drawdown_pct(&path.balance_series),
            total_return_pct,
            wins,
            losses,
            ruined_at: path.ruined_at,
        }
    }

    pub fn trades_taken(&self) -> usize {
        self.wins + self.losses
    }
}

/// Largest peak-to-trough decline of a balance curve, in percent (>= 0).
pub fn max_drawdown_pct(balances: &[f64]) -> f64 {
    let Some(&first) = balances.first() else {
        return 0.0;
    };
    let mut peak = first;
    let mut max_dd = 0.0_f64;

    for &b in balances {
        if b > peak {
            peak = b;
        }
        if peak > 0.0 {
            max_dd = max_dd.max((peak - b) / peak * 100.0);
        }
    }
    max_dd
}
