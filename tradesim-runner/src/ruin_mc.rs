//! Monte-Carlo ruin study — how often each sizing policy blows up.
//!
//! Draws `paths` independent outcome sequences, runs all three sizing
//! policies over each, and aggregates final balances, drawdowns and ruin
//! frequency per policy. Paths are evaluated in parallel; each path's seed
//! comes from `SeedHierarchy::sub_seed("ruin", i)`, so results do not depend
//! on thread scheduling.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use tradesim_core::outcomes::{generate_outcome_sequence_with, sanitize_total_trades, sanitize_win_rate};
use tradesim_core::rng::SeedHierarchy;
use tradesim_core::sizing::{run_position_sizing_comparison, PathSummary, SizingConfig, SizingPolicyKind};

// ─── Configuration ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuinStudyConfig {
    /// Number of simulated outcome sequences.
    pub paths: usize,
    pub win_rate: f64,
    pub total_trades: usize,
    pub sizing: SizingConfig,
    /// Master seed for the per-path seed hierarchy.
    pub seed: u64,
}

impl Default for RuinStudyConfig {
    fn default() -> Self {
        Self {
            paths: 1_000,
            win_rate: 0.45,
            total_trades: 100,
            sizing: SizingConfig::default(),
            seed: 42,
        }
    }
}

// ─── Result types ────────────────────────────────────────────────────

/// Distribution of outcomes for one policy across all paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyRuinStats {
    pub policy: SizingPolicyKind,
    /// Share of paths on which the policy was ruined, in `[0, 1]`.
    pub ruin_probability: f64,
    pub median_final_balance: f64,
    /// 5th percentile (pessimistic) final balance.
    pub p05_final_balance: f64,
    pub p95_final_balance: f64,
    pub mean_max_drawdown_pct: f64,
    pub worst_max_drawdown_pct: f64,
    /// Mean step of ruin over the ruined paths only.
    pub mean_ruin_step: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuinStudyResult {
    pub config: RuinStudyConfig,
    /// Conservative, aggressive, emotional.
    pub stats: Vec<PolicyRuinStats>,
}

impl RuinStudyResult {
    pub fn get(&self, kind: SizingPolicyKind) -> Option<&PolicyRuinStats> {
        self.stats.iter().find(|s| s.policy == kind)
    }
}

#[derive(Debug, Error)]
pub enum McError {
    #[error("ruin study needs at least one path")]
    NoPaths,
}

// ─── MC execution ────────────────────────────────────────────────────

pub fn run_ruin_study(config: &RuinStudyConfig) -> Result<RuinStudyResult, McError> {
    if config.paths == 0 {
        return Err(McError::NoPaths);
    }

    // Sanitize once so the per-path calls don't repeat the warnings.
    let win_rate = sanitize_win_rate(config.win_rate);
    let total_trades = sanitize_total_trades(config.total_trades);
    let sizing = config.sizing.sanitized();
    let seeds = SeedHierarchy::new(config.seed);

    info!(
        paths = config.paths,
        win_rate,
        total_trades,
        seed = config.seed,
        "starting ruin study"
    );

    let per_path: Vec<Vec<PathSummary>> = (0..config.paths)
        .into_par_iter()
        .map(|i| {
            let mut rng = seeds.rng_for("ruin", i as u64);
            let outcomes = generate_outcome_sequence_with(win_rate, total_trades, &mut rng);
            run_position_sizing_comparison(&outcomes, &sizing).summaries()
        })
        .collect();

    let stats = SizingPolicyKind::ALL
        .iter()
        .map(|&kind| {
            let summaries: Vec<&PathSummary> = per_path
                .iter()
                .flat_map(|row| row.iter().filter(move |s| s.policy == kind))
                .collect();
            aggregate(kind, &summaries)
        })
        .collect::<Vec<_>>();

    for s in &stats {
        debug!(
            policy = %s.policy,
            ruin_probability = s.ruin_probability,
            median_final_balance = s.median_final_balance,
            "ruin study policy"
        );
    }

    Ok(RuinStudyResult {
        config: RuinStudyConfig {
            win_rate,
            total_trades,
            sizing,
            ..config.clone()
        },
        stats,
    })
}

fn aggregate(policy: SizingPolicyKind, summaries: &[&PathSummary]) -> PolicyRuinStats {
    let n = summaries.len().max(1) as f64;

    let mut finals: Vec<f64> = summaries.iter().map(|s| s.final_balance).collect();
    finals.sort_by(|a, b| a.total_cmp(b));

    let drawdowns: Vec<f64> = summaries.iter().map(|s| s.max_drawdown_pct).collect();
    let ruin_steps: Vec<usize> = summaries.iter().filter_map(|s| s.ruined_at).collect();

    PolicyRuinStats {
        policy,
        ruin_probability: ruin_steps.len() as f64 / n,
        median_final_balance: percentile(&finals, 0.5),
        p05_final_balance: percentile(&finals, 0.05),
        p95_final_balance: percentile(&finals, 0.95),
        mean_max_drawdown_pct: drawdowns.iter().sum::<f64>() / n,
        worst_max_drawdown_pct: drawdowns.iter().copied().fold(0.0, f64::max),
        mean_ruin_step: if ruin_steps.is_empty() {
            None
        } else {
            Some(ruin_steps.iter().sum::<usize>() as f64 / ruin_steps.len() as f64)
        },
    }
}

/// Nearest-rank percentile of an ascending slice; 0 for an empty slice.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = ((sorted.len() - 1) as f64 * q).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}
