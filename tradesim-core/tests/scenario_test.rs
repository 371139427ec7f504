//! Concrete lesson scenarios.
//!
//! Tests:
//! 1. Outcome generator win counts stay near the requested win rate.
//! 2. Revenge sizing accelerates losses during a losing streak while fixed
//!    fractional sizing decays at a constant rate.
//! 3. A fixed stop on a steadily rising path never triggers and captures the
//!    whole move.
//! 4. Each market archetype teaches its intended stop lesson.

use tradesim_core::domain::{Outcome, OutcomeSequence, PricePoint};
use tradesim_core::outcomes::generate_outcome_sequence;
use tradesim_core::scenario::{generate_scenario, Scenario};
use tradesim_core::sizing::{run_position_sizing_comparison, SizingConfig};
use tradesim_core::stops::{run_trailing_stop_comparison, Grade, StopPolicyKind, TrailingParams};

// ──────────────────────────────────────────────
// Helpers
// ──────────────────────────────────────────────

fn rising_path() -> Vec<PricePoint> {
    (0..100)
        .map(|i| PricePoint::new(i, 100.0 + i as f64, 1.0, None))
        .collect()
}

fn losing_streak(n: usize) -> OutcomeSequence {
    OutcomeSequence::new(vec![Outcome::Loss; n])
}

/// Percentage lost on each step (index 0 is the first trade).
fn step_loss_pcts(balances: &[f64]) -> Vec<f64> {
    balances
        .windows(2)
        .map(|w| (w[0] - w[1]) / w[0] * 100.0)
        .collect()
}

// ──────────────────────────────────────────────
// Outcome generator
// ──────────────────────────────────────────────

#[test]
fn win_counts_stay_near_win_rate() {
    let runs = 1_000;
    let counts: Vec<usize> = (0..runs)
        .map(|seed| generate_outcome_sequence(0.55, 100, seed).win_count())
        .collect();

    assert!(counts.iter().all(|&c| c <= 100));
    let within = counts.iter().filter(|&&c| (40..=70).contains(&c)).count();
    assert!(
        within >= runs as usize * 99 / 100,
        "only {within}/{runs} runs had 40..=70 wins"
    );

    let mean = counts.iter().sum::<usize>() as f64 / runs as f64;
    assert!((mean - 55.0).abs() < 1.5, "mean win count {mean}");
}

#[test]
fn outcome_sequence_length_is_exact() {
    for trades in [1, 10, 100, 500] {
        assert_eq!(generate_outcome_sequence(0.55, trades, 9).len(), trades);
    }
}

// ──────────────────────────────────────────────
// Sizing under a losing streak
// ──────────────────────────────────────────────

#[test]
fn revenge_sizing_accelerates_losses() {
    let outcomes = losing_streak(10);
    let config = SizingConfig {
        initial_balance: 10_000.0,
        reward_ratio: 2.0,
        ..SizingConfig::default()
    };
    let comparison = run_position_sizing_comparison(&outcomes, &config);
    let emotional = &comparison.emotional;

    assert!(emotional
        .balance_series
        .windows(2)
        .all(|w| w[1] < w[0]));

    let pcts = step_loss_pcts(&emotional.balance_series);
    let expected = [2.0, 2.0, 5.0, 10.0, 20.0, 20.0, 20.0, 20.0, 20.0, 20.0];
    for (got, want) in pcts.iter().zip(expected) {
        assert!((got - want).abs() < 1e-9, "loss {got}% != {want}%");
    }
    // Accelerating after the second consecutive loss.
    assert!(pcts[2] > pcts[1]);
    assert!(pcts[3] > pcts[2]);
    assert!(pcts[4] > pcts[3]);

    assert_eq!(&emotional.risk_series[1..6], &[0.02, 0.02, 0.05, 0.10, 0.20]);
    assert!(emotional.survived());
}

#[test]
fn conservative_sizing_decays_two_percent_per_loss() {
    let outcomes = losing_streak(10);
    let comparison = run_position_sizing_comparison(&outcomes, &SizingConfig::default());
    let balances = &comparison.conservative.balance_series;

    assert_eq!(balances[0], 10_000.0);
    for w in balances.windows(2) {
        assert!((w[1] - w[0] * 0.98).abs() < 1e-9);
    }
}

#[test]
fn revenge_trader_is_more_stressed_after_a_streak() {
    let outcomes = losing_streak(5);
    let comparison = run_position_sizing_comparison(&outcomes, &SizingConfig::default());
    let last = outcomes.len();
    assert!(comparison.emotional.stress_series[last] > comparison.conservative.stress_series[last]);
    assert!(comparison.emotional.drawdown_series[last] > comparison.conservative.drawdown_series[last]);
}

#[test]
fn win_resets_revenge_sizing() {
    use Outcome::{Loss, Win};
    let outcomes = OutcomeSequence::new(vec![Loss, Loss, Loss, Win, Loss]);
    let comparison = run_position_sizing_comparison(&outcomes, &SizingConfig::default());
    // Trade 4 is sized after three losses; trade 5 after a win.
    assert_eq!(comparison.emotional.risk_series[4], 0.10);
    assert_eq!(comparison.emotional.risk_series[5], 0.02);
}

// ──────────────────────────────────────────────
// Stops on a steadily rising path
// ──────────────────────────────────────────────

#[test]
fn fixed_stop_never_exits_on_rising_path() {
    let path = rising_path();
    let params = TrailingParams {
        fixed_distance: 5.0,
        ..TrailingParams::default()
    };
    let comparison = run_trailing_stop_comparison(&path, &params);
    let fixed = &comparison.fixed;

    assert!(!fixed.exited);
    assert_eq!(fixed.exit_index, None);
    assert_eq!(fixed.grade, Grade::InProgress);
    assert_eq!(fixed.letter_grade, Grade::APlus);
    assert!(fixed.capture_ratio > 0.99);
    assert_eq!(fixed.history.last().map(|p| p.stop_level), Some(194.0));
}

// ──────────────────────────────────────────────
// Scenario lessons
// ──────────────────────────────────────────────

#[test]
fn strong_trend_rewards_patience() {
    let path = generate_scenario(Scenario::StrongTrend, 100);
    let comparison = run_trailing_stop_comparison(&path, &TrailingParams::default());
    for result in comparison.iter() {
        assert_eq!(result.grade, Grade::InProgress, "{} exited", result.policy);
        assert_eq!(result.letter_grade, Grade::APlus);
    }
}

#[test]
fn choppy_rally_shakes_out_the_fixed_stop_first() {
    let path = generate_scenario(Scenario::ChoppyRally, 100);
    let comparison = run_trailing_stop_comparison(&path, &TrailingParams::default());
    let fixed_exit = comparison.fixed.exit_index.expect("fixed stop should be shaken out");
    let vol_exit = comparison
        .volatility
        .exit_index
        .unwrap_or(path.len());
    assert!(fixed_exit < vol_exit);
    assert!(comparison.volatility.profit > comparison.fixed.profit);
}

#[test]
fn parabolic_collapse_stops_everyone_out_in_profit() {
    let path = generate_scenario(Scenario::Parabolic, 100);
    let comparison = run_trailing_stop_comparison(&path, &TrailingParams::default());
    for result in comparison.iter() {
        assert!(result.exited, "{} never exited", result.policy);
        assert!(result.profit > 0.0);
    }
    // The laggy swing low gives back the most.
    let worst = comparison.ranked().last().map(|r| r.policy);
    assert_eq!(worst, Some(StopPolicyKind::Structural));
}

#[test]
fn reversal_stops_out_at_a_loss() {
    let path = generate_scenario(Scenario::Reversal, 100);
    let comparison = run_trailing_stop_comparison(&path, &TrailingParams::default());
    for result in comparison.iter() {
        assert!(result.exited);
        assert_eq!(result.grade, Grade::D);
        assert!(result.exit_index.unwrap_or(usize::MAX) < 50);
    }
}
