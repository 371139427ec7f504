//! Outcome sequence generator — Bernoulli win/loss draws shared across sizing policies.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::warn;

use crate::domain::{Outcome, OutcomeSequence};

/// Generate `total_trades` outcomes with a fixed seed.
///
/// `win_rate` is clamped into `[0, 1]` and `total_trades` is raised to 1 when
/// zero; both corrections are logged.
pub fn generate_outcome_sequence(win_rate: f64, total_trades: usize, seed: u64) -> OutcomeSequence {
    let mut rng = StdRng::seed_from_u64(seed);
    generate_outcome_sequence_with(win_rate, total_trades, &mut rng)
}

/// Generate `total_trades` outcomes from any RNG.
pub fn generate_outcome_sequence_with<R: Rng + ?Sized>(
    win_rate: f64,
    total_trades: usize,
    rng: &mut R,
) -> OutcomeSequence {
    let win_rate = sanitize_win_rate(win_rate);
    let total_trades = sanitize_total_trades(total_trades);
    (0..total_trades)
        .map(|_| {
            if rng.gen_bool(win_rate) {
                Outcome::Win
            } else {
                Outcome::Loss
            }
        })
        .collect()
}

/// Clamp a win rate into `[0, 1]`; NaN becomes 0.5.
pub fn sanitize_win_rate(win_rate: f64) -> f64 {
    if win_rate.is_nan() {
        warn!("win_rate is NaN, using 0.5");
        return 0.5;
    }
    if !(0.0..=1.0).contains(&win_rate) {
        let clamped = win_rate.clamp(0.0, 1.0);
        warn!(win_rate, clamped, "win_rate outside [0, 1], clamping");
        return clamped;
    }
    win_rate
}

pub fn sanitize_total_trades(total_trades: usize) -> usize {
    if total_trades == 0 {
        warn!("total_trades is 0, using 1");
        return 1;
    }
    total_trades
}
