//! TradeSim Core — deterministic simulations behind the trading-education charts.
//!
//! This crate contains the computational side of the interactive lessons:
//! - Scenario price generator (four deterministic market archetypes)
//! - Trailing-stop engine (fixed, volatility-scaled and structural stops racing
//!   over one path, with the ratchet invariant and capture grading)
//! - Outcome sequence generator (seeded Bernoulli win/loss draws)
//! - Position-sizing simulator (fixed fractional vs revenge sizing, drawdown,
//!   ruin and stress)
//!
//! Every entry point is a pure function of explicit inputs. Nothing is cached
//! between calls; the presentation layer re-invokes the full computation on
//! every parameter change and slices the result by its own playback cursor.

pub mod domain;
pub mod outcomes;
pub mod rng;
pub mod scenario;
pub mod sizing;
pub mod stops;

pub use domain::{Outcome, OutcomeSequence, ParseError, PricePoint, PriceSeries};
pub use outcomes::generate_outcome_sequence;
pub use scenario::{generate_scenario, Scenario};
pub use sizing::{run_position_sizing_comparison, SizingComparison, SizingConfig, TraderPath};
pub use stops::{run_trailing_stop_comparison, StopComparison, StopPolicyResult, TrailingParams};
