//! Domain types shared by the generators and engines.
//!
//! Everything here is a value object: built once per parameter set and never
//! mutated afterwards.

pub mod outcome;
pub mod price;

pub use outcome::{Outcome, OutcomeSequence};
pub use price::{PricePoint, PriceSeries};

use thiserror::Error;

/// Errors from parsing user-supplied names (scenario tags, policy names).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown scenario '{0}' (expected strong_trend, choppy_rally, parabolic or reversal)")]
    UnknownScenario(String),
    #[error("unknown stop policy '{0}' (expected fixed, volatility or structural)")]
    UnknownStopPolicy(String),
    #[error("unknown sizing policy '{0}' (expected conservative, aggressive or emotional)")]
    UnknownSizingPolicy(String),
}
