//! Stop-placement policies — each turns one price point into a proposed stop.
//!
//! The trailing loop is identical for all three; only the proposal differs:
//! - [`FixedDistance`] — `price - distance`
//! - [`VolatilityScaled`] — `price - volatility * multiplier`
//! - [`StructuralSwing`] — `(swing low, or price - fallback offset) - buffer`

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{ParseError, PricePoint};

/// Which of the three policies produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopPolicyKind {
    Fixed,
    Volatility,
    Structural,
}

impl StopPolicyKind {
    pub const ALL: [StopPolicyKind; 3] = [
        StopPolicyKind::Fixed,
        StopPolicyKind::Volatility,
        StopPolicyKind::Structural,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StopPolicyKind::Fixed => "fixed",
            StopPolicyKind::Volatility => "volatility",
            StopPolicyKind::Structural => "structural",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StopPolicyKind::Fixed => "Fixed Distance",
            StopPolicyKind::Volatility => "ATR Multiple",
            StopPolicyKind::Structural => "Swing Low",
        }
    }
}

impl fmt::Display for StopPolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StopPolicyKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" => Ok(StopPolicyKind::Fixed),
            "volatility" | "atr" => Ok(StopPolicyKind::Volatility),
            "structural" | "swing" => Ok(StopPolicyKind::Structural),
            _ => Err(ParseError::UnknownStopPolicy(s.to_string())),
        }
    }
}

/// Trait for stop-placement policies.
///
/// Implementations are stateless: the ratchet and exit tracking live in the
/// trailing loop, so one policy value can be shared across paths and threads.
pub trait StopPolicy: Send + Sync {
    fn kind(&self) -> StopPolicyKind;

    /// Proposed stop level for this bar, before the ratchet is applied.
    fn potential_stop(&self, point: &PricePoint) -> f64;
}

/// Stop a fixed number of price units below the close.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedDistance {
    pub distance: f64,
}

impl StopPolicy for FixedDistance {
    fn kind(&self) -> StopPolicyKind {
        StopPolicyKind::Fixed
    }

    fn potential_stop(&self, point: &PricePoint) -> f64 {
        point.price - self.distance
    }
}

/// Stop a multiple of the bar's volatility below the close.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolatilityScaled {
    pub multiplier: f64,
}

impl StopPolicy for VolatilityScaled {
    fn kind(&self) -> StopPolicyKind {
        StopPolicyKind::Volatility
    }

    fn potential_stop(&self, point: &PricePoint) -> f64 {
        point.price - point.volatility * self.multiplier
    }
}

/// Stop just under the most recent swing low.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StructuralSwing {
    /// Placed below the swing low to avoid being tagged by a retest.
    pub buffer: f64,
    /// Used in place of a swing low when the path hasn't produced one yet.
    pub fallback_offset: f64,
}

impl StopPolicy for StructuralSwing {
    fn kind(&self) -> StopPolicyKind {
        StopPolicyKind::Structural
    }

    fn potential_stop(&self, point: &PricePoint) -> f64 {
        let support = point
            .structural_support
            .unwrap_or(point.price - self.fallback_offset);
        support - self.buffer
    }
}

/// Parameters for a trailing-stop comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrailingParams {
    pub fixed_distance: f64,
    pub atr_multiplier: f64,
    pub technical_buffer: f64,
    pub default_structural_offset: f64,
}

impl Default for TrailingParams {
    fn default() -> Self {
        Self {
            fixed_distance: 5.0,
            atr_multiplier: 2.0,
            technical_buffer: 0.5,
            default_structural_offset: 5.0,
        }
    }
}

impl TrailingParams {
    /// Clamp every field to a finite, non-negative value, logging each change.
    pub fn sanitized(&self) -> Self {
        Self {
            fixed_distance: non_negative("fixed_distance", self.fixed_distance),
            atr_multiplier: non_negative("atr_multiplier", self.atr_multiplier),
            technical_buffer: non_negative("technical_buffer", self.technical_buffer),
            default_structural_offset: non_negative(
                "default_structural_offset",
                self.default_structural_offset,
            ),
        }
    }

    pub fn fixed(&self) -> FixedDistance {
        FixedDistance {
            distance: self.fixed_distance,
        }
    }

    pub fn volatility(&self) -> VolatilityScaled {
        VolatilityScaled {
            multiplier: self.atr_multiplier,
        }
    }

    pub fn structural(&self) -> StructuralSwing {
        StructuralSwing {
            buffer: self.technical_buffer,
            fallback_offset: self.default_structural_offset,
        }
    }

    /// The policy for `kind`, boxed for callers that pick at runtime.
    pub fn policy(&self, kind: StopPolicyKind) -> Box<dyn StopPolicy> {
        match kind {
            StopPolicyKind::Fixed => Box::new(self.fixed()),
            StopPolicyKind::Volatility => Box::new(self.volatility()),
            StopPolicyKind::Structural => Box::new(self.structural()),
        }
    }
}

fn non_negative(field: &str, value: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        return value;
    }
    warn!(field, value, "invalid trailing parameter, clamping to 0");
    0.0
}
