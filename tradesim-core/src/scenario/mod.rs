//! Scenario price generator — deterministic synthetic paths for four market archetypes.
//!
//! Each archetype is described by a [`ScenarioProfile`] (drift shape, noise
//! amplitude, volatility band, swing-low cadence). Generation reads only the
//! profile, so the same scenario always yields the same path.

mod profile;

pub use profile::{DriftShape, ScenarioProfile};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{ParseError, PricePoint};
use crate::rng::scenario_noise;

/// Starting price of every scenario path.
pub const START_PRICE: f64 = 100.0;

/// Prices never fall below this floor.
pub const MIN_PRICE: f64 = 1.0;

/// Path length used when callers don't pick one.
pub const DEFAULT_PATH_LENGTH: usize = 100;

/// Offset applied to the noise input for the volatility channel, so the
/// volatility series is not a copy of the price noise.
const VOLATILITY_NOISE_SHIFT: f64 = 0.5;

/// Named market archetypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    StrongTrend,
    ChoppyRally,
    Parabolic,
    Reversal,
}

impl Scenario {
    pub const ALL: [Scenario; 4] = [
        Scenario::StrongTrend,
        Scenario::ChoppyRally,
        Scenario::Parabolic,
        Scenario::Reversal,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Scenario::StrongTrend => "strong_trend",
            Scenario::ChoppyRally => "choppy_rally",
            Scenario::Parabolic => "parabolic",
            Scenario::Reversal => "reversal",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Scenario::StrongTrend => "Strong Trend",
            Scenario::ChoppyRally => "Choppy Rally",
            Scenario::Parabolic => "Parabolic Blow-off",
            Scenario::Reversal => "V-Shaped Reversal",
        }
    }

    /// One-sentence teaching note shown next to the chart.
    pub fn description(self) -> &'static str {
        match self {
            Scenario::StrongTrend => {
                "Steady climb with shallow pullbacks; tight stops survive and capture most of the move."
            }
            Scenario::ChoppyRally => {
                "Uptrend buried in noise; fixed stops get shaken out while volatility stops breathe."
            }
            Scenario::Parabolic => {
                "Accelerating rally that collapses; lagging structural stops give back the most."
            }
            Scenario::Reversal => {
                "Sell-off followed by recovery; every stop is tested on the way down."
            }
        }
    }

    pub fn profile(self) -> ScenarioProfile {
        ScenarioProfile::for_scenario(self)
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scenario {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "strong_trend" => Ok(Scenario::StrongTrend),
            "choppy_rally" => Ok(Scenario::ChoppyRally),
            "parabolic" => Ok(Scenario::Parabolic),
            "reversal" => Ok(Scenario::Reversal),
            _ => Err(ParseError::UnknownScenario(s.to_string())),
        }
    }
}

/// Generate the deterministic price path for `scenario`.
///
/// A zero `length` is raised to 1 (a single entry bar) and logged.
pub fn generate_scenario(scenario: Scenario, length: usize) -> Vec<PricePoint> {
    let length = if length == 0 {
        warn!(scenario = %scenario, "path length 0 is invalid, using 1");
        1
    } else {
        length
    };
    generate_from_profile(&scenario.profile(), length)
}

/// Generate a path from an explicit profile.
pub fn generate_from_profile(profile: &ScenarioProfile, length: usize) -> Vec<PricePoint> {
    let mut points = Vec::with_capacity(length);
    let mut price = START_PRICE;
    let mut support: Option<f64> = None;
    let cadence = profile.support_cadence.max(1);

    for i in 0..length {
        let x = i as f64 + profile.seed_offset;

        if i > 0 {
            let shock = (scenario_noise(x) - 0.5) * profile.noise_amplitude;
            price = (price + profile.drift.drift_at(i, length) + shock).max(MIN_PRICE);
        }

        let volatility = profile.volatility_base
            + scenario_noise(x + VOLATILITY_NOISE_SHIFT) * profile.volatility_spread;

        if i > 0 && i % cadence == 0 {
            support = Some(price - profile.support_offset);
        }

        let point = PricePoint::new(i, price, volatility, support);
        // A broken swing low is replaced by the clamped level.
        support = point.structural_support;
        points.push(point);
    }

    points
}
