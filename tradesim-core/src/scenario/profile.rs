use serde::{Deserialize, Serialize};

use super::Scenario;

/// Shape of the per-step drift over the path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DriftShape {
    /// Same drift on every step.
    Constant { drift: f64 },
    /// Drift grows by `acceleration` per step until `peak_fraction` of the
    /// path, then every remaining step drops by `shock`.
    Blowoff {
        base: f64,
        acceleration: f64,
        peak_fraction: f64,
        shock: f64,
    },
    /// `-down` for the first half, `+up` for the second half.
    VShape { down: f64, up: f64 },
}

impl DriftShape {
    pub fn drift_at(&self, step: usize, length: usize) -> f64 {
        match *self {
            DriftShape::Constant { drift } => drift,
            DriftShape::Blowoff {
                base,
                acceleration,
                peak_fraction,
                shock,
            } => {
                let peak = (length as f64 * peak_fraction).round() as usize;
                if step < peak {
                    base + acceleration * step as f64
                } else {
                    -shock
                }
            }
            DriftShape::VShape { down, up } => {
                if step < length / 2 {
                    -down
                } else {
                    up
                }
            }
        }
    }
}

/// Constants that define one scenario archetype.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioProfile {
    pub drift: DriftShape,
    /// Peak-to-peak amplitude of the per-step noise.
    pub noise_amplitude: f64,
    pub volatility_base: f64,
    pub volatility_spread: f64,
    /// Distance between price and a freshly placed swing low.
    pub support_offset: f64,
    /// Bars between swing-low recomputes.
    pub support_cadence: usize,
    /// Added to the step index before hashing, so scenarios don't share noise.
    pub seed_offset: f64,
}

impl ScenarioProfile {
    pub fn for_scenario(scenario: Scenario) -> Self {
        match scenario {
            Scenario::StrongTrend => Self {
                drift: DriftShape::Constant { drift: 0.5 },
                noise_amplitude: 0.8,
                volatility_base: 1.0,
                volatility_spread: 0.4,
                support_offset: 2.5,
                support_cadence: 5,
                seed_offset: 0.0,
            },
            Scenario::ChoppyRally => Self {
                drift: DriftShape::Constant { drift: 0.5 },
                noise_amplitude: 6.0,
                volatility_base: 2.5,
                volatility_spread: 1.5,
                support_offset: 4.0,
                support_cadence: 6,
                seed_offset: 1_000.0,
            },
            // Laggy swing lows: the structural stop trails far behind the blow-off.
            Scenario::Parabolic => Self {
                drift: DriftShape::Blowoff {
                    base: 0.1,
                    acceleration: 0.04,
                    peak_fraction: 0.6,
                    shock: 3.0,
                },
                noise_amplitude: 1.0,
                volatility_base: 1.0,
                volatility_spread: 0.5,
                support_offset: 8.0,
                support_cadence: 12,
                seed_offset: 2_000.0,
            },
            Scenario::Reversal => Self {
                drift: DriftShape::VShape { down: 0.6, up: 0.8 },
                noise_amplitude: 1.5,
                volatility_base: 1.5,
                volatility_spread: 0.8,
                support_offset: 3.5,
                support_cadence: 6,
                seed_offset: 3_000.0,
            },
        }
    }
}
