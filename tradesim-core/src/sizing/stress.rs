//! Stress metric — a 0..1 gauge fed to HUD overlays.
//!
//! `stress = clamp(drawdown_pct / drawdown_ceiling + tilt_weight * tilt, 0, 1)`

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StressWeights {
    /// Drawdown (percent) at which the drawdown term alone saturates.
    pub drawdown_ceiling: f64,
    pub tilt_weight: f64,
}

impl Default for StressWeights {
    fn default() -> Self {
        Self {
            drawdown_ceiling: 50.0,
            tilt_weight: 0.5,
        }
    }
}

impl StressWeights {
    pub fn stress(&self, drawdown_pct: f64, tilt: f64) -> f64 {
        let drawdown_term = if self.drawdown_ceiling > 0.0 {
            drawdown_pct / self.drawdown_ceiling
        } else if drawdown_pct > 0.0 {
            1.0
        } else {
            0.0
        };
        let raw = drawdown_term + self.tilt_weight * tilt;
        if raw.is_nan() {
            return 0.0;
        }
        raw.clamp(0.0, 1.0)
    }
}
