//! Serializable study configuration, loaded from TOML.
//!
//! ```toml
//! [scenario]
//! scenarios = ["strong_trend", "parabolic"]
//! length = 100
//!
//! [stops]
//! fixed_distance = 5.0
//! atr_multiplier = 2.0
//!
//! [sizing]
//! win_rate = 0.45
//! total_trades = 100
//! seed = 7
//!
//! [sizing.account]
//! initial_balance = 10000.0
//! reward_ratio = 2.0
//!
//! [monte_carlo]
//! paths = 1000
//! seed = 42
//! ```
//!
//! Every section is optional; missing fields take their defaults. Numeric
//! fields are clamped by the core at run time, so only structural problems
//! (unreadable file, bad TOML, empty selections) are errors here.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tradesim_core::scenario::{Scenario, DEFAULT_PATH_LENGTH};
use tradesim_core::sizing::SizingConfig;
use tradesim_core::stops::{GradeThresholds, TrailingParams};

/// Unique identifier for a study (content-addressable hash).
pub type StudyId = String;

/// Errors from loading a study configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Complete configuration for one study run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyConfig {
    pub scenario: ScenarioSection,
    pub stops: TrailingParams,
    pub grading: GradeThresholds,
    pub sizing: SizingSection,
    /// Ruin study; skipped when absent.
    pub monte_carlo: Option<MonteCarloSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioSection {
    pub scenarios: Vec<Scenario>,
    pub length: usize,
}

impl Default for ScenarioSection {
    fn default() -> Self {
        Self {
            scenarios: Scenario::ALL.to_vec(),
            length: DEFAULT_PATH_LENGTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizingSection {
    pub win_rate: f64,
    pub total_trades: usize,
    pub seed: u64,
    pub account: SizingConfig,
}

impl Default for SizingSection {
    fn default() -> Self {
        Self {
            win_rate: 0.45,
            total_trades: 100,
            seed: 7,
            account: SizingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonteCarloSection {
    pub paths: usize,
    pub seed: u64,
}

impl Default for MonteCarloSection {
    fn default() -> Self {
        Self {
            paths: 1_000,
            seed: 42,
        }
    }
}

impl StudyConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject configurations that cannot produce a meaningful study.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scenario.scenarios.is_empty() {
            return Err(ConfigError::Invalid(
                "scenario.scenarios must name at least one scenario".into(),
            ));
        }
        if let Some(mc) = &self.monte_carlo {
            if mc.paths == 0 {
                return Err(ConfigError::Invalid("monte_carlo.paths must be > 0".into()));
            }
        }
        Ok(())
    }

    /// Deterministic hash of this configuration.
    ///
    /// Two studies with identical configs share a StudyId, so their artifacts
    /// land in the same place.
    pub fn study_id(&self) -> StudyId {
        let json = serde_json::to_vec(self).unwrap_or_default();
        blake3::hash(&json).to_hex().to_string()
    }
}
