//! Study runner — drive every lesson from one `StudyConfig`.
//!
//! A study is the stop comparison for each selected scenario, one sizing
//! comparison over a seeded outcome sequence, and (optionally) the
//! Monte-Carlo ruin study. The result is a self-describing `StudyReport`
//! that the export layer persists.

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use tradesim_core::domain::{OutcomeSequence, PricePoint, PriceSeries};
use tradesim_core::outcomes::generate_outcome_sequence;
use tradesim_core::scenario::{generate_scenario, Scenario};
use tradesim_core::sizing::{run_position_sizing_comparison, PathSummary, SizingComparison, SizingConfig};
use tradesim_core::stops::{run_trailing_stop_comparison_with, GradeThresholds, StopComparison, TrailingParams};

use crate::config::{ConfigError, StudyConfig, StudyId};
use crate::ruin_mc::{run_ruin_study, McError, RuinStudyConfig, RuinStudyResult};

/// Schema version for persisted reports. Bump on breaking layout changes.
pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

#[derive(Debug, Error)]
pub enum StudyError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Ruin(#[from] McError),
}

/// Stop comparison over one scenario path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioStopStudy {
    pub scenario: Scenario,
    pub path: Vec<PricePoint>,
    pub comparison: StopComparison,
}

impl ScenarioStopStudy {
    /// `None` for an empty path.
    pub fn entry_price(&self) -> Option<f64> {
        self.path.entry_price()
    }
}

/// Sizing comparison over one outcome sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizingStudy {
    pub win_rate: f64,
    pub seed: u64,
    pub outcomes: OutcomeSequence,
    pub comparison: SizingComparison,
    pub summaries: Vec<PathSummary>,
}

/// Everything one study produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyReport {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub study_id: StudyId,
    pub generated_at: DateTime<Utc>,
    pub config: StudyConfig,
    pub stops: Vec<ScenarioStopStudy>,
    pub sizing: SizingStudy,
    #[serde(default)]
    pub ruin: Option<RuinStudyResult>,
}

/// Stop comparison for each scenario. Scenarios run in parallel; the output
/// keeps the input order.
pub fn run_stop_study(
    scenarios: &[Scenario],
    length: usize,
    params: &TrailingParams,
    thresholds: &GradeThresholds,
) -> Vec<ScenarioStopStudy> {
    scenarios
        .par_iter()
        .map(|&scenario| {
            let path = generate_scenario(scenario, length);
            let comparison = run_trailing_stop_comparison_with(&path, params, thresholds);
            ScenarioStopStudy {
                scenario,
                path,
                comparison,
            }
        })
        .collect()
}

pub fn run_sizing_study(
    win_rate: f64,
    total_trades: usize,
    seed: u64,
    config: &SizingConfig,
) -> SizingStudy {
    let outcomes = generate_outcome_sequence(win_rate, total_trades, seed);
    let comparison = run_position_sizing_comparison(&outcomes, config);
    let summaries = comparison.summaries();
    SizingStudy {
        win_rate: outcomes.win_rate(),
        seed,
        outcomes,
        comparison,
        summaries,
    }
}

pub fn run_study(config: &StudyConfig) -> Result<StudyReport, StudyError> {
    config.validate()?;
    let study_id = config.study_id();
    info!(study_id = %study_id, scenarios = config.scenario.scenarios.len(), "running study");

    let stops = run_stop_study(
        &config.scenario.scenarios,
        config.scenario.length,
        &config.stops,
        &config.grading,
    );

    let sizing = run_sizing_study(
        config.sizing.win_rate,
        config.sizing.total_trades,
        config.sizing.seed,
        &config.sizing.account,
    );

    let ruin = match &config.monte_carlo {
        Some(mc) => Some(run_ruin_study(&RuinStudyConfig {
            paths: mc.paths,
            win_rate: config.sizing.win_rate,
            total_trades: config.sizing.total_trades,
            sizing: config.sizing.account,
            seed: mc.seed,
        })?),
        None => None,
    };

    info!(study_id = %study_id, "study complete");

    Ok(StudyReport {
        schema_version: SCHEMA_VERSION,
        study_id,
        generated_at: Utc::now(),
        config: config.clone(),
        stops,
        sizing,
        ruin,
    })
}
