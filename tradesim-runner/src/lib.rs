//! TradeSim Runner — study orchestration, Monte-Carlo ruin study, artifacts.
//!
//! This crate builds on `tradesim-core` to provide:
//! - TOML study configuration with content-addressed study IDs
//! - A study runner that drives every lesson from one config
//! - Parallel Monte-Carlo risk-of-ruin study over the sizing policies
//! - JSON / CSV / Markdown export with schema versioning

pub mod config;
pub mod export;
pub mod ruin_mc;
pub mod study;

pub use config::{ConfigError, MonteCarloSection, ScenarioSection, SizingSection, StudyConfig, StudyId};
pub use export::{export_json, generate_report, import_json, load_artifacts, save_artifacts};
pub use ruin_mc::{run_ruin_study, McError, PolicyRuinStats, RuinStudyConfig, RuinStudyResult};
pub use study::{
    run_sizing_study, run_stop_study, run_study, ScenarioStopStudy, SizingStudy, StudyError,
    StudyReport, SCHEMA_VERSION,
};
