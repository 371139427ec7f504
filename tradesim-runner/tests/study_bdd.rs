//! BDD tests for the study runner.
//!
//! These tests verify:
//! - A TOML config drives the full study
//! - Identical configs produce identical results and study IDs
//! - Artifacts land on disk and load back
//! - The ruin study separates disciplined from revenge sizing

use tradesim_core::scenario::Scenario;
use tradesim_core::sizing::SizingPolicyKind;
use tradesim_core::stops::{Grade, StopPolicyKind};
use tradesim_runner::{
    load_artifacts, run_ruin_study, run_study, save_artifacts, RuinStudyConfig, StudyConfig,
};

const LESSON_CONFIG: &str = r#"
[scenario]
scenarios = ["strong_trend", "choppy_rally", "parabolic", "reversal"]
length = 100

[sizing]
win_rate = 0.45
total_trades = 100
seed = 11

[monte_carlo]
paths = 200
seed = 5
"#;

#[test]
fn bdd_scenario_toml_config_drives_full_study() {
    // GIVEN a lesson config with all four scenarios and a ruin study
    let config = StudyConfig::from_toml_str(LESSON_CONFIG).expect("config should parse");

    // WHEN the study runs
    let report = run_study(&config).expect("study should succeed");

    // THEN every scenario has a stop comparison over a 100-bar path
    assert_eq!(report.stops.len(), 4);
    for study in &report.stops {
        assert_eq!(study.path.len(), 100);
        for result in study.comparison.iter() {
            assert_eq!(result.history.len(), 100);
        }
    }

    // AND the sizing comparison consumed 100 outcomes
    assert_eq!(report.sizing.outcomes.len(), 100);
    for path in report.sizing.comparison.iter() {
        assert_eq!(path.len(), 101);
    }

    // AND the ruin study ran
    let ruin = report.ruin.as_ref().expect("monte_carlo section present");
    assert_eq!(ruin.config.paths, 200);
    assert_eq!(ruin.stats.len(), 3);
}

#[test]
fn bdd_scenario_identical_configs_are_reproducible() {
    // GIVEN the same config loaded twice
    let a = StudyConfig::from_toml_str(LESSON_CONFIG).unwrap();
    let b = StudyConfig::from_toml_str(LESSON_CONFIG).unwrap();

    // WHEN both studies run
    let ra = run_study(&a).unwrap();
    let rb = run_study(&b).unwrap();

    // THEN they share a study ID and produce identical results
    assert_eq!(ra.study_id, rb.study_id);
    assert_eq!(ra.stops, rb.stops);
    assert_eq!(ra.sizing, rb.sizing);
    assert_eq!(ra.ruin, rb.ruin);
}

#[test]
fn bdd_scenario_strong_trend_lesson_in_report() {
    // GIVEN a study of the strong trend only
    let config = StudyConfig::from_toml_str("[scenario]\nscenarios = [\"strong_trend\"]\n").unwrap();

    // WHEN the study runs
    let report = run_study(&config).unwrap();

    // THEN no stop is hit and every policy grades A+ marked to market
    let study = &report.stops[0];
    assert_eq!(study.scenario, Scenario::StrongTrend);
    for kind in StopPolicyKind::ALL {
        let result = study.comparison.get(kind);
        assert_eq!(result.grade, Grade::InProgress);
        assert_eq!(result.letter_grade, Grade::APlus);
    }
}

#[test]
fn bdd_scenario_artifacts_saved_and_reloaded() {
    // GIVEN a completed study
    let config = StudyConfig::from_toml_str(LESSON_CONFIG).unwrap();
    let report = run_study(&config).unwrap();

    // WHEN artifacts are saved to a temp directory
    let temp_dir = tempfile::tempdir().unwrap();
    let run_dir = save_artifacts(&report, temp_dir.path()).expect("save should succeed");

    // THEN every artifact exists
    for name in ["manifest.json", "stops.csv", "sizing.csv", "ruin.csv", "report.md"] {
        assert!(run_dir.join(name).exists(), "{name} missing");
    }

    // AND the manifest loads back to the same study
    let loaded = load_artifacts(&run_dir).expect("load should succeed");
    assert_eq!(loaded.study_id, report.study_id);
    assert_eq!(loaded.sizing.outcomes, report.sizing.outcomes);

    // AND the report names the ruin section
    let md = std::fs::read_to_string(run_dir.join("report.md")).unwrap();
    assert!(md.contains("Risk of Ruin"));
}

#[test]
fn bdd_scenario_revenge_sizing_ruins_more_often() {
    // GIVEN a losing edge (30% wins at 2R) over many paths
    let config = RuinStudyConfig {
        paths: 400,
        win_rate: 0.3,
        total_trades: 150,
        seed: 99,
        ..RuinStudyConfig::default()
    };

    // WHEN the ruin study runs
    let result = run_ruin_study(&config).unwrap();

    // THEN the emotional trader is ruined more often than the conservative one
    let emotional = result.get(SizingPolicyKind::Emotional).unwrap();
    let conservative = result.get(SizingPolicyKind::Conservative).unwrap();
    assert_eq!(conservative.ruin_probability, 0.0);
    assert!(emotional.ruin_probability > 0.1);
    assert!(emotional.mean_max_drawdown_pct > conservative.mean_max_drawdown_pct);
}
