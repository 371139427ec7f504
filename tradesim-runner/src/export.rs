//! Reporting and export — JSON, CSV, and Markdown artifact generation.
//!
//! - **JSON**: full `StudyReport` round-trip with schema versioning
//! - **CSV**: per-bar stop levels and per-step equity paths for charting tools
//! - **Markdown**: human-readable lesson summary
//!
//! Reports from a newer schema are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tradesim_core::domain::Outcome;
use tradesim_core::stops::Grade;

use crate::ruin_mc::RuinStudyResult;
use crate::study::{ScenarioStopStudy, SizingStudy, StudyReport, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

pub fn export_json(report: &StudyReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize StudyReport to JSON")
}

/// Deserialize a `StudyReport`, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<StudyReport> {
    let report: StudyReport =
        serde_json::from_str(json).context("failed to deserialize StudyReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

fn opt_cell(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.4}")).unwrap_or_default()
}

fn outcome_cell(outcome: Option<Outcome>) -> &'static str {
    match outcome {
        Some(Outcome::Win) => "WIN",
        Some(Outcome::Loss) => "LOSS",
        None => "",
    }
}

/// One row per (scenario, bar).
///
/// Columns: scenario, step, price, volatility, structural_support,
/// fixed_stop, volatility_stop, structural_stop
pub fn export_stops_csv(studies: &[ScenarioStopStudy]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "scenario",
        "step",
        "price",
        "volatility",
        "structural_support",
        "fixed_stop",
        "volatility_stop",
        "structural_stop",
    ])?;

    for study in studies {
        for point in &study.path {
            let levels = study.comparison.at(point.index);
            wtr.write_record([
                study.scenario.as_str().to_string(),
                point.index.to_string(),
                format!("{:.4}", point.price),
                format!("{:.4}", point.volatility),
                opt_cell(point.structural_support),
                opt_cell(levels.fixed),
                opt_cell(levels.volatility),
                opt_cell(levels.structural),
            ])?;
        }
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// One row per (policy, step).
///
/// Columns: policy, step, outcome, risk, balance, drawdown_pct, alive, stress
pub fn export_sizing_csv(study: &SizingStudy) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "policy",
        "step",
        "outcome",
        "risk",
        "balance",
        "drawdown_pct",
        "alive",
        "stress",
    ])?;

    for path in study.comparison.iter() {
        for step in 0..path.len() {
            wtr.write_record([
                path.policy.as_str().to_string(),
                step.to_string(),
                outcome_cell(path.outcome_series[step]).to_string(),
                format!("{:.4}", path.risk_series[step]),
                format!("{:.2}", path.balance_series[step]),
                format!("{:.4}", path.drawdown_series[step]),
                path.alive_series[step].to_string(),
                format!("{:.4}", path.stress_series[step]),
            ])?;
        }
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

pub fn export_ruin_csv(result: &RuinStudyResult) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "policy",
        "ruin_probability",
        "p05_final_balance",
        "median_final_balance",
        "p95_final_balance",
        "mean_max_drawdown_pct",
        "worst_max_drawdown_pct",
        "mean_ruin_step",
    ])?;
    for s in &result.stats {
        wtr.write_record([
            s.policy.as_str().to_string(),
            format!("{:.4}", s.ruin_probability),
            format!("{:.2}", s.p05_final_balance),
            format!("{:.2}", s.median_final_balance),
            format!("{:.2}", s.p95_final_balance),
            format!("{:.2}", s.mean_max_drawdown_pct),
            format!("{:.2}", s.worst_max_drawdown_pct),
            s.mean_ruin_step.map(|v| format!("{v:.1}")).unwrap_or_default(),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for a study.
///
/// Creates `{study_id prefix}/` under `output_dir` containing:
/// - `manifest.json` — the full `StudyReport`
/// - `stops.csv` — per-bar stop levels for every scenario
/// - `sizing.csv` — per-step equity paths for every policy
/// - `ruin.csv` — only when the report carries a ruin study
/// - `report.md` — Markdown summary
///
/// Re-running an identical config overwrites the same directory.
pub fn save_artifacts(report: &StudyReport, output_dir: &Path) -> Result<PathBuf> {
    let dirname: String = report.study_id.chars().take(16).collect();
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    write_file(&run_dir.join("manifest.json"), &export_json(report)?)?;
    write_file(&run_dir.join("stops.csv"), &export_stops_csv(&report.stops)?)?;
    write_file(&run_dir.join("sizing.csv"), &export_sizing_csv(&report.sizing)?)?;
    if let Some(ruin) = &report.ruin {
        write_file(&run_dir.join("ruin.csv"), &export_ruin_csv(ruin)?)?;
    }
    write_file(&run_dir.join("report.md"), &generate_report(report))?;

    tracing::info!(dir = %run_dir.display(), "saved study artifacts");
    Ok(run_dir)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

/// Load a `StudyReport` from an artifact directory's manifest.json.
pub fn load_artifacts(dir: &Path) -> Result<StudyReport> {
    let manifest_path = dir.join("manifest.json");
    let json = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("failed to read {}", manifest_path.display()))?;
    import_json(&json)
}

// ─── Markdown reports ───────────────────────────────────────────────

fn grade_cell(grade: Grade, letter: Grade) -> String {
    if grade == Grade::InProgress {
        format!("in progress ({letter})")
    } else {
        grade.to_string()
    }
}

pub fn generate_report(report: &StudyReport) -> String {
    let mut md = String::with_capacity(4096);

    md.push_str("# TradeSim Study Report\n\n");

    md.push_str("## Metadata\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Study ID | {} |\n", report.study_id));
    md.push_str(&format!(
        "| Generated | {} |\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    md.push_str(&format!("| Path Length | {} |\n", report.config.scenario.length));
    md.push_str(&format!(
        "| Fixed Distance | {:.2} |\n",
        report.config.stops.fixed_distance
    ));
    md.push_str(&format!(
        "| ATR Multiplier | {:.2} |\n",
        report.config.stops.atr_multiplier
    ));
    md.push('\n');

    // Trailing stops
    md.push_str("## Trailing Stops\n\n");
    for study in &report.stops {
        md.push_str(&format!("### {}\n\n", study.scenario.label()));
        md.push_str(&format!("{}\n\n", study.scenario.description()));
        md.push_str("| Policy | Exit Bar | Exit Price | Profit | Capture | Grade |\n");
        md.push_str("| --- | ---: | ---: | ---: | ---: | --- |\n");
        for r in study.comparison.ranked() {
            md.push_str(&format!(
                "| {} | {} | {} | {:+.2} | {:.1}% | {} |\n",
                r.policy.label(),
                r.exit_index.map(|i| i.to_string()).unwrap_or_else(|| "-".into()),
                r.exit_price.map(|p| format!("{p:.2}")).unwrap_or_else(|| "-".into()),
                r.profit,
                r.capture_ratio * 100.0,
                grade_cell(r.grade, r.letter_grade),
            ));
        }
        md.push('\n');
    }

    // Position sizing
    let sizing = &report.sizing;
    md.push_str("## Position Sizing\n\n");
    md.push_str(&format!(
        "{} trades, realised win rate {:.1}%, longest losing streak {}.\n\n",
        sizing.outcomes.len(),
        sizing.win_rate * 100.0,
        sizing.outcomes.longest_losing_streak()
    ));
    md.push_str("| Policy | Final Balance | Return | Max Drawdown | Ruined At |\n");
    md.push_str("| --- | ---: | ---: | ---: | ---: |\n");
    for s in &sizing.summaries {
        md.push_str(&format!(
            "| {} | ${:.2} | {:+.2}% | {:.2}% | {} |\n",
            s.policy.label(),
            s.final_balance,
            s.total_return_pct,
            s.max_drawdown_pct,
            s.ruined_at.map(|i| i.to_string()).unwrap_or_else(|| "-".into()),
        ));
    }
    md.push('\n');

    // Ruin study
    if let Some(ruin) = &report.ruin {
        md.push_str("## Risk of Ruin\n\n");
        md.push_str(&format!(
            "{} simulated paths of {} trades at {:.1}% win rate.\n\n",
            ruin.config.paths,
            ruin.config.total_trades,
            ruin.config.win_rate * 100.0
        ));
        md.push_str("| Policy | Ruin Probability | P05 | Median | P95 | Worst Drawdown |\n");
        md.push_str("| --- | ---: | ---: | ---: | ---: | ---: |\n");
        for s in &ruin.stats {
            md.push_str(&format!(
                "| {} | {:.1}% | ${:.0} | ${:.0} | ${:.0} | {:.1}% |\n",
                s.policy.label(),
                s.ruin_probability * 100.0,
                s.p05_final_balance,
                s.median_final_balance,
                s.p95_final_balance,
                s.worst_max_drawdown_pct,
            ));
        }
        md.push('\n');
    }

    md
}
