//! TradeSim CLI — run the lesson simulations from the terminal.
//!
//! Commands:
//! - `scenario` — print a generated price path
//! - `stops` — race the three trailing stops over a scenario
//! - `sizing` — run the three sizing policies over a seeded outcome sequence
//! - `ruin` — Monte-Carlo risk-of-ruin study
//! - `study` — full study from a TOML config, with artifacts on disk

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tradesim_core::outcomes::generate_outcome_sequence;
use tradesim_core::scenario::{generate_scenario, Scenario, DEFAULT_PATH_LENGTH};
use tradesim_core::sizing::{run_position_sizing_comparison, SizingConfig};
use tradesim_core::stops::{run_trailing_stop_comparison, Grade, StopComparison, TrailingParams};
use tradesim_runner::{
    run_ruin_study, run_study, save_artifacts, RuinStudyConfig, RuinStudyResult, StudyConfig,
    StudyReport,
};

#[derive(Parser)]
#[command(
    name = "tradesim",
    about = "TradeSim CLI — trailing-stop and position-sizing simulations"
)]
struct Cli {
    /// Log filter used when RUST_LOG is unset (error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a generated price path.
    Scenario {
        /// strong_trend, choppy_rally, parabolic or reversal.
        #[arg(long, default_value = "strong_trend")]
        scenario: Scenario,

        #[arg(long, default_value_t = DEFAULT_PATH_LENGTH)]
        length: usize,

        /// Emit JSON instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Compare fixed, volatility-scaled and structural trailing stops.
    Stops {
        #[arg(long, default_value = "strong_trend")]
        scenario: Scenario,

        #[arg(long, default_value_t = DEFAULT_PATH_LENGTH)]
        length: usize,

        #[arg(long, default_value_t = 5.0)]
        fixed_distance: f64,

        #[arg(long, default_value_t = 2.0)]
        atr_multiplier: f64,

        #[arg(long, default_value_t = 0.5)]
        technical_buffer: f64,

        /// Offset used by the structural stop before the first swing low.
        #[arg(long, default_value_t = 5.0)]
        structural_offset: f64,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Compare conservative, aggressive and emotional position sizing.
    Sizing {
        #[arg(long, default_value_t = 0.45)]
        win_rate: f64,

        #[arg(long, default_value_t = 100)]
        trades: usize,

        #[arg(long, default_value_t = 7)]
        seed: u64,

        #[arg(long, default_value_t = 10_000.0)]
        initial_balance: f64,

        #[arg(long, default_value_t = 2.0)]
        reward_ratio: f64,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Monte-Carlo risk-of-ruin study.
    Ruin {
        #[arg(long, default_value_t = 1_000)]
        paths: usize,

        #[arg(long, default_value_t = 0.45)]
        win_rate: f64,

        #[arg(long, default_value_t = 100)]
        trades: usize,

        #[arg(long, default_value_t = 42)]
        seed: u64,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Run a full study and save its artifacts.
    Study {
        /// Path to a TOML study config. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output directory for artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,

        /// Print the report JSON to stdout as well.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    match cli.command {
        Commands::Scenario {
            scenario,
            length,
            json,
        } => run_scenario_cmd(scenario, length, json),
        Commands::Stops {
            scenario,
            length,
            fixed_distance,
            atr_multiplier,
            technical_buffer,
            structural_offset,
            json,
        } => {
            let params = TrailingParams {
                fixed_distance,
                atr_multiplier,
                technical_buffer,
                default_structural_offset: structural_offset,
            };
            run_stops_cmd(scenario, length, &params, json)
        }
        Commands::Sizing {
            win_rate,
            trades,
            seed,
            initial_balance,
            reward_ratio,
            json,
        } => {
            let config = SizingConfig {
                initial_balance,
                reward_ratio,
                ..SizingConfig::default()
            };
            run_sizing_cmd(win_rate, trades, seed, &config, json)
        }
        Commands::Ruin {
            paths,
            win_rate,
            trades,
            seed,
            json,
        } => {
            let config = RuinStudyConfig {
                paths,
                win_rate,
                total_trades: trades,
                seed,
                ..RuinStudyConfig::default()
            };
            run_ruin_cmd(&config, json)
        }
        Commands::Study {
            config,
            output_dir,
            json,
        } => run_study_cmd(config, output_dir, json),
    }
}

/// Logs go to stderr so `--json` output stays clean on stdout.
fn init_logging(level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    Ok(())
}

fn run_scenario_cmd(scenario: Scenario, length: usize, json: bool) -> Result<()> {
    let path = generate_scenario(scenario, length);
    if json {
        println!("{}", serde_json::to_string_pretty(&path)?);
        return Ok(());
    }

    println!("{} — {}", scenario.label(), scenario.description());
    println!("{:>5}  {:>10}  {:>8}  {:>10}", "step", "price", "vol", "support");
    for p in &path {
        let support = p
            .structural_support
            .map(|s| format!("{s:.2}"))
            .unwrap_or_else(|| "-".into());
        println!(
            "{:>5}  {:>10.2}  {:>8.2}  {:>10}",
            p.index, p.price, p.volatility, support
        );
    }
    Ok(())
}

fn run_stops_cmd(scenario: Scenario, length: usize, params: &TrailingParams, json: bool) -> Result<()> {
    let path = generate_scenario(scenario, length);
    let comparison = run_trailing_stop_comparison(&path, params);
    if json {
        println!("{}", serde_json::to_string_pretty(&comparison)?);
        return Ok(());
    }

    println!("{} ({} bars)", scenario.label(), path.len());
    print_stop_table(&comparison);
    Ok(())
}

fn print_stop_table(comparison: &StopComparison) {
    println!(
        "{:<18} {:>6} {:>10} {:>9} {:>8} {:>14}",
        "policy", "exit", "exit px", "profit", "capture", "grade"
    );
    for r in comparison.ranked() {
        let exit = r.exit_index.map(|i| i.to_string()).unwrap_or_else(|| "-".into());
        let exit_px = r.exit_price.map(|p| format!("{p:.2}")).unwrap_or_else(|| "-".into());
        let grade = if r.grade == Grade::InProgress {
            format!("open ({})", r.letter_grade)
        } else {
            r.grade.to_string()
        };
        println!(
            "{:<18} {:>6} {:>10} {:>+9.2} {:>7.1}% {:>14}",
            r.policy.label(),
            exit,
            exit_px,
            r.profit,
            r.capture_ratio * 100.0,
            grade
        );
    }
}

fn run_sizing_cmd(
    win_rate: f64,
    trades: usize,
    seed: u64,
    config: &SizingConfig,
    json: bool,
) -> Result<()> {
    let outcomes = generate_outcome_sequence(win_rate, trades, seed);
    let comparison = run_position_sizing_comparison(&outcomes, config);
    if json {
        println!("{}", serde_json::to_string_pretty(&comparison)?);
        return Ok(());
    }

    println!(
        "{} trades, {} wins ({:.1}%), longest losing streak {}",
        outcomes.len(),
        outcomes.win_count(),
        outcomes.win_rate() * 100.0,
        outcomes.longest_losing_streak()
    );
    println!(
        "{:<22} {:>12} {:>9} {:>9} {:>8}",
        "policy", "final", "return", "max dd", "ruined"
    );
    for s in comparison.summaries() {
        println!(
            "{:<22} {:>12.2} {:>+8.2}% {:>8.2}% {:>8}",
            s.policy.label(),
            s.final_balance,
            s.total_return_pct,
            s.max_drawdown_pct,
            s.ruined_at.map(|i| i.to_string()).unwrap_or_else(|| "-".into())
        );
    }
    Ok(())
}

fn run_ruin_cmd(config: &RuinStudyConfig, json: bool) -> Result<()> {
    let result = run_ruin_study(config)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }
    print_ruin_table(&result);
    Ok(())
}

fn print_ruin_table(result: &RuinStudyResult) {
    println!(
        "{} paths x {} trades at {:.1}% wins",
        result.config.paths,
        result.config.total_trades,
        result.config.win_rate * 100.0
    );
    println!(
        "{:<22} {:>8} {:>10} {:>10} {:>10} {:>9}",
        "policy", "ruin", "p05", "median", "p95", "worst dd"
    );
    for s in &result.stats {
        println!(
            "{:<22} {:>7.1}% {:>10.0} {:>10.0} {:>10.0} {:>8.1}%",
            s.policy.label(),
            s.ruin_probability * 100.0,
            s.p05_final_balance,
            s.median_final_balance,
            s.p95_final_balance,
            s.worst_max_drawdown_pct
        );
    }
}

fn run_study_cmd(config_path: Option<PathBuf>, output_dir: PathBuf, json: bool) -> Result<()> {
    let config = match config_path {
        Some(path) => StudyConfig::from_file(&path)?,
        None => StudyConfig::default(),
    };

    let report = run_study(&config)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_study_summary(&report);
    }

    let run_dir = save_artifacts(&report, &output_dir)?;
    eprintln!("Artifacts saved to: {}", run_dir.display());
    Ok(())
}

fn print_study_summary(report: &StudyReport) {
    println!("Study {}", report.study_id);
    for study in &report.stops {
        println!();
        println!("{}", study.scenario.label());
        print_stop_table(&study.comparison);
    }
    println!();
    for s in &report.sizing.summaries {
        println!(
            "{:<22} final {:>12.2}  max dd {:>6.2}%  ruined {}",
            s.policy.label(),
            s.final_balance,
            s.max_drawdown_pct,
            s.ruined_at.map(|i| i.to_string()).unwrap_or_else(|| "-".into())
        );
    }
    if let Some(ruin) = &report.ruin {
        println!();
        print_ruin_table(ruin);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn scenario_accepts_tags() {
        let cli = Cli::try_parse_from(["tradesim", "stops", "--scenario", "parabolic"]).unwrap();
        match cli.command {
            Commands::Stops { scenario, .. } => assert_eq!(scenario, Scenario::Parabolic),
            _ => panic!("expected stops"),
        }
        assert!(Cli::try_parse_from(["tradesim", "stops", "--scenario", "sideways"]).is_err());
    }
}
