//! Intrabar CLI — replay bar CSVs through the crossover pipeline.
//!
//! Commands:
//! - `replay` — register a primary and one or more secondary series, load
//!   their bars from CSV, run the merged replay, and print the run report
//!   plus the execution log as JSON.
//!
//! CSV columns: `timestamp,open,high,low,close,volume` with timestamps like
//! `2024-01-02 12:00:00`.

use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use intrabar_core::domain::{Bar, Direction, PeriodUnit, Periodicity, SeriesIndex};
use intrabar_core::registry::SeriesRegistry;
use intrabar_core::router::ExecutionHandler;
use intrabar_core::session::{run_replay, RunReport};
use intrabar_core::signal::{CrossoverParams, StrategyConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "intrabar",
    about = "Intrabar CLI — deterministic multi-series crossover replay"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay bar CSVs through the crossover strategy.
    Replay {
        /// Primary series CSV (the signal series).
        #[arg(long)]
        primary: PathBuf,

        /// Primary bar period, e.g. 5m, 1h, 30s.
        #[arg(long, default_value = "5m")]
        primary_period: String,

        /// Secondary series CSVs (execution series), repeatable.
        #[arg(long, required = true)]
        secondary: Vec<PathBuf>,

        /// Secondary bar periods, one per --secondary, e.g. 1m.
        #[arg(long, default_value = "1m")]
        secondary_period: Vec<String>,

        /// Fast EMA length.
        #[arg(long, default_value_t = 10)]
        fast: usize,

        /// Slow EMA length.
        #[arg(long, default_value_t = 25)]
        slow: usize,

        /// Crossover lookback offset in bars.
        #[arg(long, default_value_t = 1)]
        lookback: usize,

        /// Secondary series index to route fills to.
        #[arg(long, default_value_t = 1)]
        target: usize,

        /// Order quantity per fill.
        #[arg(long, default_value_t = 1)]
        quantity: u32,
    },
}

/// One row of a bar CSV.
#[derive(Debug, Deserialize)]
struct BarRow {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: u64,
}

/// Execution handler that records fills for the JSON report.
#[derive(Default, Serialize)]
struct ExecutionLog {
    fills: Vec<FillRecord>,
}

#[derive(Serialize)]
struct FillRecord {
    series: SeriesIndex,
    direction: Direction,
    quantity: u32,
    label: String,
}

impl ExecutionHandler for ExecutionLog {
    fn execute(&mut self, series: SeriesIndex, direction: Direction, quantity: u32, label: &str) {
        self.fills.push(FillRecord {
            series,
            direction,
            quantity,
            label: label.to_string(),
        });
    }
}

#[derive(Serialize)]
struct Output {
    report: RunReport,
    fills: Vec<FillRecord>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Replay {
            primary,
            primary_period,
            secondary,
            secondary_period,
            fast,
            slow,
            lookback,
            target,
            quantity,
        } => {
            if secondary_period.len() != secondary.len() {
                bail!(
                    "expected {} --secondary-period values, got {}",
                    secondary.len(),
                    secondary_period.len()
                );
            }

            let mut registry = SeriesRegistry::new();
            let primary_index = registry.register_series(parse_period(&primary_period)?)?;
            load_series(&mut registry, primary_index, &primary)?;

            for (path, period) in secondary.iter().zip(&secondary_period) {
                let index = registry.register_series(parse_period(period)?)?;
                load_series(&mut registry, index, path)?;
            }

            let config = StrategyConfig {
                params: CrossoverParams::new(fast, slow).with_lookback(lookback),
                target: SeriesIndex(target),
                quantity,
            };

            let mut log = ExecutionLog::default();
            let report = run_replay(&registry, config, &mut log)?;

            let output = Output {
                report,
                fills: log.fills,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
    }
}

/// Parse a period string like `5m`, `1min`, `30s`, `2h`, `1d`.
fn parse_period(raw: &str) -> Result<Periodicity> {
    let digits: String = raw.chars().take_while(|c| c.is_ascii_digit()).collect();
    let suffix = &raw[digits.len()..];
    let value: u32 = digits
        .parse()
        .with_context(|| format!("period '{raw}' has no leading number"))?;
    let unit = match suffix {
        "s" | "sec" => PeriodUnit::Second,
        "m" | "min" => PeriodUnit::Minute,
        "h" => PeriodUnit::Hour,
        "d" => PeriodUnit::Day,
        _ => bail!("unknown period unit '{suffix}' in '{raw}'"),
    };
    Ok(Periodicity::new(unit, value))
}

fn load_series(registry: &mut SeriesRegistry, series: SeriesIndex, path: &Path) -> Result<()> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("cannot open {}", path.display()))?;
    for (line, row) in reader.deserialize::<BarRow>().enumerate() {
        let row = row.with_context(|| format!("{}: bad row {}", path.display(), line + 2))?;
        let timestamp = parse_timestamp(&row.timestamp)
            .with_context(|| format!("{}: bad timestamp '{}'", path.display(), row.timestamp))?;
        let bar = Bar {
            timestamp,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        };
        registry
            .append_bar(series, bar)
            .with_context(|| format!("{}: append failed at row {}", path.display(), line + 2))?;
    }
    Ok(())
}

fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(ts);
        }
    }
    bail!("unrecognized timestamp format")
}
