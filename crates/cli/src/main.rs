//! tickstitch command line.
//!
//! # Stitch raw contract files and build candles
//! tickstitch --config tickstitch.json run
//!
//! # Only the series stage, overriding the input tree
//! tickstitch stitch --input data/tickers --rollover-days 3
//!
//! # Only candles, for selected timeframes
//! tickstitch candles --timeframes 1m,1h,day

mod logging;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tickstitch_core::{Config, Timeframe, TracingSink};
use tickstitch_pipeline::{Pipeline, RunReport};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "tickstitch")]
#[command(about = "Stitch futures contract tick files into continuous series and OHLCV candles")]
#[command(version)]
struct Cli {
    /// JSON configuration file (defaults apply to missing fields)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Print the run report as JSON on stdout
    #[arg(long, global = true)]
    report: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build continuous series, then candles
    Run(Overrides),
    /// Build continuous series and the summary table only
    Stitch(Overrides),
    /// Build candles from existing series files only
    Candles(Overrides),
}

#[derive(Args)]
struct Overrides {
    /// Root folder with one directory per ticker
    #[arg(long)]
    input: Option<PathBuf>,

    /// Output folder for series files and the summary
    #[arg(long)]
    series_out: Option<PathBuf>,

    /// Output folder for candle files
    #[arg(long)]
    candles_out: Option<PathBuf>,

    /// Nominal rollover offset in days before expiry
    #[arg(long)]
    rollover_days: Option<u32>,

    /// Comma-separated timeframes (e.g. 1m,5m,15m,1h,4h,day)
    #[arg(long, value_delimiter = ',')]
    timeframes: Vec<Timeframe>,
}

impl Overrides {
    fn apply(self, config: &mut Config) {
        if let Some(input) = self.input {
            config.paths.input_dir = input;
        }
        if let Some(series_out) = self.series_out {
            config.paths.series_dir = series_out;
        }
        if let Some(candles_out) = self.candles_out {
            config.paths.candle_dir = candles_out;
        }
        if let Some(days) = self.rollover_days {
            config.series.rollover_days = days;
        }
        if !self.timeframes.is_empty() {
            config.candles.timeframes = self.timeframes;
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::from_json_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(Config::default()),
    }
}

#[derive(Debug, Clone, Copy)]
enum Stage {
    Full,
    Series,
    Candles,
}

impl Commands {
    fn split(self) -> (Stage, Overrides) {
        match self {
            Commands::Run(o) => (Stage::Full, o),
            Commands::Stitch(o) => (Stage::Series, o),
            Commands::Candles(o) => (Stage::Candles, o),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level, cli.json_logs)?;

    let mut config = load_config(cli.config.as_ref())?;
    let (stage, overrides) = cli.command.split();
    overrides.apply(&mut config);
    config.validate()?;

    info!(
        ?stage,
        input = %config.paths.input_dir.display(),
        series = %config.paths.series_dir.display(),
        candles = %config.paths.candle_dir.display(),
        "starting"
    );

    let pipeline = Pipeline::new(config, TracingSink);
    let report = match stage {
        Stage::Full => pipeline.run()?,
        Stage::Series => RunReport {
            series: pipeline.run_series_stage()?,
            ..RunReport::default()
        },
        Stage::Candles => RunReport {
            candles: pipeline.run_candle_stage()?,
            ..RunReport::default()
        },
    };

    if report.has_failures() {
        warn!(
            series_failed = report.series.failed.len(),
            candles_failed = report.candles.failed.len(),
            "some tickers were skipped"
        );
    }
    if cli.report {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_overrides_apply() {
        let cli = Cli::try_parse_from([
            "tickstitch",
            "candles",
            "--timeframes",
            "1m,day",
            "--rollover-days",
            "3",
            "--candles-out",
            "out",
        ])
        .unwrap();
        let (stage, overrides) = cli.command.split();
        assert!(matches!(stage, Stage::Candles));

        let mut config = Config::default();
        overrides.apply(&mut config);
        assert_eq!(config.candles.timeframes, vec![Timeframe::Min1, Timeframe::Day]);
        assert_eq!(config.series.rollover_days, 3);
        assert_eq!(config.paths.candle_dir, PathBuf::from("out"));
        assert_eq!(config.paths.input_dir, PathBuf::from("data/tickers"));
    }

    #[test]
    fn test_unknown_timeframe_rejected() {
        assert!(Cli::try_parse_from(["tickstitch", "run", "--timeframes", "7m"]).is_err());
    }
}
