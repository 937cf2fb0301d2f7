//! Stage runners.
//!
//! A missing root directory aborts the stage. Anything that goes wrong
//! inside one ticker is reported through the sink and the batch moves on.

use std::path::{Path, PathBuf};

use tickstitch_candles::{aggregate, candle_path, find_series_file, load_series, write_candles};
use tickstitch_core::{Config, Error, EventSink, PipelineEvent, Result, TickerSummary};
use tickstitch_ingestion::{list_tickers, write_series, write_summary, ContinuousSeriesBuilder};
use tracing::info;

use crate::report::{RunReport, StageReport};

/// File name of the per-ticker summary inside the series directory.
pub const SUMMARY_FILE: &str = "summary_stats.csv";

/// Batch pipeline over all tickers.
pub struct Pipeline<S: EventSink> {
    config: Config,
    sink: S,
}

fn require_dir(dir: &Path, what: &str) -> Result<()> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(Error::data(format!("{what} directory {} does not exist", dir.display())))
    }
}

impl<S: EventSink> Pipeline<S> {
    /// Create a pipeline reporting to `sink`.
    pub fn new(config: Config, sink: S) -> Self {
        Self { config, sink }
    }

    /// Event sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Path of the series file for a ticker.
    pub fn series_path(&self, ticker: &str) -> PathBuf {
        self.config
            .paths
            .series_dir
            .join(ticker)
            .join(format!("{ticker}.csv"))
    }

    /// Run both stages.
    pub fn run(&self) -> Result<RunReport> {
        let series = self.run_series_stage()?;
        let candles = self.run_candle_stage()?;
        Ok(RunReport { series, candles })
    }

    /// Build and write a continuous series for every ticker folder under
    /// the input directory, then the summary table.
    pub fn run_series_stage(&self) -> Result<StageReport> {
        let input_dir = &self.config.paths.input_dir;
        require_dir(input_dir, "input")?;

        let tickers = list_tickers(input_dir)?;
        info!(tickers = tickers.len(), input = %input_dir.display(), "series stage started");

        let mut report = StageReport::default();
        let mut summaries = Vec::new();
        for ticker in &tickers {
            match self.stitch_ticker(ticker, &input_dir.join(ticker)) {
                Ok(summary) => {
                    summaries.extend(summary);
                    report.record_success(ticker);
                }
                Err(e) => self.skip(&mut report, ticker, e),
            }
        }

        if !summaries.is_empty() {
            let path = self.config.paths.series_dir.join(SUMMARY_FILE);
            write_summary(&summaries, &path, self.config.series.delimiter_byte())?;
            self.sink.emit(PipelineEvent::OutputWritten {
                path,
                rows: summaries.len(),
            });
        }

        info!(
            attempted = report.attempted(),
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            "series stage finished"
        );
        Ok(report)
    }

    fn stitch_ticker(&self, ticker: &str, ticker_dir: &Path) -> Result<Option<TickerSummary>> {
        let builder = ContinuousSeriesBuilder::new(&self.config.series, &self.sink);
        let series = builder.build(ticker, ticker_dir)?;

        let path = self.series_path(ticker);
        let rows = write_series(&series, &path, self.config.series.delimiter_byte())?;
        self.sink.emit(PipelineEvent::OutputWritten { path, rows });

        Ok(TickerSummary::from_series(&series))
    }

    /// Produce candle files for every ticker folder under the series
    /// directory.
    pub fn run_candle_stage(&self) -> Result<StageReport> {
        let series_dir = &self.config.paths.series_dir;
        require_dir(series_dir, "series")?;

        let tickers = list_tickers(series_dir)?;
        info!(tickers = tickers.len(), input = %series_dir.display(), "candle stage started");

        let mut report = StageReport::default();
        for ticker in &tickers {
            match self.candles_for_ticker(ticker, &series_dir.join(ticker)) {
                Ok(()) => report.record_success(ticker),
                Err(e) => self.skip(&mut report, ticker, e),
            }
        }

        info!(
            attempted = report.attempted(),
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            "candle stage finished"
        );
        Ok(report)
    }

    fn candles_for_ticker(&self, ticker: &str, ticker_dir: &Path) -> Result<()> {
        let file = find_series_file(ticker_dir)?;
        let points = load_series(&file, self.config.series.delimiter_byte(), &self.sink)?;

        for &timeframe in &self.config.candles.timeframes {
            let candles = aggregate(&points, timeframe);
            if candles.is_empty() {
                self.sink.emit(PipelineEvent::TimeframeEmpty {
                    ticker: ticker.to_string(),
                    timeframe,
                });
                continue;
            }

            let path = candle_path(&self.config.paths.candle_dir, ticker, timeframe);
            let rows = write_candles(&candles, timeframe, &path)?;
            self.sink.emit(PipelineEvent::CandlesBuilt {
                ticker: ticker.to_string(),
                timeframe,
                candles: rows,
            });
            self.sink.emit(PipelineEvent::OutputWritten { path, rows });
        }
        Ok(())
    }

    fn skip(&self, report: &mut StageReport, ticker: &str, error: Error) {
        let reason = error.to_string();
        self.sink.emit(PipelineEvent::InstrumentSkipped {
            ticker: ticker.to_string(),
            reason: reason.clone(),
        });
        report.record_failure(ticker, reason);
    }
}
