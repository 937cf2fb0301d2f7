//! Batch orchestration for the tickstitch system.
//!
//! Runs the series stage (raw contract files to continuous series) and the
//! candle stage (series to OHLCV text files) over every ticker, isolating
//! per-ticker failures.

pub mod report;
pub mod runner;

pub use report::{RunReport, StageReport, TickerFailure};
pub use runner::{Pipeline, SUMMARY_FILE};
