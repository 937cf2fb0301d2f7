//! Candle generation for the tickstitch system.
//!
//! This crate handles:
//! - Loading written continuous-series files by header name
//! - Time-bucketed OHLCV aggregation per timeframe
//! - Writing candle text files

pub mod aggregator;
pub mod formatter;
pub mod loader;

pub use aggregator::{aggregate, bucket_start, CandleAggregator};
pub use formatter::{candle_path, write_candles};
pub use loader::{find_series_file, load_series};
