//! Run outcome reporting.

use serde::Serialize;

/// A ticker that was skipped, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickerFailure {
    pub ticker: String,
    pub reason: String,
}

/// Outcome of one stage over all tickers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StageReport {
    /// Tickers fully processed, in processing order.
    pub succeeded: Vec<String>,
    /// Tickers skipped.
    pub failed: Vec<TickerFailure>,
}

impl StageReport {
    pub(crate) fn record_success(&mut self, ticker: &str) {
        self.succeeded.push(ticker.to_string());
    }

    pub(crate) fn record_failure(&mut self, ticker: &str, reason: impl Into<String>) {
        self.failed.push(TickerFailure {
            ticker: ticker.to_string(),
            reason: reason.into(),
        });
    }

    /// Number of tickers attempted.
    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// Whether any ticker failed.
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Outcome of a full run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub series: StageReport,
    pub candles: StageReport,
}

impl RunReport {
    /// Whether either stage skipped a ticker.
    pub fn has_failures(&self) -> bool {
        self.series.has_failures() || self.candles.has_failures()
    }
}
