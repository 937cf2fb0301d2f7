//! Structured pipeline events.
//!
//! Components report what they did through an [`EventSink`] instead of
//! printing. Production code uses [`TracingSink`]; tests collect events with
//! [`MemorySink`] and assert on them.

use crate::timeframe::Timeframe;
use chrono::{NaiveDate, NaiveDateTime};
use std::path::PathBuf;
use std::sync::Mutex;

/// Something noteworthy that happened while processing a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    /// A raw file was read with the given delimiter/strategy.
    FileRead {
        path: PathBuf,
        delimiter: char,
        strategy: &'static str,
        rows: usize,
        columns: usize,
    },
    /// Date/time columns were located in a raw file.
    SchemaDetected {
        path: PathBuf,
        date_col: usize,
        time_col: usize,
    },
    /// A file was skipped; the instrument continues.
    FileSkipped { path: PathBuf, reason: String },
    /// A contract's position in rollover order.
    ContractOrdered {
        ticker: String,
        contract: String,
        expiry: Option<NaiveDate>,
        rollover_date: Option<NaiveDate>,
        files: usize,
    },
    /// A continuous series was assembled.
    SeriesBuilt {
        ticker: String,
        rows: usize,
        contracts: Vec<String>,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
        rollover_days: u32,
    },
    /// An output file was written.
    OutputWritten { path: PathBuf, rows: usize },
    /// Candles for one timeframe were produced.
    CandlesBuilt {
        ticker: String,
        timeframe: Timeframe,
        candles: usize,
    },
    /// A timeframe produced no bars; nothing was written.
    TimeframeEmpty { ticker: String, timeframe: Timeframe },
    /// An instrument failed; the batch continues.
    InstrumentSkipped { ticker: String, reason: String },
}

impl PipelineEvent {
    /// Whether the event reports a failure.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            PipelineEvent::FileSkipped { .. } | PipelineEvent::InstrumentSkipped { .. }
        )
    }
}

/// Receiver for pipeline events.
pub trait EventSink {
    /// Record one event.
    fn emit(&self, event: PipelineEvent);
}

/// Forwards events to `tracing` with structured fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: PipelineEvent) {
        match event {
            PipelineEvent::FileRead {
                path,
                delimiter,
                strategy,
                rows,
                columns,
            } => tracing::debug!(
                path = %path.display(),
                delimiter = ?delimiter,
                strategy,
                rows,
                columns,
                "file read"
            ),
            PipelineEvent::SchemaDetected {
                path,
                date_col,
                time_col,
            } => tracing::debug!(path = %path.display(), date_col, time_col, "schema detected"),
            PipelineEvent::FileSkipped { path, reason } => {
                tracing::warn!(path = %path.display(), %reason, "file skipped")
            }
            PipelineEvent::ContractOrdered {
                ticker,
                contract,
                expiry,
                rollover_date,
                files,
            } => tracing::debug!(
                %ticker,
                %contract,
                expiry = ?expiry,
                rollover_date = ?rollover_date,
                files,
                "contract ordered"
            ),
            PipelineEvent::SeriesBuilt {
                ticker,
                rows,
                contracts,
                start,
                end,
                rollover_days,
            } => tracing::info!(
                %ticker,
                rows,
                contracts = ?contracts,
                start = ?start,
                end = ?end,
                rollover_days,
                "series built"
            ),
            PipelineEvent::OutputWritten { path, rows } => {
                tracing::info!(path = %path.display(), rows, "output written")
            }
            PipelineEvent::CandlesBuilt {
                ticker,
                timeframe,
                candles,
            } => tracing::info!(%ticker, %timeframe, candles, "candles built"),
            PipelineEvent::TimeframeEmpty { ticker, timeframe } => {
                tracing::info!(%ticker, %timeframe, "no candles for timeframe")
            }
            PipelineEvent::InstrumentSkipped { ticker, reason } => {
                tracing::error!(%ticker, %reason, "instrument skipped")
            }
        }
    }
}

/// Collects events in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<PipelineEvent>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far.
    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Failure events only.
    pub fn failures(&self) -> Vec<PipelineEvent> {
        self.events().into_iter().filter(PipelineEvent::is_failure).collect()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: PipelineEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl<S: EventSink + ?Sized> EventSink for &S {
    fn emit(&self, event: PipelineEvent) {
        (**self).emit(event);
    }
}
