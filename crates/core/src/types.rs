//! Core data types for the tickstitch system.

use crate::contract::ContractCode;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Number of order-book levels carried per side.
pub const BOOK_DEPTH: usize = 5;

/// Column names of the continuous-series file, in output order.
pub const SERIES_COLUMNS: [&str; 29] = [
    "Date", "Time", "TradeID", "TradeVolume", "LastPrice", "TotalVolume", "HighPrice",
    "LowPrice", "Nanoseconds", "Bid1", "Bid2", "Bid3", "Bid4", "Bid5", "Ask1", "Ask2", "Ask3",
    "Ask4", "Ask5", "BidVol1", "BidVol2", "BidVol3", "BidVol4", "BidVol5", "AskVol1",
    "AskVol2", "AskVol3", "AskVol4", "AskVol5",
];

/// Raw columns before the passthrough block (Date, Time).
const PASSTHROUGH_OFFSET: usize = 2;

/// Parse a numeric cell, rejecting NaN and infinities.
pub fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a volume cell: non-numeric or negative values count as zero.
pub fn parse_volume(s: &str) -> u64 {
    match parse_number(s) {
        Some(v) if v > 0.0 => v.trunc() as u64,
        _ => 0,
    }
}

/// Passthrough fields of one tick, copied verbatim from the raw export.
///
/// Missing source columns are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickFields {
    pub trade_id: String,
    pub trade_volume: String,
    pub last_price: String,
    pub total_volume: String,
    pub high_price: String,
    pub low_price: String,
    pub nanoseconds: String,
    pub bids: [String; BOOK_DEPTH],
    pub asks: [String; BOOK_DEPTH],
    pub bid_volumes: [String; BOOK_DEPTH],
    pub ask_volumes: [String; BOOK_DEPTH],
}

impl TickFields {
    /// Build from a positional raw row. Raw column `k + 2` feeds passthrough
    /// field `k`; the first two positions belong to Date and Time.
    pub fn from_row(row: &[String]) -> Self {
        let cell = |idx: usize| -> String {
            row.get(idx + PASSTHROUGH_OFFSET)
                .map(|s| s.trim().to_string())
                .unwrap_or_default()
        };
        let level = |start: usize| -> [String; BOOK_DEPTH] {
            std::array::from_fn(|i| cell(start + i))
        };

        Self {
            trade_id: cell(0),
            trade_volume: cell(1),
            last_price: cell(2),
            total_volume: cell(3),
            high_price: cell(4),
            low_price: cell(5),
            nanoseconds: cell(6),
            bids: level(7),
            asks: level(7 + BOOK_DEPTH),
            bid_volumes: level(7 + 2 * BOOK_DEPTH),
            ask_volumes: level(7 + 3 * BOOK_DEPTH),
        }
    }

    /// Fields in series-file order (everything after Date and Time).
    pub fn to_record(&self) -> Vec<&str> {
        let mut out = Vec::with_capacity(SERIES_COLUMNS.len() - PASSTHROUGH_OFFSET);
        out.extend([
            self.trade_id.as_str(),
            self.trade_volume.as_str(),
            self.last_price.as_str(),
            self.total_volume.as_str(),
            self.high_price.as_str(),
            self.low_price.as_str(),
            self.nanoseconds.as_str(),
        ]);
        for side in [&self.bids, &self.asks, &self.bid_volumes, &self.ask_volumes] {
            out.extend(side.iter().map(String::as_str));
        }
        out
    }
}

/// One normalized tick of the continuous series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    /// Normalized timestamp (microsecond resolution).
    pub timestamp: NaiveDateTime,
    /// Passthrough fields.
    pub fields: TickFields,
}

impl Tick {
    /// Last traded price, if numeric.
    #[inline]
    pub fn price(&self) -> Option<f64> {
        parse_number(&self.fields.last_price)
    }

    /// Cumulative volume column, zero when absent or non-numeric.
    #[inline]
    pub fn volume(&self) -> u64 {
        parse_volume(&self.fields.total_volume)
    }

    /// Reduce to the aggregator's input row.
    pub fn to_price_point(&self) -> PricePoint {
        PricePoint {
            timestamp: self.timestamp,
            price: self.price(),
            volume: self.volume(),
        }
    }
}

/// Timestamp-ordered tick stream stitched from one ticker's contracts.
#[derive(Debug, Clone, Default)]
pub struct ContinuousSeries {
    /// Ticker (instrument folder name).
    pub ticker: String,
    /// Ticks in non-decreasing timestamp order.
    pub ticks: Vec<Tick>,
    /// Contracts that contributed at least one file.
    pub contracts: BTreeSet<ContractCode>,
}

impl ContinuousSeries {
    /// Number of ticks.
    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    /// Whether the series holds no ticks.
    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    /// First timestamp.
    pub fn start(&self) -> Option<NaiveDateTime> {
        self.ticks.first().map(|t| t.timestamp)
    }

    /// Last timestamp.
    pub fn end(&self) -> Option<NaiveDateTime> {
        self.ticks.last().map(|t| t.timestamp)
    }

    /// Price points for aggregation.
    pub fn price_points(&self) -> Vec<PricePoint> {
        self.ticks.iter().map(Tick::to_price_point).collect()
    }
}

/// A single aggregation input row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Row timestamp.
    pub timestamp: NaiveDateTime,
    /// Price, if the source value was numeric.
    pub price: Option<f64>,
    /// Volume (non-negative).
    pub volume: u64,
}

/// OHLCV bar for one time bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Left edge of the bucket.
    pub bucket_start: NaiveDateTime,
    /// Open price.
    pub open: f64,
    /// High price.
    pub high: f64,
    /// Low price.
    pub low: f64,
    /// Close price.
    pub close: f64,
    /// Total volume.
    pub volume: u64,
    /// Open interest (not tracked, always zero).
    pub open_interest: u64,
}

/// Per-ticker row of the summary table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerSummary {
    pub ticker: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub rows: usize,
    pub contracts: usize,
}

impl TickerSummary {
    /// Summarize a non-empty series.
    pub fn from_series(series: &ContinuousSeries) -> Option<Self> {
        Some(Self {
            ticker: series.ticker.clone(),
            start: series.start()?,
            end: series.end()?,
            rows: series.len(),
            contracts: series.contracts.len(),
        })
    }
}
