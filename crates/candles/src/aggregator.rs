//! Time-bucketed OHLCV aggregation.
//!
//! Buckets are left-closed and aligned to midnight. Rows without a numeric
//! price still contribute volume; buckets that never saw a price are dropped.

use std::collections::BTreeMap;

use chrono::{NaiveDateTime, NaiveTime, Timelike};
use tickstitch_core::{Candle, PricePoint, Timeframe};

/// Left edge of the bucket containing `ts`.
pub fn bucket_start(ts: NaiveDateTime, timeframe: Timeframe) -> NaiveDateTime {
    let width = timeframe.seconds() as u32;
    let secs = ts.num_seconds_from_midnight() / width * width;
    let time = NaiveTime::from_num_seconds_from_midnight_opt(secs, 0).unwrap_or(NaiveTime::MIN);
    ts.date().and_time(time)
}

/// Builder for candles of one timeframe.
pub struct CandleAggregator {
    timeframe: Timeframe,
    /// Buckets being built, keyed by bucket start.
    buckets: BTreeMap<NaiveDateTime, BucketInProgress>,
}

/// A bucket that's currently being built.
#[derive(Debug, Clone)]
struct BucketInProgress {
    bucket_start: NaiveDateTime,
    open: Option<f64>,
    high: f64,
    low: f64,
    close: f64,
    volume: u64,
}

impl BucketInProgress {
    fn new(bucket_start: NaiveDateTime) -> Self {
        Self {
            bucket_start,
            open: None,
            high: f64::NEG_INFINITY,
            low: f64::INFINITY,
            close: 0.0,
            volume: 0,
        }
    }

    fn add_point(&mut self, price: Option<f64>, volume: u64) {
        self.volume = self.volume.saturating_add(volume);
        let Some(price) = price else {
            return;
        };
        if self.open.is_none() {
            self.open = Some(price);
        }
        self.high = self.high.max(price);
        self.low = self.low.min(price);
        self.close = price;
    }

    fn to_candle(&self) -> Option<Candle> {
        let open = self.open?;

        Some(Candle {
            bucket_start: self.bucket_start,
            open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
            open_interest: 0,
        })
    }
}

impl CandleAggregator {
    /// Create an aggregator for one timeframe.
    pub fn new(timeframe: Timeframe) -> Self {
        Self {
            timeframe,
            buckets: BTreeMap::new(),
        }
    }

    /// Add one point. Points of a bucket must arrive in timestamp order.
    pub fn add_point(&mut self, point: &PricePoint) {
        let start = bucket_start(point.timestamp, self.timeframe);
        self.buckets
            .entry(start)
            .or_insert_with(|| BucketInProgress::new(start))
            .add_point(point.price, point.volume);
    }

    /// Add multiple points.
    pub fn add_points(&mut self, points: &[PricePoint]) {
        for point in points {
            self.add_point(point);
        }
    }

    /// Finalize all buckets, ascending. Buckets without a price are omitted.
    pub fn finish(self) -> Vec<Candle> {
        self.buckets
            .values()
            .filter_map(BucketInProgress::to_candle)
            .collect()
    }
}

/// Aggregate points into candles. Input order does not matter; equal
/// timestamps keep their relative order.
pub fn aggregate(points: &[PricePoint], timeframe: Timeframe) -> Vec<Candle> {
    let mut sorted = points.to_vec();
    sorted.sort_by_key(|p| p.timestamp);

    let mut aggregator = CandleAggregator::new(timeframe);
    aggregator.add_points(&sorted);
    aggregator.finish()
}
