//! Candle timeframes.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Seconds in one day.
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Fixed-width candle interval. Every width divides a day, so buckets
/// line up with midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Timeframe {
    Min1,
    Min5,
    Min15,
    Hour1,
    Hour4,
    Day,
}

impl Timeframe {
    /// All supported timeframes, shortest first.
    pub const ALL: [Timeframe; 6] = [
        Timeframe::Min1,
        Timeframe::Min5,
        Timeframe::Min15,
        Timeframe::Hour1,
        Timeframe::Hour4,
        Timeframe::Day,
    ];

    /// Bucket width in seconds.
    pub fn seconds(self) -> i64 {
        match self {
            Timeframe::Min1 => 60,
            Timeframe::Min5 => 5 * 60,
            Timeframe::Min15 => 15 * 60,
            Timeframe::Hour1 => 60 * 60,
            Timeframe::Hour4 => 4 * 60 * 60,
            Timeframe::Day => SECONDS_PER_DAY,
        }
    }

    /// Label used for output folders and file names.
    pub fn label(self) -> &'static str {
        match self {
            Timeframe::Min1 => "Min1",
            Timeframe::Min5 => "Min5",
            Timeframe::Min15 => "Min15",
            Timeframe::Hour1 => "Hour1",
            Timeframe::Hour4 => "Hour4",
            Timeframe::Day => "Day",
        }
    }

    /// Is this the daily timeframe?
    pub fn is_daily(self) -> bool {
        self == Timeframe::Day
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Timeframe {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "min1" | "1m" | "1min" => Ok(Timeframe::Min1),
            "min5" | "5m" | "5min" => Ok(Timeframe::Min5),
            "min15" | "15m" | "15min" => Ok(Timeframe::Min15),
            "hour1" | "1h" | "60m" => Ok(Timeframe::Hour1),
            "hour4" | "4h" | "240m" => Ok(Timeframe::Hour4),
            "day" | "1d" | "d" => Ok(Timeframe::Day),
            _ => Err(Error::UnknownTimeframe(s.to_string())),
        }
    }
}
