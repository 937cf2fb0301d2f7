//! Configuration structures for the tickstitch system.

use crate::error::{Error, Result};
use crate::timeframe::Timeframe;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration for a batch run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input/output locations.
    pub paths: PathsConfig,
    /// Series assembly configuration.
    pub series: SeriesConfig,
    /// Candle generation configuration.
    pub candles: CandleConfig,
}

impl Config {
    /// Load from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Config = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<()> {
        if !self.series.delimiter.is_ascii() {
            return Err(Error::config(format!(
                "series delimiter must be ASCII, got {:?}",
                self.series.delimiter
            )));
        }
        if self.series.sessions.is_empty() {
            return Err(Error::config("at least one session folder is required"));
        }
        if self.candles.timeframes.is_empty() {
            return Err(Error::config("at least one timeframe is required"));
        }
        Ok(())
    }
}

/// Directory layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Root with one folder per ticker, each holding session folders.
    pub input_dir: PathBuf,
    /// Where continuous-series files and the summary are written.
    pub series_dir: PathBuf,
    /// Where candle files are written.
    pub candle_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("data/tickers"),
            series_dir: PathBuf::from("data/glued"),
            candle_dir: PathBuf::from("data/candles"),
        }
    }
}

/// Continuous-series assembly configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeriesConfig {
    /// Nominal days before expiry to switch contracts. Reported with each
    /// contract; no data is trimmed on it.
    pub rollover_days: u32,
    /// Session folder names, matched case-insensitively.
    pub sessions: Vec<String>,
    /// Extension of raw contract files, matched case-insensitively.
    pub file_extension: String,
    /// Delimiter of the written series and summary files.
    pub delimiter: char,
}

impl SeriesConfig {
    /// Delimiter as a byte for the csv writer/reader.
    pub fn delimiter_byte(&self) -> u8 {
        u8::try_from(self.delimiter).unwrap_or(b';')
    }
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            rollover_days: 5,
            sessions: vec!["DAY".to_string(), "NIGHT".to_string()],
            file_extension: "csv".to_string(),
            delimiter: ';',
        }
    }
}

/// Candle generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CandleConfig {
    /// Timeframes to produce, in order.
    pub timeframes: Vec<Timeframe>,
}

impl Default for CandleConfig {
    fn default() -> Self {
        Self {
            timeframes: Timeframe::ALL.to_vec(),
        }
    }
}
