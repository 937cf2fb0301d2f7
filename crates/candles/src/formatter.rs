//! Candle text output.
//!
//! One bar per line, no header:
//! `YYYYMMDD,HHMMSS,open,high,low,close,volume,open_interest`.
//! Prices carry two decimals; daily bars use `000000` as the time.

use std::fs;
use std::path::{Path, PathBuf};

use csv::WriterBuilder;
use tickstitch_core::{Candle, Result, Timeframe};

const DAILY_TIME: &str = "000000";

/// `<root>/<ticker>/<Label>/<ticker>_<Label>.txt`.
pub fn candle_path(root: &Path, ticker: &str, timeframe: Timeframe) -> PathBuf {
    let label = timeframe.label();
    root.join(ticker)
        .join(label)
        .join(format!("{ticker}_{label}.txt"))
}

fn candle_record(candle: &Candle, timeframe: Timeframe) -> [String; 8] {
    let time = if timeframe.is_daily() {
        DAILY_TIME.to_string()
    } else {
        candle.bucket_start.format("%H%M%S").to_string()
    };
    [
        candle.bucket_start.format("%Y%m%d").to_string(),
        time,
        format!("{:.2}", candle.open),
        format!("{:.2}", candle.high),
        format!("{:.2}", candle.low),
        format!("{:.2}", candle.close),
        candle.volume.to_string(),
        candle.open_interest.to_string(),
    ]
}

/// Write candles to `path`, replacing any existing file. An empty slice
/// produces an empty file. Returns the number of lines written.
pub fn write_candles(candles: &[Candle], timeframe: Timeframe, path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    for candle in candles {
        writer.write_record(candle_record(candle, timeframe))?;
    }
    writer.flush()?;

    Ok(candles.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 3, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn make_candle(start: NaiveDateTime) -> Candle {
        Candle {
            bucket_start: start,
            open: 100.0,
            high: 105.0,
            low: 99.5,
            close: 104.126,
            volume: 42,
            open_interest: 0,
        }
    }

    #[test]
    fn test_candle_path() {
        let path = candle_path(Path::new("out"), "ag", Timeframe::Min5);
        assert_eq!(path, Path::new("out/ag/Min5/ag_Min5.txt"));
    }

    #[test]
    fn test_intraday_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ag/Min1/ag_Min1.txt");
        assert_eq!(write_candles(&[make_candle(at(9, 5))], Timeframe::Min1, &path).unwrap(), 1);

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "20210301,090500,100.00,105.00,99.50,104.13,42,0\n");
    }

    #[test]
    fn test_daily_line_uses_midnight() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ag_Day.txt");
        write_candles(&[make_candle(at(0, 0))], Timeframe::Day, &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let fields: Vec<&str> = text.trim_end().split(',').collect();
        assert_eq!(fields.len(), 8);
        assert_eq!(fields[1], "000000");
        assert_relative_eq!(fields[5].parse::<f64>().unwrap(), 104.13);
    }

    #[test]
    fn test_empty_input_writes_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ag_Hour1.txt");
        fs::write(&path, "stale").unwrap();

        assert_eq!(write_candles(&[], Timeframe::Hour1, &path).unwrap(), 0);
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }
}
