//! Series and summary file writers.

use std::fs;
use std::path::Path;

use chrono::NaiveDateTime;
use csv::WriterBuilder;
use tickstitch_core::{ContinuousSeries, Result, TickerSummary, SERIES_COLUMNS};

/// Header of the summary table.
pub const SUMMARY_COLUMNS: [&str; 5] = ["Ticker", "StartDate", "EndDate", "Rows", "Contracts"];

/// `YYYYMMDD`.
pub fn format_series_date(ts: &NaiveDateTime) -> String {
    ts.format("%Y%m%d").to_string()
}

/// `HHMMSSmmm`.
pub fn format_series_time(ts: &NaiveDateTime) -> String {
    ts.format("%H%M%S%3f").to_string()
}

fn format_summary_timestamp(ts: &NaiveDateTime) -> String {
    ts.format("%Y-%m-%d %H:%M:%S%.f").to_string()
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Write the 29-column series file with a header row. Returns rows written.
pub fn write_series(series: &ContinuousSeries, path: &Path, delimiter: u8) -> Result<usize> {
    ensure_parent(path)?;
    let mut writer = WriterBuilder::new().delimiter(delimiter).from_path(path)?;
    writer.write_record(SERIES_COLUMNS)?;

    for tick in &series.ticks {
        let date = format_series_date(&tick.timestamp);
        let time = format_series_time(&tick.timestamp);
        let mut record = Vec::with_capacity(SERIES_COLUMNS.len());
        record.push(date.as_str());
        record.push(time.as_str());
        record.extend(tick.fields.to_record());
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(series.len())
}

/// Write the per-ticker summary table.
pub fn write_summary(summaries: &[TickerSummary], path: &Path, delimiter: u8) -> Result<()> {
    ensure_parent(path)?;
    let mut writer = WriterBuilder::new().delimiter(delimiter).from_path(path)?;
    writer.write_record(SUMMARY_COLUMNS)?;

    for s in summaries {
        writer.write_record([
            s.ticker.clone(),
            format_summary_timestamp(&s.start),
            format_summary_timestamp(&s.end),
            s.rows.to_string(),
            s.contracts.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
