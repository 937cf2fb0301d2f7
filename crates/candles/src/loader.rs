//! Continuous-series loading for the candle stage.
//!
//! Series files carry a header row, so columns are resolved by name rather
//! than by content. Times are decoded at second resolution.

use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use tickstitch_core::{
    parse_number, parse_volume, Error, EventSink, PipelineEvent, PricePoint, Result,
};
use tickstitch_ingestion::timestamp::ensure_decodable;
use tickstitch_ingestion::{detect_named, normalize_timestamps, ColumnRole, TimeEncoding};

const BOM: char = '\u{feff}';

/// First `.csv` file (by name) inside a ticker folder of the series directory.
pub fn find_series_file(ticker_dir: &Path) -> Result<PathBuf> {
    let mut candidates: Vec<PathBuf> = std::fs::read_dir(ticker_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .map(|ext| ext.eq_ignore_ascii_case("csv"))
                    .unwrap_or(false)
        })
        .collect();
    candidates.sort();

    candidates
        .into_iter()
        .next()
        .ok_or_else(|| Error::no_files(format!("no series file in {}", ticker_dir.display())))
}

/// Load a series file into aggregation rows.
///
/// Rows whose date or time does not decode are dropped. A non-numeric price
/// is kept as `None` so its volume still counts.
pub fn load_series(path: &Path, delimiter: u8, sink: &dyn EventSink) -> Result<Vec<PricePoint>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let mut headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if let Some(first) = headers.first_mut() {
        *first = first.trim_start_matches(BOM).to_string();
    }
    let roles = detect_named(&headers)?;
    let (date_col, time_col) = roles.date_time()?;
    let price_col = roles
        .price
        .ok_or_else(|| Error::schema_undetected("no price column in header"))?;

    let resolved: Vec<String> = headers
        .iter()
        .enumerate()
        .filter_map(|(idx, name)| match roles.role_of(idx) {
            ColumnRole::Unknown => None,
            role => Some(format!("{role:?}={name}")),
        })
        .collect();
    tracing::debug!(path = %path.display(), columns = ?resolved, "series columns resolved");

    let mut dates = Vec::new();
    let mut times = Vec::new();
    let mut prices = Vec::new();
    let mut volumes = Vec::new();
    for record in reader.records() {
        let record = record?;
        let cell = |idx: usize| record.get(idx).unwrap_or("").trim().to_string();
        dates.push(cell(date_col));
        times.push(cell(time_col));
        prices.push(parse_number(&cell(price_col)));
        volumes.push(roles.volume.map(|idx| parse_volume(&cell(idx))).unwrap_or(0));
    }

    sink.emit(PipelineEvent::FileRead {
        path: path.to_path_buf(),
        delimiter: char::from(delimiter),
        strategy: "header",
        rows: dates.len(),
        columns: headers.len(),
    });

    let timestamps = normalize_timestamps(&dates, &times, TimeEncoding::Clock);
    ensure_decodable(&timestamps, &path.display().to_string())?;
    let dropped = timestamps.iter().filter(|ts| ts.is_none()).count();
    if dropped > 0 {
        tracing::debug!(path = %path.display(), dropped, "rows without a timestamp dropped");
    }

    Ok(timestamps
        .into_iter()
        .zip(prices.into_iter().zip(volumes))
        .filter_map(|(ts, (price, volume))| {
            ts.map(|timestamp| PricePoint {
                timestamp,
                price,
                volume,
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tickstitch_core::MemorySink;

    #[test]
    fn test_load_series_by_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ag.csv");
        fs::write(
            &path,
            "\u{feff}Date;Time;TradeID;LastPrice;TotalVolume\n\
             20210301;093015500;1;4500.5;3\n\
             20210301;93016000;2;n/a;4\n\
             bad;093017000;3;4501;5\n",
        )
        .unwrap();

        let sink = MemorySink::new();
        let points = load_series(&path, b';', &sink).unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].timestamp.format("%H%M%S").to_string(), "093015");
        assert_eq!(points[0].price, Some(4500.5));
        assert_eq!(points[0].volume, 3);
        assert_eq!(points[1].timestamp.format("%H%M%S").to_string(), "093016");
        assert_eq!(points[1].price, None);
        assert_eq!(points[1].volume, 4);
        assert_eq!(sink.events().len(), 1);
    }

    #[test]
    fn test_missing_volume_column_is_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ag.csv");
        fs::write(&path, "date,time,close\n20210301,90000,10\n").unwrap();

        let points = load_series(&path, b',', &MemorySink::new()).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].volume, 0);
    }

    #[test]
    fn test_missing_price_column_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ag.csv");
        fs::write(&path, "Date;Time;Qty\n20210301;90000;1\n").unwrap();

        let err = load_series(&path, b';', &MemorySink::new()).unwrap_err();
        assert!(matches!(err, Error::SchemaUndetected(_)));
    }

    #[test]
    fn test_header_only_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ag.csv");
        fs::write(&path, "Date;Time;LastPrice;TotalVolume\n").unwrap();

        let err = load_series(&path, b';', &MemorySink::new()).unwrap_err();
        assert!(matches!(err, Error::UndecodableTimestamps(_)));
    }

    #[test]
    fn test_find_series_file_picks_first_csv() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.csv"), "x").unwrap();
        fs::write(dir.path().join("a.csv"), "x").unwrap();
        fs::write(dir.path().join("0.txt"), "x").unwrap();

        let found = find_series_file(dir.path()).unwrap();
        assert!(found.ends_with("a.csv"));

        let empty = tempfile::tempdir().unwrap();
        assert!(matches!(find_series_file(empty.path()), Err(Error::NoFiles(_))));
    }
}
