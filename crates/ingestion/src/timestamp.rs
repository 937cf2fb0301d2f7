//! Date/time normalization.
//!
//! Dates are brought to `YYYYMMDD`. Times come in two encodings:
//! raw exports may carry `HHMMSS` or `HHMMSSmmm` in one digit run, while the
//! candle stage sees whatever a spreadsheet or earlier tool left behind
//! (lost leading zeros, float suffixes such as `93015.0`).

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use tickstitch_core::{Error, Result};

use crate::schema::{is_strict_date, required_matches};

/// General calendar formats tried when a column is not mostly `YYYYMMDD`.
/// Month-first wins over day-first for slash dates.
const DATE_FORMATS: [&str; 10] = [
    "%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%m/%d/%Y", "%d/%m/%Y", "%m-%d-%Y", "%d.%m.%Y",
    "%Y%m%d", "%y%m%d", "%d-%b-%Y",
];

/// Digits in the series file's `HHMMSSmmm` time column.
pub const MILLI_TIME_DIGITS: usize = 9;

/// How a time column is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeEncoding {
    /// Raw exports: `HHMMSS`, or `HHMMSS` + milliseconds when longer than 6 digits.
    MilliAware,
    /// Loaded series files: second resolution, tolerant of float artifacts.
    Clock,
}

/// Normalize a date column to `YYYYMMDD` strings.
///
/// When at least 30% of the non-empty values are already 8-digit dates the
/// column is taken as canonical and other values become `None`; otherwise
/// every value is parsed as a general calendar date.
pub fn normalize_dates<S: AsRef<str>>(values: &[S]) -> Vec<Option<String>> {
    let trimmed: Vec<&str> = values.iter().map(|v| v.as_ref().trim()).collect();
    let non_empty = trimmed.iter().filter(|v| !v.is_empty()).count();
    let canonical = trimmed.iter().filter(|v| is_strict_date(v)).count();

    if canonical >= required_matches(non_empty) {
        return trimmed
            .iter()
            .map(|v| is_strict_date(v).then(|| v.to_string()))
            .collect();
    }

    trimmed
        .iter()
        .map(|v| parse_calendar_date(v).map(|d| d.format("%Y%m%d").to_string()))
        .collect()
}

/// Parse a date in any of the supported calendar formats. A trailing time
/// part (`2021-01-04 09:00:00`, `2021-01-04T09:00:00`) is ignored.
pub fn parse_calendar_date(value: &str) -> Option<NaiveDate> {
    let head = value.trim().split([' ', 'T']).next()?;
    if head.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(head, fmt).ok())
}

fn pad_rightmost_six(digits: &str) -> String {
    let tail = &digits[digits.len().saturating_sub(6)..];
    format!("{tail:0>6}")
}

/// Drop a float suffix such as `.0` or `.000` left by spreadsheet exports.
fn strip_float_suffix(value: &str) -> &str {
    match value.rsplit_once('.') {
        Some((head, frac)) if !frac.is_empty() && frac.bytes().all(|b| b == b'0') => head,
        _ => value,
    }
}

/// Candle-stage time: `HHMMSS`.
///
/// A float suffix (`.0`) is removed, then non-digits are dropped. An 8- or
/// 9-digit value is `HHMMSSmmm` (leading zero possibly lost) and yields its
/// clock part. Otherwise the rightmost six digits are used, left-padded. If
/// that is no valid clock time, trailing zeros are stripped once more, but
/// only a 5- or 6-digit remainder is accepted. Anything else is returned
/// unchanged and fails to parse downstream.
pub fn candle_time(raw: &str) -> String {
    let digits: String = strip_float_suffix(raw.trim())
        .chars()
        .filter(char::is_ascii_digit)
        .collect();
    if digits.is_empty() {
        return String::new();
    }

    if digits.len() == MILLI_TIME_DIGITS || digits.len() == MILLI_TIME_DIGITS - 1 {
        let padded = format!("{digits:0>9}");
        let clock = padded[..6].to_string();
        if parse_hhmmss(&clock).is_some() {
            return clock;
        }
    }

    let primary = pad_rightmost_six(&digits);
    if parse_hhmmss(&primary).is_some() {
        return primary;
    }

    let stripped = digits.trim_end_matches('0');
    if (5..=6).contains(&stripped.len()) {
        let fallback = pad_rightmost_six(stripped);
        if parse_hhmmss(&fallback).is_some() {
            return fallback;
        }
    }
    primary
}

/// Raw-export time: `(HHMMSS, microseconds)`.
///
/// The first digit run is used. More than 6 digits means `HHMMSS` followed
/// by 3 millisecond digits (left-padded to 9, extra digits dropped).
pub fn milli_time(raw: &str) -> Option<(String, u32)> {
    let digits: String = raw
        .trim()
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();

    match digits.len() {
        0 => None,
        1..=6 => Some((format!("{digits:0>6}"), 0)),
        _ => {
            let padded = format!("{digits:0>9}");
            let millis: u32 = padded[6..9].parse().ok()?;
            Some((padded[..6].to_string(), millis * 1_000))
        }
    }
}

fn two_digits(s: &str, at: usize) -> Option<u32> {
    s.get(at..at + 2)?.parse().ok()
}

fn parse_hhmmss(hhmmss: &str) -> Option<NaiveTime> {
    if hhmmss.len() != 6 || !hhmmss.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveTime::from_hms_opt(
        two_digits(hhmmss, 0)?,
        two_digits(hhmmss, 2)?,
        two_digits(hhmmss, 4)?,
    )
}

/// Strict fixed-width combination of `YYYYMMDD` and `HHMMSS` plus microseconds.
pub fn combine(date: &str, hhmmss: &str, micros: u32) -> Option<NaiveDateTime> {
    if date.len() != 8 || !date.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let day = NaiveDate::from_ymd_opt(
        date[..4].parse().ok()?,
        two_digits(date, 4)?,
        two_digits(date, 6)?,
    )?;
    let clock = parse_hhmmss(hhmmss)?;
    let time = clock.with_nanosecond(micros.checked_mul(1_000)?)?;
    Some(day.and_time(time))
}

/// Normalize parallel date and time columns into timestamps.
///
/// Rows that fail strict parsing are `None`.
pub fn normalize_timestamps<D, T>(
    dates: &[D],
    times: &[T],
    encoding: TimeEncoding,
) -> Vec<Option<NaiveDateTime>>
where
    D: AsRef<str>,
    T: AsRef<str>,
{
    let dates = normalize_dates(dates);
    dates
        .iter()
        .zip(times)
        .map(|(date, time)| {
            let date = date.as_deref()?;
            match encoding {
                TimeEncoding::MilliAware => {
                    let (hhmmss, micros) = milli_time(time.as_ref())?;
                    combine(date, &hhmmss, micros)
                }
                TimeEncoding::Clock => combine(date, &candle_time(time.as_ref()), 0),
            }
        })
        .collect()
}

/// Reject a column set in which nothing decoded.
pub fn ensure_decodable(timestamps: &[Option<NaiveDateTime>], what: &str) -> Result<()> {
    if timestamps.iter().any(Option::is_some) {
        Ok(())
    } else {
        Err(Error::undecodable_timestamps(what.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32, us: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_micro_opt(h, mi, s, us)
            .unwrap()
    }

    #[test]
    fn test_canonical_dates_unchanged() {
        let dates = ["20210104", "20210105", "20211231"];
        let out = normalize_dates(&dates);
        let expected: Vec<Option<String>> = dates.iter().map(|d| Some(d.to_string())).collect();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_canonical_column_nulls_outliers() {
        let out = normalize_dates(&["20210104", "2021-01-05", ""]);
        assert_eq!(out, vec![Some("20210104".to_string()), None, None]);
    }

    #[test]
    fn test_general_dates_reformatted() {
        let out = normalize_dates(&["2021-01-04", "01/05/2021", "06.01.2021", "garbage"]);
        assert_eq!(
            out,
            vec![
                Some("20210104".to_string()),
                Some("20210105".to_string()),
                Some("20210106".to_string()),
                None,
            ]
        );
    }

    #[test]
    fn test_six_digit_dates_parse_as_yymmdd() {
        let out = normalize_dates(&["210104", "210105"]);
        assert_eq!(out[0].as_deref(), Some("20210104"));
    }

    #[test]
    fn test_datetime_strings() {
        assert_eq!(
            parse_calendar_date("2021-01-04 09:00:00"),
            NaiveDate::from_ymd_opt(2021, 1, 4)
        );
        assert_eq!(
            parse_calendar_date("2021-01-04T09:00:00"),
            NaiveDate::from_ymd_opt(2021, 1, 4)
        );
    }

    #[test]
    fn test_candle_time_padding() {
        assert_eq!(candle_time("93015"), "093015");
        assert_eq!(candle_time("093015"), "093015");
        assert_eq!(candle_time("9:30:15"), "093015");
    }

    #[test]
    fn test_candle_time_float_artifact() {
        assert_eq!(candle_time("930150.0"), "093015");
        assert_eq!(candle_time("93015.0"), "093015");
        assert_eq!(candle_time("143000.0"), "143000");
        assert_eq!(candle_time("93000.0"), "093000");
        assert_eq!(candle_time("93000.000"), "093000");
    }

    #[test]
    fn test_candle_time_never_shifts_to_another_clock() {
        // 14:30:00 with the decimal point lost must not become 00:01:43.
        assert_ne!(candle_time("1430000"), "000143");
        assert!(combine("20210301", &candle_time("1430000"), 0).is_none());

        let decoded = normalize_timestamps(&["20210301"], &["143000.0"], TimeEncoding::Clock);
        assert_eq!(decoded, vec![Some(ts(2021, 3, 1, 14, 30, 0, 0))]);
    }

    #[test]
    fn test_candle_time_series_millis() {
        assert_eq!(candle_time("093015123"), "093015");
        assert_eq!(candle_time("93015123"), "093015");
        assert_eq!(candle_time("140000000"), "140000");
    }

    #[test]
    fn test_candle_time_keeps_round_times() {
        assert_eq!(candle_time("093000"), "093000");
        assert_eq!(candle_time("100000"), "100000");
    }

    #[test]
    fn test_milli_time() {
        assert_eq!(milli_time("93015"), Some(("093015".to_string(), 0)));
        assert_eq!(milli_time("93015500"), Some(("093015".to_string(), 500_000)));
        assert_eq!(milli_time("093015500"), Some(("093015".to_string(), 500_000)));
        assert_eq!(milli_time("t=93015"), Some(("093015".to_string(), 0)));
        assert_eq!(milli_time(""), None);
    }

    #[test]
    fn test_combine_rejects_invalid() {
        assert!(combine("20210104", "246000", 0).is_none());
        assert!(combine("20211304", "093000", 0).is_none());
        assert!(combine("2021014", "093000", 0).is_none());
        assert_eq!(
            combine("20210104", "093015", 500_000),
            Some(ts(2021, 1, 4, 9, 30, 15, 500_000))
        );
    }

    #[test]
    fn test_normalize_timestamps_encodings() {
        let dates = ["20210104", "20210104", "bad"];
        let times = ["93015500", "93016", "93017"];

        let milli = normalize_timestamps(&dates, &times, TimeEncoding::MilliAware);
        assert_eq!(
            milli,
            vec![
                Some(ts(2021, 1, 4, 9, 30, 15, 500_000)),
                Some(ts(2021, 1, 4, 9, 30, 16, 0)),
                None,
            ]
        );

        let clock = normalize_timestamps(&dates, &["093015500", "93016", "93017"], TimeEncoding::Clock);
        assert_eq!(clock[0], Some(ts(2021, 1, 4, 9, 30, 15, 0)));
        assert_eq!(clock[2], None);
    }

    #[test]
    fn test_ensure_decodable() {
        assert!(ensure_decodable(&[None, Some(ts(2021, 1, 4, 0, 0, 0, 0))], "f").is_ok());
        assert!(matches!(
            ensure_decodable(&[None, None], "f"),
            Err(Error::UndecodableTimestamps(_))
        ));
    }
}
