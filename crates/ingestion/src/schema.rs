//! Column-role detection.
//!
//! Raw exports carry no header, so the date and time columns are found by
//! sniffing content (positional mode). Written series files carry a header,
//! so price and volume are found by name (named mode).

use std::sync::LazyLock;

use regex::Regex;
use tickstitch_core::{Error, Result};

use crate::reader::RawTable;

macro_rules! re {
    ($pat:expr) => {
        LazyLock::new(|| Regex::new($pat).expect("static regex"))
    };
}

static DATE_LIKE: LazyLock<Regex> = re!(r"^[0-9]{6,8}$");
static STRICT_DATE: LazyLock<Regex> = re!(r"^[0-9]{8}$");
static TIME_LIKE: LazyLock<Regex> = re!(r"^[0-9]{1,9}$");

/// Fraction of a column's rows that must match for the column to qualify.
pub const DETECTION_THRESHOLD: f64 = 0.3;

/// Adjacent date/time pairs are only searched among the first columns.
pub const PAIR_SCAN_LIMIT: usize = 6;

/// Price column names, highest precedence first.
pub const PRICE_SYNONYMS: [&str; 7] = [
    "lastprice",
    "last_price",
    "last",
    "price",
    "tradeprice",
    "trade_price",
    "close",
];

/// Volume column names, highest precedence first.
pub const VOLUME_SYNONYMS: [&str; 6] = [
    "totalvolume",
    "total_volume",
    "volume",
    "qty",
    "quantity",
    "vol",
];

/// Role a column plays in a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnRole {
    Date,
    Time,
    Price,
    Volume,
    Unknown,
}

/// Resolved column index per role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnRoles {
    pub date: Option<usize>,
    pub time: Option<usize>,
    pub price: Option<usize>,
    pub volume: Option<usize>,
}

impl ColumnRoles {
    /// Column index for a role.
    pub fn index(&self, role: ColumnRole) -> Option<usize> {
        match role {
            ColumnRole::Date => self.date,
            ColumnRole::Time => self.time,
            ColumnRole::Price => self.price,
            ColumnRole::Volume => self.volume,
            ColumnRole::Unknown => None,
        }
    }

    /// Role of a column index.
    pub fn role_of(&self, idx: usize) -> ColumnRole {
        [
            ColumnRole::Date,
            ColumnRole::Time,
            ColumnRole::Price,
            ColumnRole::Volume,
        ]
        .into_iter()
        .find(|&role| self.index(role) == Some(idx))
        .unwrap_or(ColumnRole::Unknown)
    }

    /// Date and time indices, failing if either is missing.
    pub fn date_time(&self) -> Result<(usize, usize)> {
        match (self.date, self.time) {
            (Some(d), Some(t)) => Ok((d, t)),
            _ => Err(Error::schema_undetected("date/time columns not resolved")),
        }
    }
}

/// Looks like a date: 6 to 8 digits.
pub fn is_date_like(value: &str) -> bool {
    DATE_LIKE.is_match(value)
}

/// Strict YYYYMMDD shape: exactly 8 digits.
pub fn is_strict_date(value: &str) -> bool {
    STRICT_DATE.is_match(value)
}

/// Looks like a time: 1 to 9 digits.
pub fn is_time_like(value: &str) -> bool {
    TIME_LIKE.is_match(value)
}

/// Matches needed out of `total` rows: `max(1, floor(total * threshold))`.
pub fn required_matches(total: usize) -> usize {
    ((total as f64 * DETECTION_THRESHOLD).floor() as usize).max(1)
}

/// Whether enough of `values` satisfy `predicate`.
pub fn column_qualifies<'a>(
    values: impl IntoIterator<Item = &'a str>,
    predicate: impl Fn(&str) -> bool,
) -> bool {
    let mut total = 0usize;
    let mut hits = 0usize;
    for value in values {
        total += 1;
        if predicate(value.trim()) {
            hits += 1;
        }
    }
    hits >= required_matches(total)
}

/// Locate date and time columns in a headerless table.
///
/// The first adjacent (date-like, time-like) pair wins. Without one, the
/// first strict 8-digit date column and the first other time-like column are
/// used.
pub fn detect_positional(table: &RawTable) -> Result<ColumnRoles> {
    let ncols = table.columns;
    if ncols < 2 {
        return Err(Error::schema_undetected(format!(
            "need at least 2 columns, found {ncols}"
        )));
    }

    for i in 0..PAIR_SCAN_LIMIT.min(ncols - 1) {
        if column_qualifies(table.column(i), is_date_like)
            && column_qualifies(table.column(i + 1), is_time_like)
        {
            return Ok(ColumnRoles {
                date: Some(i),
                time: Some(i + 1),
                ..Default::default()
            });
        }
    }

    let scan = PAIR_SCAN_LIMIT.min(ncols);
    let date = (0..scan).find(|&i| column_qualifies(table.column(i), is_strict_date));
    let time = (0..scan)
        .filter(|&j| Some(j) != date)
        .find(|&j| column_qualifies(table.column(j), is_time_like));

    match (date, time) {
        (Some(_), Some(_)) => Ok(ColumnRoles {
            date,
            time,
            ..Default::default()
        }),
        _ => Err(Error::schema_undetected(format!(
            "no date/time columns among first {scan} (sep {:?}, {})",
            table.attempt.delimiter_char(),
            table.attempt.strategy.as_str()
        ))),
    }
}

/// Locate columns in a header-bearing table by name.
///
/// Date and time are the first headers containing "date" and "time". Price
/// is required; a missing volume column is left as `None` and treated as
/// zero volume downstream.
pub fn detect_named<S: AsRef<str>>(headers: &[S]) -> Result<ColumnRoles> {
    let lowered: Vec<String> = headers
        .iter()
        .map(|h| h.as_ref().trim().to_lowercase())
        .collect();

    let find_exact = |candidates: &[&str]| {
        candidates
            .iter()
            .find_map(|c| lowered.iter().position(|h| h == c))
    };

    let date = lowered.iter().position(|h| h.contains("date"));
    let time = lowered
        .iter()
        .enumerate()
        .position(|(i, h)| Some(i) != date && h.contains("time"));

    if date.is_none() || time.is_none() {
        return Err(Error::schema_undetected("no Date/Time columns in header"));
    }

    let price = find_exact(&PRICE_SYNONYMS)
        .ok_or_else(|| Error::schema_undetected("no price column in header"))?;
    let volume = find_exact(&VOLUME_SYNONYMS);

    Ok(ColumnRoles {
        date,
        time,
        price: Some(price),
        volume,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::{ParseStrategy, ReadAttempt};

    fn table(rows: &[&[&str]]) -> RawTable {
        let rows: Vec<Vec<String>> = rows
            .iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect();
        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        RawTable {
            rows,
            columns,
            attempt: ReadAttempt::new(b',', ParseStrategy::Strict),
        }
    }

    #[test]
    fn test_required_matches() {
        assert_eq!(required_matches(0), 1);
        assert_eq!(required_matches(3), 1);
        assert_eq!(required_matches(10), 3);
        assert_eq!(required_matches(99), 29);
    }

    #[test]
    fn test_patterns() {
        assert!(is_date_like("210104"));
        assert!(is_date_like("20210104"));
        assert!(!is_date_like("2021-01-04"));
        assert!(is_strict_date("20210104"));
        assert!(!is_strict_date("210104"));
        assert!(is_time_like("93015"));
        assert!(is_time_like("093015500"));
        assert!(!is_time_like("0930155001"));
        assert!(!is_time_like("09:30:15"));
    }

    #[test]
    fn test_adjacent_pair_leading() {
        let t = table(&[
            &["20210104", "90000", "4512"],
            &["20210104", "90001", "4513"],
        ]);
        let roles = detect_positional(&t).unwrap();
        assert_eq!(roles.date_time().unwrap(), (0, 1));
        assert_eq!(roles.role_of(1), ColumnRole::Time);
        assert_eq!(roles.role_of(2), ColumnRole::Unknown);
    }

    #[test]
    fn test_adjacent_pair_after_text_columns() {
        let t = table(&[
            &["ag2103", "x", "20210104", "90000500", "4512"],
            &["ag2103", "x", "20210104", "90001000", "4513"],
        ]);
        let roles = detect_positional(&t).unwrap();
        assert_eq!(roles.date_time().unwrap(), (2, 3));
    }

    #[test]
    fn test_fallback_non_adjacent() {
        let t = table(&[
            &["20210104", "ag", "90000", "4512.5"],
            &["20210104", "ag", "90001", "4513.5"],
        ]);
        let roles = detect_positional(&t).unwrap();
        assert_eq!(roles.date, Some(0));
        assert_eq!(roles.time, Some(2));
    }

    #[test]
    fn test_threshold_tolerates_noise() {
        // 3 of 10 rows is exactly the threshold
        let mut rows: Vec<Vec<&str>> = vec![vec!["junk", "junk"]; 7];
        rows.extend(vec![vec!["20210104", "90000"]; 3]);
        let refs: Vec<&[&str]> = rows.iter().map(|r| r.as_slice()).collect();
        let roles = detect_positional(&table(&refs)).unwrap();
        assert_eq!(roles.date_time().unwrap(), (0, 1));
    }

    #[test]
    fn test_rejects_single_column() {
        let t = table(&[&["20210104"], &["20210105"]]);
        assert!(matches!(detect_positional(&t), Err(Error::SchemaUndetected(_))));
    }

    #[test]
    fn test_rejects_without_date() {
        let t = table(&[&["abc", "def"], &["ghi", "jkl"]]);
        assert!(matches!(detect_positional(&t), Err(Error::SchemaUndetected(_))));
    }

    #[test]
    fn test_named_synonym_precedence() {
        let headers = ["Date", "Time", "Close", "LastPrice", "Qty", "TotalVolume"];
        let roles = detect_named(&headers).unwrap();
        assert_eq!(roles.date, Some(0));
        assert_eq!(roles.time, Some(1));
        assert_eq!(roles.price, Some(3));
        assert_eq!(roles.volume, Some(5));
    }

    #[test]
    fn test_named_case_insensitive_and_missing_volume() {
        let headers = ["trade_date", "TRADE_TIME", "PRICE"];
        let roles = detect_named(&headers).unwrap();
        assert_eq!(roles.date, Some(0));
        assert_eq!(roles.time, Some(1));
        assert_eq!(roles.price, Some(2));
        assert_eq!(roles.volume, None);
    }

    #[test]
    fn test_named_rejects_missing_price() {
        let headers = ["Date", "Time", "TotalVolume"];
        assert!(matches!(detect_named(&headers), Err(Error::SchemaUndetected(_))));
    }
}
