//! Raw export reading with delimiter sniffing.
//!
//! Exports arrive comma-, semicolon-, tab- or pipe-separated, sometimes with
//! ragged rows or stray non-UTF-8 bytes. Each delimiter is tried with a strict
//! parse first and a lenient parse second; the first table with more than one
//! column wins.

use std::fmt;
use std::path::Path;

use csv::ReaderBuilder;
use tickstitch_core::{Error, Result};

/// Delimiters in the order they are tried.
pub const DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

/// How tolerant a single parse attempt is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStrategy {
    /// Equal field counts and valid UTF-8 required.
    Strict,
    /// Ragged rows padded, invalid UTF-8 replaced.
    Lenient,
}

impl ParseStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            ParseStrategy::Strict => "strict",
            ParseStrategy::Lenient => "lenient",
        }
    }
}

/// One delimiter/strategy combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadAttempt {
    pub delimiter: u8,
    pub strategy: ParseStrategy,
}

impl ReadAttempt {
    pub const fn new(delimiter: u8, strategy: ParseStrategy) -> Self {
        Self {
            delimiter,
            strategy,
        }
    }

    /// Delimiter as a char, for diagnostics.
    pub fn delimiter_char(&self) -> char {
        char::from(self.delimiter)
    }
}

impl fmt::Display for ReadAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sep={:?} {}", self.delimiter_char(), self.strategy.as_str())
    }
}

/// Headerless table of trimmed string cells.
#[derive(Debug, Clone)]
pub struct RawTable {
    /// Rows, each padded to `columns` cells.
    pub rows: Vec<Vec<String>>,
    /// Column count.
    pub columns: usize,
    /// Attempt that produced the table.
    pub attempt: ReadAttempt,
}

impl RawTable {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cells of one column, top to bottom.
    pub fn column(&self, idx: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows
            .iter()
            .map(move |row| row.get(idx).map(String::as_str).unwrap_or(""))
    }
}

/// Run one attempt against a file.
pub fn read_attempt(path: &Path, attempt: ReadAttempt) -> Result<RawTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .delimiter(attempt.delimiter)
        .flexible(attempt.strategy == ParseStrategy::Lenient)
        .from_path(path)?;

    let mut rows: Vec<Vec<String>> = Vec::new();
    match attempt.strategy {
        ParseStrategy::Strict => {
            for record in reader.records() {
                let record = record?;
                rows.push(record.iter().map(|s| s.trim().to_string()).collect());
            }
        }
        ParseStrategy::Lenient => {
            for record in reader.byte_records() {
                let record = record?;
                rows.push(
                    record
                        .iter()
                        .map(|b| String::from_utf8_lossy(b).trim().to_string())
                        .collect(),
                );
            }
        }
    }

    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    for row in &mut rows {
        row.resize(columns, String::new());
    }

    Ok(RawTable {
        rows,
        columns,
        attempt,
    })
}

/// Read a raw export, sniffing the delimiter.
///
/// I/O failures abort immediately. Structural failures move on to the next
/// attempt. When nothing yields more than one column, a final comma/strict
/// read decides the outcome.
pub fn read_raw_file(path: &Path) -> Result<RawTable> {
    let mut last_err: Option<Error> = None;

    for delimiter in DELIMITERS {
        match read_attempt(path, ReadAttempt::new(delimiter, ParseStrategy::Strict)) {
            Ok(table) if table.columns > 1 => return Ok(table),
            Ok(_) => continue,
            Err(e) if e.is_io() => return Err(e),
            Err(e) => {
                tracing::debug!(
                    path = %path.display(),
                    delimiter = %char::from(delimiter),
                    error = %e,
                    "strict parse failed, retrying lenient"
                );
            }
        }

        match read_attempt(path, ReadAttempt::new(delimiter, ParseStrategy::Lenient)) {
            Ok(table) if table.columns > 1 => return Ok(table),
            Ok(_) => {}
            Err(e) if e.is_io() => return Err(e),
            Err(e) => last_err = Some(e),
        }
    }

    match read_attempt(path, ReadAttempt::new(b',', ParseStrategy::Strict)) {
        Ok(table) => Ok(table),
        Err(e) => Err(last_err.unwrap_or(e)),
    }
}
