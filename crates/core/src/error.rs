//! Error types for the tickstitch system.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the tickstitch system.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data error (invalid or missing data).
    #[error("Data error: {0}")]
    Data(String),

    /// Contract code without a resolvable year/month.
    #[error("Unparseable contract code: {0}")]
    UnparseableContract(String),

    /// No date/time (or price) column could be identified.
    #[error("Schema undetected: {0}")]
    SchemaUndetected(String),

    /// Every timestamp in a file failed to normalize.
    #[error("Undecodable timestamps: {0}")]
    UndecodableTimestamps(String),

    /// No contract files were found for an instrument.
    #[error("No files found: {0}")]
    NoFiles(String),

    /// Every contract file of an instrument failed.
    #[error("All {failed} file(s) failed for {ticker}")]
    AllFilesFailed { ticker: String, failed: usize },

    /// Unknown candle timeframe label.
    #[error("Unknown timeframe: {0}")]
    UnknownTimeframe(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reading/writing error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a data error.
    pub fn data(msg: impl Into<String>) -> Self {
        Error::Data(msg.into())
    }

    /// Create an unparseable contract error.
    pub fn unparseable_contract(code: impl Into<String>) -> Self {
        Error::UnparseableContract(code.into())
    }

    /// Create a schema detection error.
    pub fn schema_undetected(msg: impl Into<String>) -> Self {
        Error::SchemaUndetected(msg.into())
    }

    /// Create an undecodable timestamps error.
    pub fn undecodable_timestamps(msg: impl Into<String>) -> Self {
        Error::UndecodableTimestamps(msg.into())
    }

    /// Create a no-files error.
    pub fn no_files(msg: impl Into<String>) -> Self {
        Error::NoFiles(msg.into())
    }

    /// Whether this error came from the filesystem rather than file content.
    pub fn is_io(&self) -> bool {
        match self {
            Error::Io(_) => true,
            Error::Csv(e) => e.is_io_error(),
            _ => false,
        }
    }
}
