//! Raw tick-file ingestion and continuous-series assembly.
//!
//! This crate handles:
//! - Contract file discovery under session folders
//! - Delimiter/strategy sniffing for raw exports
//! - Column-role detection (positional and by header name)
//! - Date/time normalization for both time encodings
//! - Stitching contracts into one timestamp-ordered series
//! - Writing the series and summary files

pub mod discovery;
pub mod reader;
pub mod schema;
pub mod series;
pub mod timestamp;
pub mod writer;

pub use discovery::{find_contract_files, list_tickers, ContractFile};
pub use reader::{read_raw_file, ParseStrategy, RawTable, ReadAttempt};
pub use schema::{detect_named, detect_positional, ColumnRole, ColumnRoles};
pub use series::ContinuousSeriesBuilder;
pub use timestamp::{normalize_timestamps, TimeEncoding};
pub use writer::{write_series, write_summary};
