//! Core types and configuration for the tickstitch system.
//!
//! This crate provides shared types used across all other crates:
//! - Tick, price point and candle types
//! - Contract codes and expiry ordering
//! - Candle timeframes
//! - Configuration structures
//! - Common error types
//! - The structured event sink

pub mod config;
pub mod contract;
pub mod error;
pub mod events;
pub mod timeframe;
pub mod types;

pub use config::Config;
pub use contract::ContractCode;
pub use error::{Error, Result};
pub use events::{EventSink, MemorySink, PipelineEvent, TracingSink};
pub use timeframe::Timeframe;
pub use types::*;
