//! DocStats Core - Core types for the DocStats aggregation engine
//!
//! This crate provides the fundamental data types used throughout DocStats:
//! - `ScalarValue`: Typed host scalars (Integer, Float, Decimal, Text, ...)
//! - `StatKind` / `AggKind`: Closed sets of observation and aggregate tags
//! - `Stat`: A decoded, validated observation
//! - `StatsError`: The error surface shared by all crates

pub mod error;
pub mod types;

pub use error::{Result, StatsError};
pub use types::*;
