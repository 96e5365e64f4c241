//! Error types for the DocStats workspace

use thiserror::Error;

/// Failures surfaced by the aggregation core.
///
/// Every kind is fatal to the current operation: nothing is retried or
/// skipped, since a silently dropped observation would corrupt downstream
/// aggregates.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("unknown stat type '{0}': expected int, float, dec2, nat, str, bool, date, arr")]
    UnknownStatType(String),

    #[error("unknown aggregate type '{0}': expected int_agg, float_agg, dec2_agg, nat_agg, str_agg, bool_agg, date_agg, arr_agg")]
    UnknownAggType(String),

    #[error("malformed document: {0}")]
    MalformedDocument(String),

    #[error("type mismatch for '{name}': expected {expected}, got {actual}")]
    TypeMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("invalid scalar: {0}")]
    InvalidScalar(String),

    #[error("nat value must be >= 0, got {0}")]
    NegativeNat(i64),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, StatsError>;
