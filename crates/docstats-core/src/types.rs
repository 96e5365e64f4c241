//! Core data types for DocStats observations and aggregates

use crate::error::{Result, StatsError};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Observation kinds carried by a `stat` document
///
/// This is a closed set: a `stat` whose `type` field is not one of these
/// tags is rejected at the decoding boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatKind {
    /// Signed integer observation
    Int,
    /// 64-bit IEEE-754 observation
    Float,
    /// Exact two-decimal observation (stored internally as cents)
    Dec2,
    /// Non-negative integer observation (no automatic host mapping)
    Nat,
    /// Text observation
    Str,
    /// Boolean observation
    Bool,
    /// Calendar date observation (ISO `YYYY-MM-DD`)
    Date,
    /// Homogeneous array observation
    Arr,
}

impl StatKind {
    /// The wire tag for this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            StatKind::Int => "int",
            StatKind::Float => "float",
            StatKind::Dec2 => "dec2",
            StatKind::Nat => "nat",
            StatKind::Str => "str",
            StatKind::Bool => "bool",
            StatKind::Date => "date",
            StatKind::Arr => "arr",
        }
    }

    /// Parse a wire tag
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "int" => Ok(StatKind::Int),
            "float" => Ok(StatKind::Float),
            "dec2" => Ok(StatKind::Dec2),
            "nat" => Ok(StatKind::Nat),
            "str" => Ok(StatKind::Str),
            "bool" => Ok(StatKind::Bool),
            "date" => Ok(StatKind::Date),
            "arr" => Ok(StatKind::Arr),
            other => Err(StatsError::UnknownStatType(other.to_string())),
        }
    }

    /// The aggregate variant observations of this kind accumulate into
    pub fn agg_kind(&self) -> AggKind {
        match self {
            StatKind::Int => AggKind::IntAgg,
            StatKind::Float => AggKind::FloatAgg,
            StatKind::Dec2 => AggKind::Dec2Agg,
            StatKind::Nat => AggKind::NatAgg,
            StatKind::Str => AggKind::StrAgg,
            StatKind::Bool => AggKind::BoolAgg,
            StatKind::Date => AggKind::DateAgg,
            StatKind::Arr => AggKind::ArrAgg,
        }
    }
}

impl std::fmt::Display for StatKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate-entry kinds carried by a `stats_agg` document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggKind {
    IntAgg,
    FloatAgg,
    Dec2Agg,
    NatAgg,
    StrAgg,
    BoolAgg,
    DateAgg,
    ArrAgg,
}

impl AggKind {
    /// The wire tag for this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            AggKind::IntAgg => "int_agg",
            AggKind::FloatAgg => "float_agg",
            AggKind::Dec2Agg => "dec2_agg",
            AggKind::NatAgg => "nat_agg",
            AggKind::StrAgg => "str_agg",
            AggKind::BoolAgg => "bool_agg",
            AggKind::DateAgg => "date_agg",
            AggKind::ArrAgg => "arr_agg",
        }
    }

    /// Parse a wire tag
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "int_agg" => Ok(AggKind::IntAgg),
            "float_agg" => Ok(AggKind::FloatAgg),
            "dec2_agg" => Ok(AggKind::Dec2Agg),
            "nat_agg" => Ok(AggKind::NatAgg),
            "str_agg" => Ok(AggKind::StrAgg),
            "bool_agg" => Ok(AggKind::BoolAgg),
            "date_agg" => Ok(AggKind::DateAgg),
            "arr_agg" => Ok(AggKind::ArrAgg),
            other => Err(StatsError::UnknownAggType(other.to_string())),
        }
    }

    /// True for the Welford-backed variants (`int_agg`, `float_agg`,
    /// `dec2_agg`, `nat_agg`)
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            AggKind::IntAgg | AggKind::FloatAgg | AggKind::Dec2Agg | AggKind::NatAgg
        )
    }
}

impl std::fmt::Display for AggKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded, validated observation
///
/// The payload representation is already in accumulator-ready form: `dec2`
/// values are scaled to cents, dates are validated ISO strings, and array
/// elements are stringified by the codec's element rule.
#[derive(Debug, Clone, PartialEq)]
pub enum Stat {
    Int(i64),
    Float(f64),
    /// Value scaled by 100 (exact cents)
    Dec2(i64),
    /// May be negative here; the accumulator rejects negatives
    Nat(i64),
    Str(String),
    Bool(bool),
    /// Validated ISO `YYYY-MM-DD`
    Date(String),
    /// Stringified elements, in observed order
    Arr(Vec<String>),
}

impl Stat {
    /// The kind tag of this observation
    pub fn kind(&self) -> StatKind {
        match self {
            Stat::Int(_) => StatKind::Int,
            Stat::Float(_) => StatKind::Float,
            Stat::Dec2(_) => StatKind::Dec2,
            Stat::Nat(_) => StatKind::Nat,
            Stat::Str(_) => StatKind::Str,
            Stat::Bool(_) => StatKind::Bool,
            Stat::Date(_) => StatKind::Date,
            Stat::Arr(_) => StatKind::Arr,
        }
    }
}

/// Host scalar types accepted by the value codec
///
/// Modeled as a closed tagged union: anything the host cannot hand over as
/// one of these variants has no `stat` encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScalarValue {
    /// 32-bit signed integer
    Integer(i32),
    /// 64-bit floating point
    Float(f64),
    /// Exact decimal
    Decimal(Decimal),
    /// UTF-8 text
    Text(String),
    /// Boolean value
    Boolean(bool),
    /// Calendar date
    Date(NaiveDate),
    /// Homogeneous array of scalars (one level deep)
    Array(Vec<ScalarValue>),
}

impl ScalarValue {
    /// Get the type name of this scalar value
    pub fn type_name(&self) -> &'static str {
        match self {
            ScalarValue::Integer(_) => "integer",
            ScalarValue::Float(_) => "float",
            ScalarValue::Decimal(_) => "decimal",
            ScalarValue::Text(_) => "text",
            ScalarValue::Boolean(_) => "boolean",
            ScalarValue::Date(_) => "date",
            ScalarValue::Array(_) => "array",
        }
    }
}

impl From<i32> for ScalarValue {
    fn from(v: i32) -> Self {
        ScalarValue::Integer(v)
    }
}

impl From<f64> for ScalarValue {
    fn from(v: f64) -> Self {
        ScalarValue::Float(v)
    }
}

impl From<Decimal> for ScalarValue {
    fn from(v: Decimal) -> Self {
        ScalarValue::Decimal(v)
    }
}

impl From<String> for ScalarValue {
    fn from(v: String) -> Self {
        ScalarValue::Text(v)
    }
}

impl From<&str> for ScalarValue {
    fn from(v: &str) -> Self {
        ScalarValue::Text(v.to_string())
    }
}

impl From<bool> for ScalarValue {
    fn from(v: bool) -> Self {
        ScalarValue::Boolean(v)
    }
}

impl From<NaiveDate> for ScalarValue {
    fn from(v: NaiveDate) -> Self {
        ScalarValue::Date(v)
    }
}

impl From<Vec<ScalarValue>> for ScalarValue {
    fn from(v: Vec<ScalarValue>) -> Self {
        ScalarValue::Array(v)
    }
}
