//! Host scalar → `stat` document encoding
//!
//! The mapping is a closed table: integers to `int`, doubles to `float`,
//! exact decimals to `dec2` (rounded to two fractional digits), text to
//! `str`, booleans to `bool`, dates to ISO `YYYY-MM-DD`, arrays to ordered
//! element sequences. There is no string fallback for anything else.

use docstats_core::{Result, ScalarValue, StatKind, StatsError};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::{json, Map, Number, Value};

/// Build a `stat` document from a kind tag and an encoded payload
pub fn stat_doc(kind: StatKind, value: Value) -> Value {
    let mut obj = Map::new();
    obj.insert("type".to_string(), json!(kind.as_str()));
    obj.insert("value".to_string(), value);
    Value::Object(obj)
}

/// Build a `nat` stat document directly.
///
/// `nat` has no host-type mapping; this is the only constructor. Negative
/// values are representable here and rejected later by the accumulator.
pub fn nat_stat(value: i64) -> Value {
    stat_doc(StatKind::Nat, json!(value))
}

/// Round a decimal half away from zero to two fractional digits
pub fn round_dec2(d: Decimal) -> Decimal {
    d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Encode a host scalar as a tagged `stat` document
pub fn encode_scalar(value: &ScalarValue) -> Result<Value> {
    let (kind, payload) = match value {
        ScalarValue::Integer(v) => (StatKind::Int, json!(v)),
        ScalarValue::Float(v) => (StatKind::Float, float_value(*v)?),
        ScalarValue::Decimal(d) => (StatKind::Dec2, decimal_value(*d)?),
        ScalarValue::Text(s) => (StatKind::Str, json!(s)),
        ScalarValue::Boolean(b) => (StatKind::Bool, json!(b)),
        ScalarValue::Date(d) => (StatKind::Date, json!(d.format("%Y-%m-%d").to_string())),
        ScalarValue::Array(items) => {
            let elems = items
                .iter()
                .map(encode_element)
                .collect::<Result<Vec<_>>>()?;
            (StatKind::Arr, Value::Array(elems))
        }
    };
    Ok(stat_doc(kind, payload))
}

/// Encode one array element. Recursive arrays are rejected.
fn encode_element(value: &ScalarValue) -> Result<Value> {
    match value {
        ScalarValue::Integer(v) => Ok(json!(v)),
        ScalarValue::Float(v) => float_value(*v),
        ScalarValue::Decimal(d) => decimal_value(*d),
        ScalarValue::Text(s) => Ok(json!(s)),
        ScalarValue::Boolean(b) => Ok(json!(b)),
        ScalarValue::Date(d) => Ok(json!(d.format("%Y-%m-%d").to_string())),
        ScalarValue::Array(_) => Err(StatsError::InvalidScalar(
            "recursive arrays are not supported".to_string(),
        )),
    }
}

fn float_value(v: f64) -> Result<Value> {
    Number::from_f64(v)
        .map(Value::Number)
        .ok_or_else(|| StatsError::InvalidScalar(format!("non-finite float {}", v)))
}

fn decimal_value(d: Decimal) -> Result<Value> {
    let rounded = round_dec2(d);
    rounded
        .to_f64()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| StatsError::InvalidScalar(format!("'{}' is out of range for dec2", d)))
}
