//! Document decoding
//!
//! Turns self-describing documents back into typed values: iteration over
//! `(key, value)` pairs with the discriminator stripped, field accessors for
//! aggregate entries, and full `stat` decoding with validation.

use chrono::NaiveDate;
use docstats_core::{Result, Stat, StatKind, StatsError};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;

/// Borrow a document as an object, or fail with `MalformedDocument`
pub fn expect_object<'a>(doc: &'a Value, what: &str) -> Result<&'a Map<String, Value>> {
    doc.as_object()
        .ok_or_else(|| StatsError::MalformedDocument(format!("{} is not an object", what)))
}

/// The top-level discriminator of a document, if present
pub fn doc_type(doc: &Value) -> Option<&str> {
    doc.get("type").and_then(Value::as_str)
}

/// Iterate the `(key, value)` pairs of a document, skipping the top-level
/// `type` discriminator so it never leaks into the variable map.
pub fn entries<'a>(doc: &'a Value) -> Result<impl Iterator<Item = (&'a str, &'a Value)>> {
    let obj = expect_object(doc, "document")?;
    Ok(obj
        .iter()
        .filter(|(k, _)| k.as_str() != "type")
        .map(|(k, v)| (k.as_str(), v)))
}

/// Required f64 field of an aggregate entry
pub fn get_f64(obj: &Map<String, Value>, key: &str) -> Result<f64> {
    obj.get(key)
        .and_then(Value::as_f64)
        .ok_or_else(|| StatsError::MalformedDocument(format!("missing or invalid field '{}'", key)))
}

/// Required non-negative integer field of an aggregate entry
pub fn get_u64(obj: &Map<String, Value>, key: &str) -> Result<u64> {
    obj.get(key)
        .and_then(Value::as_u64)
        .ok_or_else(|| StatsError::MalformedDocument(format!("missing or invalid field '{}'", key)))
}

/// Required signed integer field of an aggregate entry
pub fn get_i64(obj: &Map<String, Value>, key: &str) -> Result<i64> {
    obj.get(key)
        .and_then(Value::as_i64)
        .ok_or_else(|| StatsError::MalformedDocument(format!("missing or invalid field '{}'", key)))
}

/// Required integer field, widened to 128 bits.
///
/// Falls back to the double representation for sums that were emitted past
/// the i64 range.
pub fn get_i128(obj: &Map<String, Value>, key: &str) -> Result<i128> {
    let value = obj
        .get(key)
        .ok_or_else(|| StatsError::MalformedDocument(format!("missing or invalid field '{}'", key)))?;
    if let Some(n) = value.as_i64() {
        return Ok(n as i128);
    }
    value
        .as_f64()
        .map(|f| f as i128)
        .ok_or_else(|| StatsError::MalformedDocument(format!("missing or invalid field '{}'", key)))
}

/// Required string field of an aggregate entry
pub fn get_str<'a>(obj: &'a Map<String, Value>, key: &str) -> Result<&'a str> {
    obj.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| StatsError::MalformedDocument(format!("missing or invalid field '{}'", key)))
}

/// Validate an ISO `YYYY-MM-DD` date string.
///
/// Re-formats after parsing so non-canonical renderings (`2024-1-5`) are
/// rejected too; lexicographic order on accepted strings then matches
/// chronological order.
pub fn validate_date(s: &str) -> Result<()> {
    let parsed = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| StatsError::InvalidScalar(format!("unparseable date '{}'", s)))?;
    if parsed.format("%Y-%m-%d").to_string() != s {
        return Err(StatsError::InvalidScalar(format!("unparseable date '{}'", s)));
    }
    Ok(())
}

/// Re-scale an un-scaled `dec2` document value back into exact cents
pub fn cents_from_f64(v: f64) -> i64 {
    (v * 100.0).round() as i64
}

/// Decode a `stat` document into a typed observation
pub fn decode_stat(doc: &Value) -> Result<Stat> {
    let obj = expect_object(doc, "stat")?;
    let kind_tag = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| StatsError::MalformedDocument("stat has no 'type' tag".to_string()))?;
    let kind = StatKind::parse(kind_tag)?;

    let value = obj.get("value").ok_or_else(|| malformed_value(kind))?;

    match kind {
        StatKind::Int => value.as_i64().map(Stat::Int).ok_or_else(|| malformed_value(kind)),
        StatKind::Float => value.as_f64().map(Stat::Float).ok_or_else(|| malformed_value(kind)),
        StatKind::Nat => value.as_i64().map(Stat::Nat).ok_or_else(|| malformed_value(kind)),
        StatKind::Dec2 => match value {
            Value::Number(n) => decimal_cents(n).map(Stat::Dec2),
            _ => Err(malformed_value(kind)),
        },
        StatKind::Str => value
            .as_str()
            .map(|s| Stat::Str(s.to_string()))
            .ok_or_else(|| malformed_value(kind)),
        StatKind::Bool => value.as_bool().map(Stat::Bool).ok_or_else(|| malformed_value(kind)),
        StatKind::Date => {
            let s = value.as_str().ok_or_else(|| malformed_value(kind))?;
            validate_date(s)?;
            Ok(Stat::Date(s.to_string()))
        }
        StatKind::Arr => match value {
            Value::Array(items) => {
                let elems = items
                    .iter()
                    .map(stringify_element)
                    .collect::<Result<Vec<_>>>()?;
                Ok(Stat::Arr(elems))
            }
            // The host's brace-delimited array rendering: {a,b,c}
            Value::String(s) => Ok(Stat::Arr(split_brace_array(s))),
            _ => Err(malformed_value(kind)),
        },
    }
}

fn malformed_value(kind: StatKind) -> StatsError {
    StatsError::MalformedDocument(format!(
        "stat of type '{}' has missing or invalid 'value'",
        kind
    ))
}

/// Stringify one array element by the codec's element rule
fn stringify_element(elem: &Value) -> Result<String> {
    match elem {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok("null".to_string()),
        _ => Err(StatsError::MalformedDocument(
            "array elements must be scalars".to_string(),
        )),
    }
}

fn split_brace_array(s: &str) -> Vec<String> {
    let trimmed = s.trim_matches(|c| c == '{' || c == '}');
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed.split(',').map(|e| e.trim().to_string()).collect()
}

/// Parse a JSON number into exact cents, rounding half away from zero to
/// two fractional digits first.
fn decimal_cents(n: &serde_json::Number) -> Result<i64> {
    let text = n.to_string();
    let parsed = Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| StatsError::InvalidScalar(format!("'{}' is not representable as dec2", text)))?;
    let rounded = crate::scalar::round_dec2(parsed);
    (rounded * Decimal::from(100))
        .to_i64()
        .ok_or_else(|| StatsError::InvalidScalar(format!("'{}' is out of range for dec2", text)))
}
