//! Canonical emission helpers
//!
//! Every document leaving the core goes through these: numbers are rendered
//! as shortest round-trip decimals, values with no fractional part collapse
//! to JSON integers (matching the host's numeric rendering), and rounding is
//! half-away-from-zero to two fractional digits.

use serde_json::{Map, Number, Value};

/// Round to 2 decimal places, half away from zero.
///
/// `f64::round` ties away from zero, so scaling by 100 gives exactly the
/// rounding rule the aggregate contract requires.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Create a JSON number from f64, using integer representation when the
/// value is exact.
pub fn num_value(v: f64) -> Value {
    if v.fract() == 0.0 && v.abs() < (i64::MAX as f64) {
        Value::Number(Number::from(v as i64))
    } else {
        Number::from_f64(v).map(Value::Number).unwrap_or(Value::Null)
    }
}

/// JSON number from a signed integer
pub fn int_value(v: i64) -> Value {
    Value::Number(Number::from(v))
}

/// JSON number from an unsigned integer
pub fn uint_value(v: u64) -> Value {
    Value::Number(Number::from(v))
}

/// JSON number from a 128-bit sum.
///
/// Sums that still fit `i64` (every realistic population) stay exact
/// integers; beyond that the value degrades to the nearest double.
pub fn sum_value(v: i128) -> Value {
    match i64::try_from(v) {
        Ok(n) => int_value(n),
        Err(_) => num_value(v as f64),
    }
}

/// JSON number from a scaled `dec2` quantity (cents), un-scaled exactly.
///
/// Whole amounts collapse to integers; fractional amounts render with at
/// most two decimals because the cents value is exact.
pub fn cents_value(cents: i64) -> Value {
    if cents % 100 == 0 {
        int_value(cents / 100)
    } else {
        num_value(cents as f64 / 100.0)
    }
}

/// Insert the top-level discriminator into a document under construction
pub fn stamp(obj: &mut Map<String, Value>, doc_type: &str) {
    obj.insert("type".to_string(), Value::String(doc_type.to_string()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_round2_half_away_from_zero() {
        assert_eq!(round2(2.345), 2.35);
        assert_eq!(round2(-2.345), -2.35);
        assert_eq!(round2(2.344), 2.34);
        assert_eq!(round2(11.666666666666666), 11.67);
        assert_eq!(round2(100.0), 100.0);
    }

    #[test]
    fn test_num_value_collapses_integrals() {
        assert_eq!(num_value(100.0), json!(100));
        assert_eq!(num_value(-3.0), json!(-3));
        assert_eq!(num_value(2.5), json!(2.5));
    }

    #[test]
    fn test_sum_value_wide_range() {
        assert_eq!(sum_value(35), json!(35));
        assert_eq!(sum_value(-7), json!(-7));
        assert_eq!(sum_value(i64::MAX as i128), json!(i64::MAX));
    }

    #[test]
    fn test_cents_value_exact_unscaling() {
        assert_eq!(cents_value(9999), json!(99.99));
        assert_eq!(cents_value(330), json!(3.3));
        assert_eq!(cents_value(200), json!(2));
        assert_eq!(cents_value(-150), json!(-1.5));
        assert_eq!(cents_value(0), json!(0));
    }

    #[test]
    fn test_stamp_overwrites_existing_type() {
        let mut obj = Map::new();
        obj.insert("type".to_string(), json!("bogus"));
        stamp(&mut obj, "stats");
        assert_eq!(obj.get("type"), Some(&json!("stats")));
    }
}
