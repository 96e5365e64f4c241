//! The per-variable accumulator union
//!
//! One accumulator per observed variable, discriminated the same way the
//! wire documents are. Conversion to and from document form lives here:
//! the unrounded form is the aggregate's portable state, the finalized form
//! adds derived statistics and two-digit rounding.

use docstats_codec::{
    cents_from_f64, cents_value, get_f64, get_i128, get_i64, get_str, get_u64, int_value,
    num_value, round2, stamp, sum_value, uint_value, validate_date,
};
use docstats_core::{AggKind, Result, Stat, StatsError};
use fxhash::FxHashMap;
use serde_json::{Map, Value};

use crate::counts::{ArrAcc, CountAcc, DateAcc};
use crate::numeric::{FloatAcc, IntAcc, Welford};

/// Which document dialect an aggregate entry is parsed from.
///
/// The two differ only for `dec2_agg`: the portable state document keeps the
/// Welford terms in scaled (cents) precision so serialization round-trips
/// bit-for-bit, while external documents carry them un-scaled as emitted by
/// finalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocForm {
    /// Serialized aggregate state (`dec2` Welford terms scaled)
    State,
    /// A `stats_agg` document from outside (`dec2` fields un-scaled)
    External,
}

/// Per-variable accumulator
#[derive(Debug, Clone, PartialEq)]
pub enum Accumulator {
    Int(IntAcc),
    Float(FloatAcc),
    /// All fields in cents
    Dec2(IntAcc),
    Nat(IntAcc),
    Str(CountAcc),
    Bool(CountAcc),
    Date(DateAcc),
    Arr(ArrAcc),
}

impl Accumulator {
    /// The aggregate kind tag of this accumulator
    pub fn kind(&self) -> AggKind {
        match self {
            Accumulator::Int(_) => AggKind::IntAgg,
            Accumulator::Float(_) => AggKind::FloatAgg,
            Accumulator::Dec2(_) => AggKind::Dec2Agg,
            Accumulator::Nat(_) => AggKind::NatAgg,
            Accumulator::Str(_) => AggKind::StrAgg,
            Accumulator::Bool(_) => AggKind::BoolAgg,
            Accumulator::Date(_) => AggKind::DateAgg,
            Accumulator::Arr(_) => AggKind::ArrAgg,
        }
    }

    /// Create an accumulator from the first observation of a variable
    pub fn init(stat: &Stat) -> Result<Self> {
        Ok(match stat {
            Stat::Int(v) => Accumulator::Int(IntAcc::init(*v)),
            Stat::Float(v) => Accumulator::Float(FloatAcc::init(*v)),
            Stat::Dec2(cents) => Accumulator::Dec2(IntAcc::init(*cents)),
            Stat::Nat(v) => {
                if *v < 0 {
                    return Err(StatsError::NegativeNat(*v));
                }
                Accumulator::Nat(IntAcc::init(*v))
            }
            Stat::Str(s) => Accumulator::Str(CountAcc::init(s.clone())),
            Stat::Bool(b) => Accumulator::Bool(CountAcc::init(b.to_string())),
            Stat::Date(d) => Accumulator::Date(DateAcc::init(d.clone())),
            Stat::Arr(elems) => Accumulator::Arr(ArrAcc::init(elems)),
        })
    }

    /// Fold one more observation in.
    ///
    /// Each variable is monomorphic for the lifetime of an aggregation;
    /// there is no coercion between the numeric kinds.
    pub fn update(&mut self, name: &str, stat: &Stat) -> Result<()> {
        if stat.kind().agg_kind() != self.kind() {
            return Err(StatsError::TypeMismatch {
                name: name.to_string(),
                expected: self.kind().as_str().to_string(),
                actual: stat.kind().as_str().to_string(),
            });
        }
        match (self, stat) {
            (Accumulator::Int(acc), Stat::Int(v)) => acc.update(*v),
            (Accumulator::Float(acc), Stat::Float(v)) => acc.update(*v),
            (Accumulator::Dec2(acc), Stat::Dec2(cents)) => acc.update(*cents),
            (Accumulator::Nat(acc), Stat::Nat(v)) => {
                if *v < 0 {
                    return Err(StatsError::NegativeNat(*v));
                }
                acc.update(*v);
            }
            (Accumulator::Str(acc), Stat::Str(s)) => acc.update(s.clone()),
            (Accumulator::Bool(acc), Stat::Bool(b)) => acc.update(b.to_string()),
            (Accumulator::Date(acc), Stat::Date(d)) => acc.update(d.clone()),
            (Accumulator::Arr(acc), Stat::Arr(elems)) => acc.update(elems),
            _ => unreachable!("kind equality checked above"),
        }
        Ok(())
    }

    /// Pairwise merge of two accumulators for the same variable
    pub fn merge(&mut self, name: &str, other: Accumulator) -> Result<()> {
        if self.kind() != other.kind() {
            return Err(StatsError::TypeMismatch {
                name: name.to_string(),
                expected: self.kind().as_str().to_string(),
                actual: other.kind().as_str().to_string(),
            });
        }
        match (self, other) {
            (Accumulator::Int(a), Accumulator::Int(b))
            | (Accumulator::Dec2(a), Accumulator::Dec2(b))
            | (Accumulator::Nat(a), Accumulator::Nat(b)) => a.merge(&b),
            (Accumulator::Float(a), Accumulator::Float(b)) => a.merge(&b),
            (Accumulator::Str(a), Accumulator::Str(b))
            | (Accumulator::Bool(a), Accumulator::Bool(b)) => a.merge(b),
            (Accumulator::Date(a), Accumulator::Date(b)) => a.merge(b),
            (Accumulator::Arr(a), Accumulator::Arr(b)) => a.merge(b),
            _ => unreachable!("kind equality checked above"),
        }
        Ok(())
    }

    /// Emit the unrounded document form (the portable aggregate state)
    pub fn to_doc(&self) -> Value {
        self.emit(false)
    }

    /// Emit the finalized document form: derived statistics attached, all
    /// statistic fields rounded to two digits, `dec2` un-scaled.
    pub fn finalize(&self) -> Value {
        self.emit(true)
    }

    fn emit(&self, finalized: bool) -> Value {
        match self {
            Accumulator::Int(acc) | Accumulator::Nat(acc) => {
                let extremes = (acc.count() > 0).then(|| (int_value(acc.min), int_value(acc.max)));
                emit_numeric(
                    self.kind(),
                    acc.count(),
                    sum_value(acc.sum),
                    extremes,
                    acc.welford.mean,
                    acc.welford.m2,
                    finalized,
                )
            }
            Accumulator::Float(acc) => {
                let extremes = (acc.count() > 0).then(|| (num_value(acc.min), num_value(acc.max)));
                emit_numeric(
                    AggKind::FloatAgg,
                    acc.count(),
                    num_value(acc.sum),
                    extremes,
                    acc.welford.mean,
                    acc.welford.m2,
                    finalized,
                )
            }
            Accumulator::Dec2(acc) => {
                let extremes =
                    (acc.count() > 0).then(|| (cents_value(acc.min), cents_value(acc.max)));
                // Welford terms stay scaled in the state form and are
                // un-scaled (by 100 and 100^2) for finalized output.
                let (mean, m2) = if finalized {
                    (acc.welford.mean / 100.0, acc.welford.m2 / 10_000.0)
                } else {
                    (acc.welford.mean, acc.welford.m2)
                };
                emit_numeric(
                    AggKind::Dec2Agg,
                    acc.count(),
                    cents_sum_value(acc.sum),
                    extremes,
                    mean,
                    m2,
                    finalized,
                )
            }
            Accumulator::Str(acc) => {
                let mut obj = Map::new();
                stamp(&mut obj, AggKind::StrAgg.as_str());
                obj.insert("counts".to_string(), counts_object(&acc.counts));
                Value::Object(obj)
            }
            Accumulator::Bool(acc) => {
                let mut obj = Map::new();
                stamp(&mut obj, AggKind::BoolAgg.as_str());
                obj.insert("counts".to_string(), counts_object(&acc.counts));
                Value::Object(obj)
            }
            Accumulator::Date(acc) => {
                let mut obj = Map::new();
                stamp(&mut obj, AggKind::DateAgg.as_str());
                obj.insert("counts".to_string(), counts_object(&acc.counts));
                obj.insert("min".to_string(), Value::String(acc.min.clone()));
                obj.insert("max".to_string(), Value::String(acc.max.clone()));
                Value::Object(obj)
            }
            Accumulator::Arr(acc) => {
                let mut obj = Map::new();
                stamp(&mut obj, AggKind::ArrAgg.as_str());
                obj.insert("count".to_string(), uint_value(acc.count));
                obj.insert("counts".to_string(), counts_object(&acc.counts));
                Value::Object(obj)
            }
        }
    }

    /// Parse an aggregate entry back from document form
    pub fn from_doc(obj: &Map<String, Value>, form: DocForm) -> Result<Self> {
        let tag = obj
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                StatsError::MalformedDocument("aggregate entry has no 'type' tag".to_string())
            })?;
        let kind = AggKind::parse(tag)?;

        match kind {
            AggKind::IntAgg => Ok(Accumulator::Int(parse_int_acc(obj)?)),
            AggKind::NatAgg => {
                let acc = parse_int_acc(obj)?;
                if acc.count() > 0 && acc.min < 0 {
                    return Err(StatsError::MalformedDocument(
                        "nat_agg entry has a negative minimum".to_string(),
                    ));
                }
                Ok(Accumulator::Nat(acc))
            }
            AggKind::FloatAgg => Ok(Accumulator::Float(parse_float_acc(obj)?)),
            AggKind::Dec2Agg => Ok(Accumulator::Dec2(parse_dec2_acc(obj, form)?)),
            AggKind::StrAgg => Ok(Accumulator::Str(CountAcc {
                counts: parse_counts(obj)?,
            })),
            AggKind::BoolAgg => {
                let counts = parse_counts(obj)?;
                for key in counts.keys() {
                    if key != "true" && key != "false" {
                        return Err(StatsError::MalformedDocument(format!(
                            "bool_agg counts key '{}' is not 'true' or 'false'",
                            key
                        )));
                    }
                }
                Ok(Accumulator::Bool(CountAcc { counts }))
            }
            AggKind::DateAgg => {
                let counts = parse_counts(obj)?;
                for key in counts.keys() {
                    validate_date(key)?;
                }
                let min = get_str(obj, "min")?;
                let max = get_str(obj, "max")?;
                validate_date(min)?;
                validate_date(max)?;
                if min > max {
                    return Err(StatsError::MalformedDocument(
                        "date_agg minimum exceeds maximum".to_string(),
                    ));
                }
                Ok(Accumulator::Date(DateAcc {
                    counts,
                    min: min.to_string(),
                    max: max.to_string(),
                }))
            }
            AggKind::ArrAgg => Ok(Accumulator::Arr(ArrAcc {
                count: get_u64(obj, "count")?,
                counts: parse_counts(obj)?,
            })),
        }
    }
}

/// Emit the numeric entry skeleton shared by all Welford-backed kinds.
///
/// `extremes` is `None` when no observation was seen: min/max/mean are
/// undefined at count zero and never emitted.
fn emit_numeric(
    kind: AggKind,
    count: u64,
    sum: Value,
    extremes: Option<(Value, Value)>,
    mean: f64,
    m2: f64,
    finalized: bool,
) -> Value {
    let mut obj = Map::new();
    stamp(&mut obj, kind.as_str());
    obj.insert("count".to_string(), uint_value(count));
    obj.insert("sum".to_string(), sum);
    if let Some((min, max)) = extremes {
        obj.insert("min".to_string(), min);
        obj.insert("max".to_string(), max);
        let mean_value = if finalized {
            num_value(round2(mean))
        } else {
            num_value(mean)
        };
        obj.insert("mean".to_string(), mean_value);
    }
    let m2_value = if finalized {
        num_value(round2(m2))
    } else {
        num_value(m2)
    };
    obj.insert("sum_sq_diff".to_string(), m2_value);

    if finalized {
        let (variance, stddev, cv_pct) = derived_stats(count, mean, m2);
        obj.insert("variance".to_string(), variance);
        obj.insert("stddev".to_string(), stddev);
        obj.insert("coefficient_of_variation_pct".to_string(), cv_pct);
    }

    Value::Object(obj)
}

/// Derived statistics for finalization.
///
/// Null policy: all three are null below two observations; stddev is null
/// for a (numerically) negative variance; cv_pct is null for a zero mean.
fn derived_stats(count: u64, mean: f64, m2: f64) -> (Value, Value, Value) {
    if count <= 1 {
        return (Value::Null, Value::Null, Value::Null);
    }
    let variance = m2 / (count - 1) as f64;
    let stddev = if variance >= 0.0 {
        Some(variance.sqrt())
    } else {
        None
    };
    let cv_pct = stddev.and_then(|sd| {
        if mean != 0.0 {
            Some(sd / mean * 100.0)
        } else {
            None
        }
    });
    (
        num_value(round2(variance)),
        stddev.map(|sd| num_value(round2(sd))).unwrap_or(Value::Null),
        cv_pct.map(|cv| num_value(round2(cv))).unwrap_or(Value::Null),
    )
}

fn cents_sum_value(sum: i128) -> Value {
    match i64::try_from(sum) {
        Ok(cents) => cents_value(cents),
        Err(_) => num_value(sum as f64 / 100.0),
    }
}

fn parse_int_acc(obj: &Map<String, Value>) -> Result<IntAcc> {
    let count = get_u64(obj, "count")?;
    if count == 0 {
        return Ok(IntAcc::empty());
    }
    Ok(IntAcc {
        welford: Welford {
            count,
            mean: get_f64(obj, "mean")?,
            m2: get_f64(obj, "sum_sq_diff")?,
        },
        sum: get_i128(obj, "sum")?,
        min: get_i64(obj, "min")?,
        max: get_i64(obj, "max")?,
    })
}

fn parse_float_acc(obj: &Map<String, Value>) -> Result<FloatAcc> {
    let count = get_u64(obj, "count")?;
    if count == 0 {
        return Ok(FloatAcc::empty());
    }
    Ok(FloatAcc {
        welford: Welford {
            count,
            mean: get_f64(obj, "mean")?,
            m2: get_f64(obj, "sum_sq_diff")?,
        },
        sum: get_f64(obj, "sum")?,
        min: get_f64(obj, "min")?,
        max: get_f64(obj, "max")?,
    })
}

fn parse_dec2_acc(obj: &Map<String, Value>, form: DocForm) -> Result<IntAcc> {
    let count = get_u64(obj, "count")?;
    if count == 0 {
        return Ok(IntAcc::empty());
    }
    let (mean, m2) = match form {
        DocForm::State => (get_f64(obj, "mean")?, get_f64(obj, "sum_sq_diff")?),
        DocForm::External => (
            get_f64(obj, "mean")? * 100.0,
            get_f64(obj, "sum_sq_diff")? * 10_000.0,
        ),
    };
    Ok(IntAcc {
        welford: Welford { count, mean, m2 },
        sum: cents_from_f64(get_f64(obj, "sum")?) as i128,
        min: cents_from_f64(get_f64(obj, "min")?),
        max: cents_from_f64(get_f64(obj, "max")?),
    })
}

fn parse_counts(obj: &Map<String, Value>) -> Result<FxHashMap<String, u64>> {
    let counts = obj
        .get("counts")
        .and_then(Value::as_object)
        .ok_or_else(|| StatsError::MalformedDocument("missing or invalid field 'counts'".to_string()))?;
    let mut map = FxHashMap::default();
    for (key, value) in counts {
        let n = value.as_u64().filter(|n| *n >= 1).ok_or_else(|| {
            StatsError::MalformedDocument(format!("count for '{}' must be a positive integer", key))
        })?;
        map.insert(key.clone(), n);
    }
    Ok(map)
}

fn counts_object(counts: &FxHashMap<String, u64>) -> Value {
    let mut obj = Map::new();
    for (key, n) in counts {
        obj.insert(key.clone(), uint_value(*n));
    }
    Value::Object(obj)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn accumulate(stats: &[Stat]) -> Accumulator {
        let mut acc = Accumulator::init(&stats[0]).unwrap();
        for stat in &stats[1..] {
            acc.update("x", stat).unwrap();
        }
        acc
    }

    #[test]
    fn test_int_finalize_reading_scenario() {
        let acc = accumulate(&[Stat::Int(10), Stat::Int(5), Stat::Int(20)]);
        assert_eq!(
            acc.finalize(),
            json!({
                "type": "int_agg",
                "count": 3,
                "sum": 35,
                "min": 5,
                "max": 20,
                "mean": 11.67,
                "sum_sq_diff": 116.67,
                "variance": 58.33,
                "stddev": 7.64,
                "coefficient_of_variation_pct": 65.47,
            })
        );
    }

    #[test]
    fn test_str_counts_scenario() {
        let acc = accumulate(&[
            Stat::Str("apple".to_string()),
            Stat::Str("banana".to_string()),
            Stat::Str("apple".to_string()),
        ]);
        assert_eq!(
            acc.finalize(),
            json!({"type": "str_agg", "counts": {"apple": 2, "banana": 1}})
        );
    }

    #[test]
    fn test_bool_counts_scenario() {
        let acc = accumulate(&[Stat::Bool(true), Stat::Bool(false), Stat::Bool(true)]);
        assert_eq!(
            acc.finalize(),
            json!({"type": "bool_agg", "counts": {"false": 1, "true": 2}})
        );
    }

    #[test]
    fn test_arr_tags_scenario() {
        let arrays = [
            vec!["1".to_string(), "2".to_string()],
            vec!["2".to_string(), "3".to_string()],
            vec!["3".to_string(), "4".to_string()],
        ];
        let stats: Vec<Stat> = arrays.iter().map(|a| Stat::Arr(a.clone())).collect();
        let acc = accumulate(&stats);
        assert_eq!(
            acc.finalize(),
            json!({
                "type": "arr_agg",
                "count": 3,
                "counts": {"1": 1, "2": 2, "3": 2, "4": 1},
            })
        );
    }

    #[test]
    fn test_dec2_finalize_unscales() {
        // 1.10, 2.20, 3.30 as cents
        let acc = accumulate(&[Stat::Dec2(110), Stat::Dec2(220), Stat::Dec2(330)]);
        assert_eq!(
            acc.finalize(),
            json!({
                "type": "dec2_agg",
                "count": 3,
                "sum": 6.6,
                "min": 1.1,
                "max": 3.3,
                "mean": 2.2,
                "sum_sq_diff": 2.42,
                "variance": 1.21,
                "stddev": 1.1,
                "coefficient_of_variation_pct": 50,
            })
        );
    }

    #[test]
    fn test_nat_rejects_negative() {
        let err = Accumulator::init(&Stat::Nat(-1)).unwrap_err();
        assert!(matches!(err, StatsError::NegativeNat(-1)));

        let mut acc = Accumulator::init(&Stat::Nat(10)).unwrap();
        let err = acc.update("headcount", &Stat::Nat(-5)).unwrap_err();
        assert!(matches!(err, StatsError::NegativeNat(-5)));
    }

    #[test]
    fn test_update_rejects_kind_change() {
        let mut acc = Accumulator::init(&Stat::Int(1)).unwrap();
        let err = acc.update("x", &Stat::Str("one".to_string())).unwrap_err();
        assert!(matches!(
            err,
            StatsError::TypeMismatch { ref expected, ref actual, .. }
                if expected == "int_agg" && actual == "str"
        ));
    }

    #[test]
    fn test_update_rejects_numeric_cross_kind() {
        // int and float are distinct variants; no coercion
        let mut acc = Accumulator::init(&Stat::Int(1)).unwrap();
        assert!(acc.update("x", &Stat::Float(2.0)).is_err());
        assert!(acc.update("x", &Stat::Nat(2)).is_err());
        assert!(acc.update("x", &Stat::Dec2(200)).is_err());
    }

    #[test]
    fn test_merge_rejects_mismatched_variants() {
        let mut a = Accumulator::init(&Stat::Int(1)).unwrap();
        let b = Accumulator::init(&Stat::Str("x".to_string())).unwrap();
        let err = a.merge("x", b).unwrap_err();
        assert!(matches!(
            err,
            StatsError::TypeMismatch { ref expected, ref actual, .. }
                if expected == "int_agg" && actual == "str_agg"
        ));
    }

    #[test]
    fn test_single_count_nulls() {
        let acc = Accumulator::init(&Stat::Int(100)).unwrap();
        let doc = acc.finalize();
        assert_eq!(doc["count"], json!(1));
        assert!(doc["variance"].is_null());
        assert!(doc["stddev"].is_null());
        assert!(doc["coefficient_of_variation_pct"].is_null());
    }

    #[test]
    fn test_zero_mean_nulls_only_cv() {
        let acc = accumulate(&[Stat::Int(-5), Stat::Int(5)]);
        let doc = acc.finalize();
        assert_eq!(doc["mean"], json!(0));
        assert_eq!(doc["variance"], json!(50));
        assert_eq!(doc["stddev"], json!(7.07));
        assert!(doc["coefficient_of_variation_pct"].is_null());
    }

    #[test]
    fn test_state_doc_roundtrip_int() {
        let acc = accumulate(&[Stat::Int(10), Stat::Int(5), Stat::Int(20)]);
        let doc = acc.to_doc();
        let obj = doc.as_object().unwrap();
        let parsed = Accumulator::from_doc(obj, DocForm::State).unwrap();
        assert_eq!(parsed, acc);
    }

    #[test]
    fn test_state_doc_roundtrip_dec2() {
        let acc = accumulate(&[Stat::Dec2(150), Stat::Dec2(333), Stat::Dec2(101)]);
        let doc = acc.to_doc();
        let obj = doc.as_object().unwrap();
        let parsed = Accumulator::from_doc(obj, DocForm::State).unwrap();
        assert_eq!(parsed, acc);
    }

    #[test]
    fn test_state_doc_roundtrip_date() {
        let acc = accumulate(&[
            Stat::Date("2024-01-15".to_string()),
            Stat::Date("2023-06-01".to_string()),
        ]);
        let doc = acc.to_doc();
        let obj = doc.as_object().unwrap();
        let parsed = Accumulator::from_doc(obj, DocForm::State).unwrap();
        assert_eq!(parsed, acc);
    }

    #[test]
    fn test_external_dec2_doc_rescales() {
        let doc = json!({
            "type": "dec2_agg",
            "count": 2,
            "sum": 3.3,
            "min": 1.1,
            "max": 2.2,
            "mean": 1.65,
            "sum_sq_diff": 0.605,
        });
        let acc = Accumulator::from_doc(doc.as_object().unwrap(), DocForm::External).unwrap();
        match acc {
            Accumulator::Dec2(inner) => {
                assert_eq!(inner.sum, 330);
                assert_eq!(inner.min, 110);
                assert_eq!(inner.max, 220);
                assert!((inner.welford.mean - 165.0).abs() < 1e-9);
                assert!((inner.welford.m2 - 6050.0).abs() < 1e-6);
            }
            other => panic!("expected dec2 accumulator, got {:?}", other.kind()),
        }
    }

    #[test]
    fn test_from_doc_rejects_unknown_tag() {
        let doc = json!({"type": "foo_agg", "count": 1});
        let err = Accumulator::from_doc(doc.as_object().unwrap(), DocForm::External).unwrap_err();
        assert!(matches!(err, StatsError::UnknownAggType(s) if s == "foo_agg"));
    }

    #[test]
    fn test_from_doc_rejects_missing_fields() {
        let doc = json!({"type": "int_agg", "count": 2, "sum": 10});
        let err = Accumulator::from_doc(doc.as_object().unwrap(), DocForm::External).unwrap_err();
        assert!(matches!(err, StatsError::MalformedDocument(_)));
    }

    #[test]
    fn test_from_doc_rejects_bad_bool_keys() {
        let doc = json!({"type": "bool_agg", "counts": {"yes": 2}});
        let err = Accumulator::from_doc(doc.as_object().unwrap(), DocForm::External).unwrap_err();
        assert!(matches!(err, StatsError::MalformedDocument(_)));
    }

    #[test]
    fn test_from_doc_rejects_negative_nat_min() {
        let doc = json!({
            "type": "nat_agg",
            "count": 1, "sum": -3, "min": -3, "max": -3, "mean": -3, "sum_sq_diff": 0,
        });
        let err = Accumulator::from_doc(doc.as_object().unwrap(), DocForm::External).unwrap_err();
        assert!(matches!(err, StatsError::MalformedDocument(_)));
    }

    #[test]
    fn test_from_doc_rejects_inverted_date_range() {
        let doc = json!({
            "type": "date_agg",
            "counts": {"2024-01-15": 1},
            "min": "2024-02-01",
            "max": "2024-01-01",
        });
        let err = Accumulator::from_doc(doc.as_object().unwrap(), DocForm::External).unwrap_err();
        assert!(matches!(err, StatsError::MalformedDocument(_)));
    }

    #[test]
    fn test_from_doc_ignores_derived_fields() {
        // Finalized documents are re-readable; derived stats are recomputed
        let doc = json!({
            "type": "int_agg",
            "count": 2, "sum": 200, "min": 50, "max": 150, "mean": 100, "sum_sq_diff": 5000,
            "variance": 5000, "stddev": 70.71, "coefficient_of_variation_pct": 70.71,
        });
        let acc = Accumulator::from_doc(doc.as_object().unwrap(), DocForm::External).unwrap();
        assert_eq!(acc.kind(), AggKind::IntAgg);
        let out = acc.finalize();
        assert_eq!(out["variance"], json!(5000));
        assert_eq!(out["stddev"], json!(70.71));
    }

    #[test]
    fn test_zero_count_entry_merges_as_identity() {
        let zero = json!({"type": "int_agg", "count": 0, "sum": 0, "sum_sq_diff": 0});
        let mut acc = Accumulator::from_doc(zero.as_object().unwrap(), DocForm::External).unwrap();
        let full = accumulate(&[Stat::Int(10), Stat::Int(20)]);
        acc.merge("x", full.clone()).unwrap();
        assert_eq!(acc, full);
    }
}
