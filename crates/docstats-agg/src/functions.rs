//! Host-exposed scalar functions
//!
//! The pure, stateless surface: build a `stat` from a host scalar, stamp a
//! `stats` discriminator, promote a single `stats` document to `stats_agg`,
//! and merge two `stats_agg` documents. All functions are deterministic and
//! parallel-safe.

use docstats_codec::{encode_scalar, stamp};
use docstats_core::{Result, ScalarValue, StatsError};
use serde_json::Value;

use crate::driver::{MergeAggregator, PairCollector, StatsAggregator};

/// Create a typed `stat` document from a host scalar
pub fn stat(value: &ScalarValue) -> Result<Value> {
    encode_scalar(value)
}

/// Stamp the `stats` discriminator onto an ad-hoc object of stat entries
pub fn stats(doc: Value) -> Result<Value> {
    match doc {
        Value::Object(mut obj) => {
            stamp(&mut obj, "stats");
            Ok(Value::Object(obj))
        }
        _ => Err(StatsError::MalformedDocument(
            "stats document is not an object".to_string(),
        )),
    }
}

/// Build a one-variable `stats` document from a name and a host scalar
pub fn stats_pair(name: &str, value: &ScalarValue) -> Result<Value> {
    PairCollector::transition(PairCollector::init_state(), name, stat(value)?)
}

/// Promote a single `stats` document to a finalized `stats_agg`
pub fn stats_to_agg(stats_doc: &Value) -> Result<Value> {
    let state = StatsAggregator::transition(StatsAggregator::init_state(), stats_doc)?;
    Ok(StatsAggregator::finalize(state))
}

/// Merge two `stats_agg` documents and finalize the result.
///
/// Accepts finalized or unfinalized inputs; derived statistics are ignored
/// on re-read and recomputed from the merged state.
pub fn merge(a: &Value, b: &Value) -> Result<Value> {
    let state = MergeAggregator::transition(MergeAggregator::init_state(), a)?;
    let state = MergeAggregator::transition(state, b)?;
    Ok(MergeAggregator::finalize(state))
}
