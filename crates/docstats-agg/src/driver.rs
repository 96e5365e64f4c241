//! Aggregate protocol drivers
//!
//! Three logical aggregates, each exposed as transition/combine/serialize/
//! deserialize/finalize entry points for the host's aggregate state machine:
//!
//! - `PairCollector`: `(name, stat)` pairs → a `stats` document
//! - `StatsAggregator`: `stats` documents → a finalized `stats_agg`
//! - `MergeAggregator`: `stats_agg` documents → a finalized `stats_agg`
//!
//! All entry points are pure and parallel-safe; a state is owned by one
//! executor at a time and crosses worker boundaries only through
//! `serialize`/`deserialize`.

use docstats_codec::{expect_object, stamp};
use docstats_core::{Result, StatsError};
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::state::EntityState;

/// Convenience collector building a `stats` document from `(name, stat)`
/// pairs. No statistics are computed here.
pub struct PairCollector;

impl PairCollector {
    /// Initial collector state: an empty document
    pub fn init_state() -> Value {
        Value::Object(Map::new())
    }

    /// Append one `(name, stat)` pair, stamping the discriminator
    pub fn transition(state: Value, name: &str, stat: Value) -> Result<Value> {
        let mut obj = match state {
            Value::Object(obj) => obj,
            _ => {
                return Err(StatsError::MalformedDocument(
                    "collector state is not an object".to_string(),
                ))
            }
        };
        if name.is_empty() {
            return Err(StatsError::MalformedDocument(
                "empty variable name".to_string(),
            ));
        }
        if name == "type" {
            return Err(StatsError::MalformedDocument(
                "variable name 'type' is reserved".to_string(),
            ));
        }
        expect_object(&stat, "stat")?;

        obj.insert(name.to_string(), stat);
        stamp(&mut obj, "stats");
        Ok(Value::Object(obj))
    }
}

/// Aggregate over `stats` documents (`stats → stats_agg`)
pub struct StatsAggregator;

impl StatsAggregator {
    /// Fresh, empty aggregation state
    pub fn init_state() -> EntityState {
        EntityState::new()
    }

    /// Fold one `stats` document into the state
    pub fn transition(mut state: EntityState, stats: &Value) -> Result<EntityState> {
        trace!(variables = state.len(), "stats transition");
        state.observe_doc(stats)?;
        Ok(state)
    }

    /// Merge two partial states (parallel aggregation)
    pub fn combine(mut a: EntityState, b: EntityState) -> Result<EntityState> {
        debug!(left = a.len(), right = b.len(), "combining partial states");
        a.combine(b)?;
        Ok(a)
    }

    /// Serialize the state for worker-to-leader transport.
    ///
    /// The wire form is the unrounded state document: stable across
    /// versions even when the in-memory layout changes.
    pub fn serialize(state: &EntityState) -> Result<Vec<u8>> {
        trace!(variables = state.len(), "serializing state for transport");
        serde_json::to_vec(&state.to_doc())
            .map_err(|e| StatsError::MalformedDocument(format!("state serialization failed: {}", e)))
    }

    /// Reconstitute a state serialized by `serialize`
    pub fn deserialize(bytes: &[u8]) -> Result<EntityState> {
        let doc: Value = serde_json::from_slice(bytes)
            .map_err(|e| StatsError::MalformedDocument(format!("state deserialization failed: {}", e)))?;
        EntityState::from_doc(&doc)
    }

    /// Emit the finalized `stats_agg` document and drop the state
    pub fn finalize(state: EntityState) -> Value {
        state.finalize()
    }
}

/// Aggregate over `stats_agg` documents (`stats_agg → stats_agg`)
pub struct MergeAggregator;

impl MergeAggregator {
    /// Fresh, empty aggregation state
    pub fn init_state() -> EntityState {
        EntityState::new()
    }

    /// Merge one `stats_agg` document into the state
    pub fn transition(mut state: EntityState, agg: &Value) -> Result<EntityState> {
        trace!(variables = state.len(), "merge transition");
        state.absorb_doc(agg)?;
        Ok(state)
    }

    /// Merge two partial states (parallel aggregation)
    pub fn combine(a: EntityState, b: EntityState) -> Result<EntityState> {
        StatsAggregator::combine(a, b)
    }

    /// Serialize the state for worker-to-leader transport
    pub fn serialize(state: &EntityState) -> Result<Vec<u8>> {
        StatsAggregator::serialize(state)
    }

    /// Reconstitute a state serialized by `serialize`
    pub fn deserialize(bytes: &[u8]) -> Result<EntityState> {
        StatsAggregator::deserialize(bytes)
    }

    /// Emit the finalized `stats_agg` document and drop the state
    pub fn finalize(state: EntityState) -> Value {
        state.finalize()
    }
}
