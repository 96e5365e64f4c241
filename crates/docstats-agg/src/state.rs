//! Per-entity aggregation state
//!
//! A mapping from variable name to accumulator. Accumulators are created
//! lazily on the first observation of a name and stay monomorphic for the
//! lifetime of the aggregation. The state is owned by exactly one
//! aggregation at a time; there is no sharing and no locking.

use docstats_codec::{decode_stat, entries, expect_object, stamp};
use docstats_core::{Result, Stat, StatsError};
use fxhash::FxHashMap;
use serde_json::{Map, Value};

use crate::entry::{Accumulator, DocForm};

/// Aggregation state for one entity: `variable name → accumulator`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityState {
    entries: FxHashMap<String, Accumulator>,
}

impl EntityState {
    /// Empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of variables tracked
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no variable has been observed yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fold one observation for one variable into the state
    pub fn observe(&mut self, name: &str, stat: &Stat) -> Result<()> {
        if name.is_empty() {
            return Err(StatsError::MalformedDocument(
                "empty variable name".to_string(),
            ));
        }
        match self.entries.get_mut(name) {
            Some(acc) => acc.update(name, stat),
            None => {
                let acc = Accumulator::init(stat)?;
                self.entries.insert(name.to_string(), acc);
                Ok(())
            }
        }
    }

    /// Fold every named observation of a `stats` document into the state
    pub fn observe_doc(&mut self, stats: &Value) -> Result<()> {
        for (name, value) in entries(stats)? {
            let stat = decode_stat(value)?;
            self.observe(name, &stat)?;
        }
        Ok(())
    }

    /// Merge one parsed accumulator in under a name (union of key sets;
    /// one-sided keys are adopted verbatim)
    pub fn absorb(&mut self, name: String, acc: Accumulator) -> Result<()> {
        match self.entries.get_mut(&name) {
            Some(existing) => existing.merge(&name, acc),
            None => {
                self.entries.insert(name, acc);
                Ok(())
            }
        }
    }

    /// Merge every entry of a `stats_agg` document into the state
    pub fn absorb_doc(&mut self, agg: &Value) -> Result<()> {
        for (name, value) in entries(agg)? {
            let obj = expect_object(value, "aggregate entry")?;
            let acc = Accumulator::from_doc(obj, DocForm::External)?;
            self.absorb(name.to_string(), acc)?;
        }
        Ok(())
    }

    /// Merge another partial state into this one
    pub fn combine(&mut self, other: EntityState) -> Result<()> {
        for (name, acc) in other.entries {
            self.absorb(name, acc)?;
        }
        Ok(())
    }

    /// Emit the portable (unrounded) state document
    pub fn to_doc(&self) -> Value {
        self.emit(false)
    }

    /// Emit the finalized `stats_agg` document
    pub fn finalize(&self) -> Value {
        self.emit(true)
    }

    fn emit(&self, finalized: bool) -> Value {
        let mut obj = Map::new();
        stamp(&mut obj, "stats_agg");
        for (name, acc) in &self.entries {
            let entry = if finalized { acc.finalize() } else { acc.to_doc() };
            obj.insert(name.clone(), entry);
        }
        Value::Object(obj)
    }

    /// Rebuild a state from its portable document form
    pub fn from_doc(doc: &Value) -> Result<Self> {
        let mut state = EntityState::new();
        for (name, value) in entries(doc)? {
            let obj = expect_object(value, "aggregate entry")?;
            let acc = Accumulator::from_doc(obj, DocForm::State)?;
            state.entries.insert(name.to_string(), acc);
        }
        Ok(state)
    }
}
