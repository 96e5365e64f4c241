//! DocStats Aggregation - mergeable statistical summaries
//!
//! This crate provides the aggregation pipeline over self-describing
//! documents:
//! - Numeric kernels (Welford online + parallel merge) and count-map kernels
//! - The per-variable accumulator union and per-entity state
//! - Aggregate protocol drivers (transition/combine/serialize/deserialize/
//!   finalize) for `stats → stats_agg` and `stats_agg → stats_agg`
//! - The pure scalar-function surface (`stat`, `stats`, `stats_to_agg`,
//!   `merge`)

pub mod counts;
pub mod driver;
pub mod entry;
pub mod functions;
pub mod numeric;
pub mod state;

pub use driver::{MergeAggregator, PairCollector, StatsAggregator};
pub use entry::{Accumulator, DocForm};
pub use state::EntityState;
