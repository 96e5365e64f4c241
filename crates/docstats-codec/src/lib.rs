//! DocStats Codec - value codec and document materializer
//!
//! This crate owns the document boundary:
//! - Encoding host scalars into tagged `stat` documents
//! - Decoding self-describing documents into typed observations
//! - Canonical (key-sorted, shortest-decimal) emission helpers
//!
//! Canonical ordering comes from `serde_json`'s sorted object representation;
//! nothing here ever has to sort keys by hand.

pub mod emit;
pub mod parse;
pub mod scalar;

pub use emit::{cents_value, int_value, num_value, round2, stamp, sum_value, uint_value};
pub use parse::{
    cents_from_f64, decode_stat, doc_type, entries, expect_object, get_f64, get_i128, get_i64,
    get_str, get_u64, validate_date,
};
pub use scalar::{encode_scalar, nat_stat, round_dec2, stat_doc};
