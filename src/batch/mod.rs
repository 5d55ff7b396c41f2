//! Batch execution with per-item failure isolation.
//!
//! Every gateway operation works on one item; this module runs a list of
//! them. With continue-on-error a failing item becomes an [`ErrorRecord`] in
//! its slot and the batch carries on. Without it the first failure aborts the
//! remaining items.
//!
//! | Strategy | Behavior |
//! |----------|----------|
//! | [`BatchStrategy::Sequential`] | one item at a time (default) |
//! | [`BatchStrategy::Concurrent`] | up to N items in flight, input order kept |
//!
//! [`ErrorRecord`]: crate::types::ErrorRecord

mod executor;

pub use executor::{BatchExecutor, BatchExecutorConfig, BatchResult, BatchStrategy, ItemOutcome};
