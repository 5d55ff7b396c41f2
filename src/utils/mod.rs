//! Utility functions shared across modules.

pub mod recover;
pub mod value;

pub use recover::{parse_or_recover, Recovery};
