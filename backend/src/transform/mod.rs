//! Transformation module.
//!
//! Turns the raw, mixed-granularity table into the two dashboard tables:
//! - National: official country-level counters in long form
//! - Regional: per-region series with deltas, fatality rate and outbreak-day ranks
//! - Grouper: order-preserving grouping shared by both
//! - Checks: invariant verification of the derived tables
//! - Pipeline: fetch + transform entry points

pub mod checks;
pub mod grouper;
pub mod national;
pub mod pipeline;
pub mod regional;

pub use grouper::{group_by_key, group_ranges};
pub use national::national_series;
pub use pipeline::*;
pub use regional::{fatality_rate, regional_series, CONFIRMED_THRESHOLD, DEATHS_THRESHOLD};
