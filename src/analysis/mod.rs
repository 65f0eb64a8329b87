//! Analysis modules.
//!
//! Aggregation of per-trial evaluation records into per-configuration
//! results.

pub mod aggregator;

pub use aggregator::aggregate;
