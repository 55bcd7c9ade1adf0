//! Off-thread reclustering for a globe viewer.
//!
//! Clustering in `clustering` is pure; this crate decides when to run it and
//! drops results that a newer camera/catalog state has already superseded.

pub mod metrics;
pub mod recluster;

pub use metrics::{Counter, Distribution, Gauge, Histogram, Metrics, MetricsSnapshot};
pub use recluster::*;
