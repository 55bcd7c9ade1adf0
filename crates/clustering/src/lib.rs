//! Zoom-adaptive station clustering.
//!
//! Every entry point is a pure function of its arguments: no state is kept
//! between calls, so recomputation may run on any thread and results for the
//! same snapshot compare equal.

pub mod cluster;
pub mod config;
pub mod diff;
pub mod drilldown;
pub mod grid;
pub mod key;
pub mod pipeline;
pub mod proximity;
pub mod tiers;

#[cfg(test)]
mod testing;

pub use cluster::*;
pub use config::*;
pub use diff::*;
pub use drilldown::*;
pub use grid::*;
pub use key::*;
pub use pipeline::*;
pub use proximity::*;
pub use tiers::*;
