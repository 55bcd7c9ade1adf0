pub mod geo;
pub mod precision;

pub use geo::*;
pub use precision::*;
