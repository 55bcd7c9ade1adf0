//! Viewer-side state on top of computed cluster sets: which marker a pick
//! hits, and what the selection does to drill-down artifacts and the camera.

pub mod picking;
pub mod selection;

pub use picking::*;
pub use selection::*;
