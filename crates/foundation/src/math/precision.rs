//! Deterministic float handling.
//!
//! Cluster sets are compared structurally by renderers, so every float that
//! feeds an ordering or a key goes through the helpers here:
//! - `canonical_f64` folds `-0.0` and NaN payloads.
//! - `stable_total_cmp_f64` gives a total order for sorting.
//! - `cell_index` snaps a coordinate onto a fixed-size grid.

use core::cmp::Ordering;

/// Canonicalize a floating-point value for deterministic ordering.
///
/// Rules:
/// - `-0.0` becomes `0.0`
/// - all NaNs become a single canonical NaN
pub fn canonical_f64(v: f64) -> f64 {
    if v == 0.0 {
        // Handles +0.0 and -0.0.
        0.0
    } else if v.is_nan() {
        f64::NAN
    } else {
        v
    }
}

/// Deterministic total ordering for floats.
///
/// Prefer this any time you sort floats or use them in ordered keys.
pub fn stable_total_cmp_f64(a: f64, b: f64) -> Ordering {
    canonical_f64(a).total_cmp(&canonical_f64(b))
}

/// Grid row/column containing `v` for cells of `cell_size` degrees.
///
/// The cell origin is `floor(v / s) * s`. Returns `None` when the index does
/// not fit in an `i64` (e.g. a vanishingly small `cell_size`) or is not finite.
pub fn cell_index(v: f64, cell_size: f64) -> Option<i64> {
    let idx = (v / cell_size).floor();
    // i64::MIN as f64 is exact; i64::MAX as f64 rounds up to 2^63.
    if idx.is_finite() && idx >= i64::MIN as f64 && idx < i64::MAX as f64 {
        Some(idx as i64)
    } else {
        None
    }
}
