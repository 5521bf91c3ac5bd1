//! Slice helpers shared by the indicator and feature code.

use statrs::statistics::Statistics;

/// Last `len` values (all of them when the slice is shorter).
pub fn tail(values: &[f64], len: usize) -> &[f64] {
    &values[values.len().saturating_sub(len)..]
}

/// Arithmetic mean, 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().mean()
    }
}
