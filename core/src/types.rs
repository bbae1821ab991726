//! Shared primitive types used across the metrics pipeline.

/// The canonical run identifier (a uuid v4 string).
pub type RunId = String;

/// Zero-based position of a record in its input table.
pub type RowIndex = usize;

/// Average order value applied when converting sales into revenue.
pub const DEFAULT_AVERAGE_ORDER_VALUE: f64 = 50.0;

/// Symmetric bound of the cost perturbation factor (±20%).
pub const DEFAULT_RANDOMNESS_BOUND: f64 = 0.20;

/// Round to two decimal places, ties to even.
///
/// Every derived metric is rounded at the point it is computed,
/// never at display time.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
