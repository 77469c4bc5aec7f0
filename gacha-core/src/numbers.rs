//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

use crate::constants::{PERCENT_SCALE, PROBABILITY_DECIMALS};

/// Round to a fixed number of decimal places, returning 0.0 for non-finite values.
#[must_use]
pub fn round_to_places(value: f64, places: i32) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let factor = 10_f64.powi(places);
    (value * factor).round() / factor
}

/// Share of `part` in `total` as a percentage rounded to two decimals.
#[must_use]
pub fn percent_of(part: f64, total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    round_to_places(part / total * PERCENT_SCALE, PROBABILITY_DECIMALS)
}

/// Convert a count to f64 while allowing precision loss in a single location.
#[must_use]
pub fn count_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

/// Convert a pity counter to f64 while allowing precision loss in a single location.
#[must_use]
pub fn i64_to_f64(value: i64) -> f64 {
    cast::<i64, f64>(value).unwrap_or(0.0)
}
