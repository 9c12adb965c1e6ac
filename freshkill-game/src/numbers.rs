//! Numeric helpers centralizing prey rounding and safe numeric casts.

use num_traits::cast::cast;

/// Round a prey amount to two decimal places, returning 0.0 for non-finite values.
#[must_use]
pub fn round_prey(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    (value * 100.0).round() / 100.0
}

/// Sanitize an externally supplied prey amount: non-finite and negative
/// values collapse to zero.
#[must_use]
pub const fn sanitize_amount(amount: f64) -> f64 {
    if amount.is_finite() {
        amount.max(0.0)
    } else {
        0.0
    }
}

/// Convert a count to f64 while allowing precision loss in a single location.
#[must_use]
pub fn count_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(f64::MAX)
}

/// Round a f64 and clamp it to the i64 range, returning 0 for non-finite values.
#[must_use]
pub fn round_f64_to_i64(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    let min = cast::<i64, f64>(i64::MIN).unwrap_or(f64::MIN);
    let max = cast::<i64, f64>(i64::MAX).unwrap_or(f64::MAX);
    let clamped = value.clamp(min, max).round();
    cast::<f64, i64>(clamped).unwrap_or(0)
}

/// Convert i64 to f64 while allowing precision loss in a single location.
#[must_use]
pub fn i64_to_f64(value: i64) -> f64 {
    cast::<i64, f64>(value).unwrap_or(0.0)
}

/// Whether two prey amounts agree within the pile's rounding tolerance.
#[must_use]
pub fn prey_eq(lhs: f64, rhs: f64) -> bool {
    (lhs - rhs).abs() < crate::constants::PREY_TOLERANCE
}
