//! Numeric conversion helpers centralizing lossy casts between tick counts
//! and simulation time.

use num_traits::cast::cast;

/// Number of fixed steps needed to cover `duration`, rounding up. Returns 0
/// for non-finite or non-positive inputs.
#[must_use]
pub fn step_count(duration: f64, step: f64) -> usize {
    if !duration.is_finite() || !step.is_finite() || duration <= 0.0 || step <= 0.0 {
        return 0;
    }
    // Absorb representation error so 1.0 / 0.1 does not round up to 11.
    let ratio = (duration / step - 1e-9).ceil().max(0.0);
    cast::<f64, usize>(ratio).unwrap_or(usize::MAX)
}

/// Convert a tick index to `f64` while allowing precision loss in a single
/// location.
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(f64::MAX)
}
