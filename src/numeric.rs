//! Numeric tolerance and rounding policy shared by both solvers.
//!
//! A single absolute epsilon governs feasibility comparisons; a separate,
//! looser tolerance is used only for bottleneck-hint matching (§4.9).
//! Rounding is applied exclusively at serialization time, never during
//! intermediate computation.

/// Absolute epsilon used for feasibility/equality comparisons.
pub const EPS: f64 = 1e-9;

/// Looser tolerance used when matching bottleneck usage against a cap.
pub const HINT_EPS: f64 = 1e-6;

/// Returns true if `a` and `b` are equal within [`EPS`].
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPS
}

/// Returns true if `a` is effectively zero within [`EPS`].
pub fn is_zero(a: f64) -> bool {
    a.abs() < EPS
}

/// Round to 4 decimal places, the policy for all externally reported
/// flows and rates.
pub fn round4(x: f64) -> f64 {
    round_dp(x, 4)
}

/// Round to 6 decimal places, the policy for internal plan quantities
/// (per-recipe crafts, per-machine counts, raw consumption).
pub fn round6(x: f64) -> f64 {
    round_dp(x, 6)
}

fn round_dp(x: f64, dp: i32) -> f64 {
    let factor = 10f64.powi(dp);
    (x * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_policy() {
        assert_eq!(round4(1.0 / 3.0), 0.3333);
        assert_eq!(round6(1.0 / 3.0), 0.333333);
        assert_eq!(round4(50.00001), 50.0);
    }

    #[test]
    fn epsilon_comparisons() {
        assert!(approx_eq(1.0, 1.0 + 1e-10));
        assert!(!approx_eq(1.0, 1.0 + 1e-8));
        assert!(is_zero(1e-10));
        assert!(!is_zero(1e-8));
    }
}
