//! Standard normal distribution helpers used by the closed-form pricer.

use std::f64::consts::SQRT_2;

use statrs::function::erf::erfc;

/// Standard normal cumulative distribution `Φ(x)`.
///
/// Evaluated as `erfc(-x / √2) / 2`, which avoids the cancellation of
/// `1 - Φ(|x|)` in the lower tail. statrs' `erfc` is accurate to roughly 1e-10
/// relative, which bounds the precision of every price.
#[inline]
pub fn normal_cdf(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    0.5 * erfc(-x / SQRT_2)
}
