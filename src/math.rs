//! Shared numeric helpers for probability calculation.
//!
//! The normal CDF is computed through a rational-polynomial complementary
//! error function (fractional error below 1.3e-7 everywhere), so no external
//! statistical crate is needed.

/// Saturation bound for the standard normal CDF. Beyond this the result is
/// indistinguishable from 0/1 at double precision for our purposes.
const NORMAL_CDF_Z_BOUND: f64 = 8.0;

/// Complementary error function.
///
/// Rational Chebyshev approximation with fractional error < 1.3e-7 for all x.
fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    let ans = t
        * (-z * z - 1.26551223
            + t * (1.00002368
                + t * (0.37409196
                    + t * (0.09678418
                        + t * (-0.18628806
                            + t * (0.27886807
                                + t * (-1.13520398
                                    + t * (1.48851587
                                        + t * (-0.82215223 + t * 0.17087277)))))))))
            .exp();
    if x >= 0.0 {
        ans
    } else {
        2.0 - ans
    }
}

/// Cumulative distribution function of the standard normal.
///
/// Uses the error function identity Phi(z) = erfc(-z / sqrt(2)) / 2.
/// Saturates to 0.0 / 1.0 for |z| > 8 rather than erroring.
pub fn normal_cdf(z: f64) -> f64 {
    if z.is_nan() {
        return f64::NAN;
    }
    if z <= -NORMAL_CDF_Z_BOUND {
        return 0.0;
    }
    if z >= NORMAL_CDF_Z_BOUND {
        return 1.0;
    }
    0.5 * erfc(-z / std::f64::consts::SQRT_2)
}

/// Logistic function for win probability calculation.
#[inline]
pub fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
