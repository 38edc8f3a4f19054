//! Scalar kernels shared by the reference formula and the physics helpers.
//!
//! - `gaussian(x, μ, σ) = exp(-((x - μ)/σ)^2)`: 1 at the optimum, decaying with distance
//! - `logistic(x, x0, w) = 1 / (1 + exp(-(x - x0)/w))`
//!
//! Numerical notes:
//! - The Gaussian has no `1/2` factor: `σ` is the distance at which the score
//!   falls to `1/e`, not a standard deviation.
//! - The logistic is evaluated with the sign of the exponent chosen so the
//!   intermediate `exp` never overflows for large `|x - x0|`.

/// Gaussian penalty in `[0, 1]`, equal to 1 at `optimal`.
pub fn gaussian(x: f64, optimal: f64, sigma: f64) -> f64 {
    let z = (x - optimal) / sigma;
    (-(z * z)).exp()
}

/// Logistic sigmoid centered at `center` with width `width`.
pub fn logistic(x: f64, center: f64, width: f64) -> f64 {
    let z = (x - center) / width;
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Clamp to `[lo, hi]`. NaN maps to `lo`.
pub fn clamp(x: f64, lo: f64, hi: f64) -> f64 {
    if x.is_nan() { lo } else { x.clamp(lo, hi) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gaussian_peaks_at_optimum() {
        assert_eq!(gaussian(1.0, 1.0, 0.85), 1.0);
        let one_sigma = gaussian(1.85, 1.0, 0.85);
        assert!((one_sigma - (-1.0f64).exp()).abs() < 1e-12);
        assert!(gaussian(100.0, 1.0, 0.85) >= 0.0);
    }

    #[test]
    fn logistic_is_stable_far_from_center() {
        assert!((logistic(25.0, 25.0, 5.0) - 0.5).abs() < 1e-15);
        assert!(logistic(1e6, 25.0, 5.0) <= 1.0);
        assert!(logistic(-1e6, 25.0, 5.0) >= 0.0);
        assert!(logistic(-1e6, 25.0, 5.0).is_finite());
    }

    #[test]
    fn clamp_handles_nan() {
        assert_eq!(clamp(f64::NAN, 0.1, 20.0), 0.1);
        assert_eq!(clamp(30.0, 0.1, 20.0), 20.0);
    }
}
