//! Model evaluation for the capillary-flow laws.
//!
//! - Washburn: `x(t) = k·√t`
//! - offset Washburn: `x(t) = k·√(t − a) + b`
//! - Washburn–Rideal, written as time against depth:
//!
//! ```text
//! t(z) = (α / 2β)·z² − (1/α)·ln(α·z / √β)     for z > 0
//! t(0) = 0
//! ```
//!
//! The Washburn–Rideal relation has no closed-form inverse. For `z > 0` it has
//! a single minimum at `z* = √β / α` where `t(z*) = 1 / (2α)`; the ascending
//! branch `z ≥ z*` is the one reached from the plain Washburn seed
//! `z₀ = √(2β/α · t)`.
//!
//! These are plain functions of their parameters. Input validation happens in
//! the fitters, not here.

/// `k·√t`.
pub fn washburn(t: f64, k: f64) -> f64 {
    k * t.sqrt()
}

/// `k·√(t − a) + b`.
pub fn washburn_offset(t: f64, k: f64, a: f64, b: f64) -> f64 {
    k * (t - a).sqrt() + b
}

/// Washburn–Rideal time at depth `z`.
///
/// Piecewise: exactly `0` at `z = 0`, so the logarithm is only evaluated for
/// `z > 0`.
pub fn washburn_rideal_time(z: f64, alpha: f64, beta: f64) -> f64 {
    if z == 0.0 {
        return 0.0;
    }
    alpha / (2.0 * beta) * z * z - (alpha * z / beta.sqrt()).ln() / alpha
}

/// `dt/dz` of the Washburn–Rideal relation (for `z > 0`).
pub fn washburn_rideal_slope(z: f64, alpha: f64, beta: f64) -> f64 {
    alpha * z / beta - 1.0 / (alpha * z)
}

/// `[∂t/∂α, ∂t/∂β]` at depth `z`; zero at `z = 0`.
pub fn washburn_rideal_gradient(z: f64, alpha: f64, beta: f64) -> [f64; 2] {
    if z == 0.0 {
        return [0.0, 0.0];
    }
    let log_arg = (alpha * z / beta.sqrt()).ln();
    let d_alpha = z * z / (2.0 * beta) + (log_arg - 1.0) / (alpha * alpha);
    let d_beta = -alpha * z * z / (2.0 * beta * beta) + 1.0 / (2.0 * alpha * beta);
    [d_alpha, d_beta]
}

/// Plain-Washburn approximation of the Washburn–Rideal depth at time `t`,
/// obtained by dropping the logarithmic term.
pub fn washburn_rideal_seed(t: f64, alpha: f64, beta: f64) -> f64 {
    (2.0 * beta / alpha * t).sqrt()
}

/// Location `(z*, t(z*))` of the minimum of the Washburn–Rideal relation.
pub fn washburn_rideal_minimum(alpha: f64, beta: f64) -> (f64, f64) {
    (beta.sqrt() / alpha, 1.0 / (2.0 * alpha))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn washburn_rideal_is_zero_at_origin() {
        let t = washburn_rideal_time(0.0, 1.0, 4.0);
        assert_eq!(t, 0.0);
        assert_eq!(washburn_rideal_gradient(0.0, 1.0, 4.0), [0.0, 0.0]);
    }

    #[test]
    fn washburn_rideal_minimum_matches_slope_root() {
        let (alpha, beta) = (1.3, 2.7);
        let (z_star, t_min) = washburn_rideal_minimum(alpha, beta);
        assert!(washburn_rideal_slope(z_star, alpha, beta).abs() < 1e-12);
        assert!((washburn_rideal_time(z_star, alpha, beta) - t_min).abs() < 1e-12);
        assert!(washburn_rideal_time(z_star * 0.9, alpha, beta) > t_min);
        assert!(washburn_rideal_time(z_star * 1.1, alpha, beta) > t_min);
    }

    #[test]
    fn washburn_rideal_gradient_matches_finite_differences() {
        let (alpha, beta) = (0.8, 3.0);
        let h = 1e-6;
        for &z in &[0.3, 1.0, 2.5, 7.0] {
            let [ga, gb] = washburn_rideal_gradient(z, alpha, beta);
            let fa = (washburn_rideal_time(z, alpha + h, beta)
                - washburn_rideal_time(z, alpha - h, beta))
                / (2.0 * h);
            let fb = (washburn_rideal_time(z, alpha, beta + h)
                - washburn_rideal_time(z, alpha, beta - h))
                / (2.0 * h);
            assert!((ga - fa).abs() < 1e-6 * (1.0 + fa.abs()), "z={z}: {ga} vs {fa}");
            assert!((gb - fb).abs() < 1e-6 * (1.0 + fb.abs()), "z={z}: {gb} vs {fb}");
        }
    }

    #[test]
    fn seed_tracks_quadratic_term() {
        // For large z the log correction is small relative to the quadratic term.
        let (alpha, beta) = (1.0, 4.0);
        let z = 50.0;
        let t = washburn_rideal_time(z, alpha, beta);
        let z0 = washburn_rideal_seed(t, alpha, beta);
        assert!((z0 - z).abs() / z < 0.01, "z0={z0}");
    }

    #[test]
    fn washburn_offset_reduces_to_washburn() {
        assert!((washburn_offset(9.0, 2.0, 0.0, 0.0) - washburn(9.0, 2.0)).abs() < 1e-15);
        assert!((washburn_offset(10.0, 2.0, 1.0, 5.0) - 11.0).abs() < 1e-12);
    }
}
