//! Starting points for the Washburn–Rideal fit.
//!
//! Two sources of candidates:
//!
//! - a linearisation: for `z > 0` the relation is
//!   `t = p·z² − q·ln z − r` with `p = α/2β`, `q = 1/α`, which is linear in
//!   `(p, q, r)`; one OLS solve gives `α = 1/q`, `β = α/2p`
//! - a deterministic log-spaced grid over `α` with `β` tied to the quadratic
//!   coefficient, in case the linearisation returns non-physical signs
//!
//! Candidates are scored by their SSE and the best one seeds Levenberg–Marquardt.

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

use crate::math::{LeastSquaresProblem, solve_least_squares};

const ALPHA_GRID_MIN: f64 = 1e-3;
const ALPHA_GRID_MAX: f64 = 1e3;
const ALPHA_GRID_STEPS: usize = 61;

/// Generate `steps` log-spaced points between `min` and `max` (inclusive).
///
/// Returns `None` for a non-positive or inverted range, or fewer than 2 steps.
pub fn log_space(min: f64, max: f64, steps: usize) -> Option<Vec<f64>> {
    if !(min.is_finite() && max.is_finite() && min > 0.0 && max > min) || steps < 2 {
        return None;
    }

    let ln_min = min.ln();
    let ln_max = max.ln();
    let step = (ln_max - ln_min) / (steps as f64 - 1.0);
    Some((0..steps).map(|i| (ln_min + step * i as f64).exp()).collect())
}

/// Linearised estimate of `(α, β)`, if it has physical signs.
pub fn linearised_seed(depths: &[f64], times: &[f64]) -> Option<[f64; 2]> {
    let rows: Vec<(f64, f64)> = depths
        .iter()
        .zip(times)
        .filter(|(z, _)| **z > 0.0)
        .map(|(&z, &t)| (z, t))
        .collect();
    if rows.len() < 3 {
        return None;
    }

    let mut a = DMatrix::<f64>::zeros(rows.len(), 3);
    let mut b = DVector::<f64>::zeros(rows.len());
    for (i, &(z, t)) in rows.iter().enumerate() {
        a[(i, 0)] = z * z;
        a[(i, 1)] = -z.ln();
        a[(i, 2)] = -1.0;
        b[i] = t;
    }

    let coef = solve_least_squares(&a, &b)?;
    let (p, q) = (coef[0], coef[1]);
    if !(p > 0.0 && q > 0.0) {
        return None;
    }
    let alpha = 1.0 / q;
    let beta = alpha / (2.0 * p);
    (alpha.is_finite() && beta.is_finite()).then_some([alpha, beta])
}

/// Grid of `(α, β)` candidates sharing the least-squares quadratic coefficient
/// `c ≈ α/2β` of `t ≈ c·z²`.
pub fn grid_seeds(depths: &[f64], times: &[f64]) -> Vec<[f64; 2]> {
    let (num, den) = depths
        .iter()
        .zip(times)
        .fold((0.0, 0.0), |(n, d), (&z, &t)| (n + t * z * z, d + z.powi(4)));
    let c = num / den;
    if !(c.is_finite() && c > 0.0) {
        return Vec::new();
    }

    log_space(ALPHA_GRID_MIN, ALPHA_GRID_MAX, ALPHA_GRID_STEPS)
        .unwrap_or_default()
        .into_iter()
        .map(|alpha| [alpha, alpha / (2.0 * c)])
        .collect()
}

/// Pick the candidate with the lowest finite SSE.
///
/// Candidates are scored in parallel; ties go to the earlier candidate so the
/// choice is deterministic.
pub fn best_seed<P>(problem: &P, candidates: &[[f64; 2]]) -> Option<[f64; 2]>
where
    P: LeastSquaresProblem + Sync,
{
    candidates
        .par_iter()
        .enumerate()
        .filter_map(|(idx, p)| {
            let sse = problem.sse(p);
            sse.is_finite().then_some((idx, sse, *p))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
        .map(|(_, _, p)| p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::washburn_rideal_time;

    #[test]
    fn log_space_includes_endpoints() {
        let v = log_space(0.1, 10.0, 5).unwrap();
        assert!((v[0] - 0.1).abs() < 1e-12);
        assert!((v[v.len() - 1] - 10.0).abs() < 1e-12);
        assert!(log_space(0.0, 1.0, 5).is_none());
        assert!(log_space(1.0, 2.0, 1).is_none());
    }

    #[test]
    fn linearised_seed_is_exact_on_clean_data() {
        let z: Vec<f64> = (1..=20).map(|i| i as f64 * 0.5).collect();
        let t: Vec<f64> = z.iter().map(|&v| washburn_rideal_time(v, 1.5, 2.0)).collect();
        let [alpha, beta] = linearised_seed(&z, &t).unwrap();
        assert!((alpha - 1.5).abs() < 1e-8, "alpha={alpha}");
        assert!((beta - 2.0).abs() < 1e-8, "beta={beta}");
    }

    #[test]
    fn grid_seeds_are_positive() {
        let z = [1.0, 2.0, 3.0];
        let t = [0.5, 2.0, 4.5];
        let seeds = grid_seeds(&z, &t);
        assert_eq!(seeds.len(), ALPHA_GRID_STEPS);
        assert!(seeds.iter().all(|[a, b]| *a > 0.0 && *b > 0.0));
    }
}
