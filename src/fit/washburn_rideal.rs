//! Washburn–Rideal fit and inversion.
//!
//! Two separate stages:
//!
//! 1. **Fit.** `t(z)` has a closed form while `z(t)` does not, so we fit time as a
//!    function of depth with Levenberg–Marquardt over `(α, β)`. Failures here are
//!    [`FitError`]s.
//! 2. **Inversion.** Answering "depth at time t" solves `t(z) − t = 0` per query
//!    point with a bracketed Newton iteration seeded by the plain Washburn
//!    approximation. Failures here are per-point [`InversionError`]s.
//!
//! For `z > 0` the relation dips to a minimum `t_min = 1/(2α)` at `z* = √β/α`
//! before rising. The inversion returns the ascending branch `z ≥ z*`; query
//! times in `(0, t_min)` have no solution there and are reported as
//! [`InversionError::BelowMinimum`]. `t = 0` maps to `z = 0`.

use nalgebra::DMatrix;
use rayon::prelude::*;
use serde::Serialize;

use crate::domain::{FitOptions, FitQuality, ModelKind, ResidualAxis, SolverOptions};
use crate::fit::error::{DomainError, FitError, InversionError};
use crate::fit::seed_grid::{best_seed, grid_seeds, linearised_seed};
use crate::fit::validation::{check_time, require_points, validate_series};
use crate::math::{LeastSquaresProblem, LmFailure, RootError, levenberg_marquardt, newton_bracketed};
use crate::models::{
    washburn_rideal_gradient, washburn_rideal_minimum, washburn_rideal_seed, washburn_rideal_slope,
    washburn_rideal_time,
};

/// Upper-bracket doublings allowed before giving up on a query.
const MAX_BRACKET_EXPANSIONS: usize = 64;

/// A fitted Washburn–Rideal model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WashburnRidealFit {
    pub alpha: f64,
    pub beta: f64,
    pub quality: FitQuality,
    /// Solver settings used by [`WashburnRidealFit::position`].
    pub inversion: SolverOptions,
}

impl WashburnRidealFit {
    /// Build a model from known parameters (no fit).
    pub fn from_params(alpha: f64, beta: f64, inversion: SolverOptions) -> Self {
        Self {
            alpha,
            beta,
            quality: FitQuality::new(0.0, 0, 0, ResidualAxis::Time),
            inversion,
        }
    }

    /// Time at depth `z` (the fitted direction).
    pub fn time(&self, z: f64) -> Result<f64, DomainError> {
        if !(z.is_finite() && z >= 0.0) {
            return Err(DomainError::position(z));
        }
        Ok(washburn_rideal_time(z, self.alpha, self.beta))
    }

    /// Minimum `(z*, t_min)` of the fitted relation.
    pub fn minimum(&self) -> (f64, f64) {
        washburn_rideal_minimum(self.alpha, self.beta)
    }

    /// Depth at time `t`, by numeric inversion.
    pub fn position(&self, t: f64) -> Result<f64, InversionError> {
        let t = check_time(t)?;
        if t == 0.0 {
            return Ok(0.0);
        }

        let (alpha, beta) = (self.alpha, self.beta);
        let (z_star, t_min) = self.minimum();
        if !(z_star.is_finite() && t_min.is_finite()) {
            return Err(InversionError::NonFinite { t });
        }
        if t < t_min && t_min - t > self.inversion.rel_tol * t_min {
            return Err(InversionError::BelowMinimum { t, t_min });
        }
        // Within rounding of the turning point there is no sign change to bracket.
        if t <= t_min.max(washburn_rideal_time(z_star, alpha, beta)) {
            return Ok(z_star);
        }

        let z0 = washburn_rideal_seed(t, alpha, beta);
        if !z0.is_finite() {
            return Err(InversionError::NonFinite { t });
        }

        // t(z) < (α/2β)·z² on the ascending branch, so the seed undershoots;
        // grow the upper end until it covers the query.
        let mut hi = z0.max(z_star);
        let mut expansions = 0;
        loop {
            let t_hi = washburn_rideal_time(hi, alpha, beta);
            if !t_hi.is_finite() {
                return Err(InversionError::NonFinite { t });
            }
            if t_hi >= t {
                break;
            }
            expansions += 1;
            if expansions > MAX_BRACKET_EXPANSIONS {
                return Err(InversionError::NotConverged {
                    t,
                    iterations: expansions,
                    last_z: hi,
                });
            }
            hi *= 2.0;
        }

        let residual = |z: f64| {
            (
                washburn_rideal_time(z, alpha, beta) - t,
                washburn_rideal_slope(z, alpha, beta),
            )
        };

        newton_bracketed(residual, z0, z_star, hi, &self.inversion)
            .map(|root| root.x)
            .map_err(|e| match e {
                RootError::Iterations { iterations, last } => InversionError::NotConverged {
                    t,
                    iterations,
                    last_z: last,
                },
                RootError::NonFinite { .. } => InversionError::NonFinite { t },
                RootError::NotBracketed { .. } => InversionError::BelowMinimum { t, t_min },
            })
    }

    /// Depth for each query time.
    ///
    /// Each query is solved independently (in parallel); the output has one
    /// entry per input, in order, and a failure at one index never affects
    /// another.
    pub fn positions(&self, times: &[f64]) -> Vec<Result<f64, InversionError>> {
        times.par_iter().map(|&t| self.position(t)).collect()
    }
}

struct WashburnRidealProblem<'a> {
    times: &'a [f64],
    depths: &'a [f64],
}

impl LeastSquaresProblem for WashburnRidealProblem<'_> {
    fn residual_len(&self) -> usize {
        self.times.len()
    }

    fn param_len(&self) -> usize {
        2
    }

    fn residuals(&self, params: &[f64], out: &mut [f64]) {
        let (alpha, beta) = (params[0], params[1]);
        for (i, (&z, &t)) in self.depths.iter().zip(self.times).enumerate() {
            out[i] = washburn_rideal_time(z, alpha, beta) - t;
        }
    }

    fn jacobian(&self, params: &[f64], out: &mut DMatrix<f64>) {
        let (alpha, beta) = (params[0], params[1]);
        for (i, &z) in self.depths.iter().enumerate() {
            let [d_alpha, d_beta] = washburn_rideal_gradient(z, alpha, beta);
            out[(i, 0)] = d_alpha;
            out[(i, 1)] = d_beta;
        }
    }
}

/// Fit the Washburn–Rideal relation with default solver options.
pub fn fit_washburn_rideal(times: &[f64], depths: &[f64]) -> Result<WashburnRidealFit, FitError> {
    fit_washburn_rideal_with(times, depths, &FitOptions::default())
}

/// Fit the Washburn–Rideal relation.
///
/// Points at `z = 0` are accepted (they map to `t = 0` exactly) but carry no
/// information about `(α, β)`; at least two points with `z > 0` are required.
pub fn fit_washburn_rideal_with(
    times: &[f64],
    depths: &[f64],
    opts: &FitOptions,
) -> Result<WashburnRidealFit, FitError> {
    let model = ModelKind::WashburnRideal;
    validate_series(times, depths)?;

    let informative = depths.iter().filter(|&&z| z > 0.0).count();
    require_points(model, informative, 2)?;

    let problem = WashburnRidealProblem { times, depths };

    let mut candidates: Vec<[f64; 2]> = linearised_seed(depths, times).into_iter().collect();
    candidates.extend(grid_seeds(depths, times));
    let seed = best_seed(&problem, &candidates).ok_or_else(|| FitError::NonPhysical {
        model,
        detail: "no starting point with finite residuals".to_string(),
    })?;

    let report = levenberg_marquardt(&problem, &seed, &opts.fit).map_err(|e| match e {
        LmFailure::NotConverged { iterations, sse, .. } => FitError::NotConverged {
            model,
            iterations,
            sse,
        },
        other => FitError::NonPhysical {
            model,
            detail: other.to_string(),
        },
    })?;

    let (alpha, beta) = (report.params[0], report.params[1]);
    if !(alpha.is_finite() && beta.is_finite() && alpha > 0.0 && beta > 0.0) {
        return Err(FitError::NonPhysical {
            model,
            detail: format!("alpha={alpha}, beta={beta}"),
        });
    }

    Ok(WashburnRidealFit {
        alpha,
        beta,
        quality: FitQuality::new(report.sse, times.len(), report.iterations, ResidualAxis::Time),
        inversion: opts.inversion,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sample::{SeriesSpec, generate_washburn_rideal};

    const ALPHA: f64 = 1.0;
    const BETA: f64 = 4.0;

    fn clean_series() -> (Vec<f64>, Vec<f64>) {
        let z: Vec<f64> = (0..=50).map(|i| 10.0 * i as f64 / 50.0).collect();
        let t: Vec<f64> = z.iter().map(|&v| washburn_rideal_time(v, ALPHA, BETA)).collect();
        (t, z)
    }

    #[test]
    fn recovers_parameters_from_clean_data() {
        let (t, z) = clean_series();
        let fit = fit_washburn_rideal(&t, &z).unwrap();
        assert!((fit.alpha - ALPHA).abs() < 1e-4, "alpha={}", fit.alpha);
        assert!((fit.beta - BETA).abs() < 1e-4, "beta={}", fit.beta);
        assert!(fit.quality.sse < 1e-12, "sse={}", fit.quality.sse);
    }

    #[test]
    fn inversion_reproduces_depths_on_ascending_branch() {
        let (t, z) = clean_series();
        let fit = fit_washburn_rideal(&t, &z).unwrap();
        let (z_star, _) = fit.minimum();

        let results = fit.positions(&t);
        assert_eq!(results.len(), z.len());
        for ((&zi, &ti), r) in z.iter().zip(&t).zip(&results) {
            if zi == 0.0 {
                assert_eq!(*r, Ok(0.0));
            } else if zi >= z_star * (1.0 - 1e-6) {
                let got = r.unwrap();
                assert!((got - zi).abs() < 1e-3, "t={ti}: z={got}, expected {zi}");
            }
        }
    }

    #[test]
    fn origin_maps_to_zero_time() {
        let fit = WashburnRidealFit::from_params(ALPHA, BETA, SolverOptions::default());
        assert_eq!(fit.time(0.0), Ok(0.0));
        assert_eq!(fit.position(0.0), Ok(0.0));
        assert!(fit.time(-1.0).is_err());
    }

    #[test]
    fn failed_queries_do_not_affect_others() {
        let fit = WashburnRidealFit::from_params(ALPHA, BETA, SolverOptions::default());
        let z_good = [3.0, 7.5];
        let t_good: Vec<f64> = z_good.iter().map(|&z| washburn_rideal_time(z, ALPHA, BETA)).collect();

        let queries = [t_good[0], 1e308, 0.1, -1.0, t_good[1]];
        let results = fit.positions(&queries);

        assert!((results[0].unwrap() - 3.0).abs() < 1e-6);
        assert_eq!(results[1], Err(InversionError::NonFinite { t: 1e308 }));
        assert_eq!(
            results[2],
            Err(InversionError::BelowMinimum {
                t: 0.1,
                t_min: 0.5
            })
        );
        assert_eq!(results[3], Err(InversionError::Domain(DomainError::time(-1.0))));
        assert!((results[4].unwrap() - 7.5).abs() < 1e-6);
    }

    #[test]
    fn minimum_time_maps_to_turning_point() {
        let fit = WashburnRidealFit::from_params(ALPHA, BETA, SolverOptions::default());
        let (z_star, t_min) = fit.minimum();
        let z = fit.position(t_min).unwrap();
        assert!((z - z_star).abs() < 1e-6, "z={z}");
    }

    #[test]
    fn turning_point_survives_rounding_in_fitted_alpha() {
        // A fitted alpha a few ulps low puts t_min just above the exact sample time.
        let alpha = 0.9999999999999977;
        let fit = WashburnRidealFit::from_params(alpha, BETA, SolverOptions::default());
        let (z_star, t_min) = fit.minimum();
        assert!(t_min > 0.5);

        let z = fit.position(0.5).unwrap();
        assert!((z - z_star).abs() < 1e-12, "z={z}");
        assert!((z - 2.0).abs() < 1e-9, "z={z}");

        // Clearly below the minimum is still rejected.
        assert!(matches!(fit.position(0.49), Err(InversionError::BelowMinimum { .. })));
    }

    #[test]
    fn inversion_iteration_cap_is_reported_per_point() {
        let opts = SolverOptions {
            rel_tol: 1e-15,
            max_iterations: 1,
        };
        let fit = WashburnRidealFit::from_params(ALPHA, BETA, opts);
        let t = washburn_rideal_time(6.0, ALPHA, BETA);
        let results = fit.positions(&[0.0, t]);
        assert_eq!(results[0], Ok(0.0));
        assert!(
            matches!(results[1], Err(InversionError::NotConverged { iterations: 1, .. })),
            "{:?}",
            results[1]
        );
    }

    #[test]
    fn noisy_data_gives_physical_parameters() {
        for seed in 0..10 {
            let spec = SeriesSpec {
                n: 60,
                domain_min: 0.5,
                domain_max: 10.0,
                noise_frac: 0.002,
                seed,
            };
            let series = generate_washburn_rideal(ALPHA, BETA, &spec).unwrap();
            let fit = fit_washburn_rideal(&series.times, &series.positions).unwrap();
            assert!(fit.alpha > 0.0 && fit.beta > 0.0);
            assert!((fit.alpha / fit.beta - ALPHA / BETA).abs() < 0.05, "seed={seed}: {fit:?}");
        }
    }

    #[test]
    fn too_few_points_is_insufficient() {
        let err = fit_washburn_rideal(&[], &[]).unwrap_err();
        assert_eq!(
            err,
            FitError::InsufficientData {
                model: ModelKind::WashburnRideal,
                required: 2,
                got: 0
            }
        );

        let err = fit_washburn_rideal(&[0.0, 1.0], &[0.0, 3.0]).unwrap_err();
        assert!(matches!(err, FitError::InsufficientData { got: 1, .. }), "{err:?}");
    }

    #[test]
    fn negative_depth_is_a_domain_error() {
        let err = fit_washburn_rideal(&[1.0, 2.0, 3.0], &[1.0, -2.0, 3.0]).unwrap_err();
        assert_eq!(err, FitError::Domain(DomainError::position(-2.0).at(1)));
    }
}
