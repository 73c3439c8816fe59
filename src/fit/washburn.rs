//! Washburn fit: `x = k·√t`.
//!
//! A one-parameter nonlinear least-squares problem solved with
//! Levenberg–Marquardt. The seed is the mean of `x_i/√t_i` over points with
//! `t_i > 0`, which is already close to the optimum for clean data.

use nalgebra::DMatrix;
use serde::Serialize;

use crate::domain::{FitQuality, ModelKind, ResidualAxis, SolverOptions};
use crate::fit::error::{DomainError, FitError};
use crate::fit::validation::{check_time, require_points, validate_series};
use crate::math::{LeastSquaresProblem, LmFailure, levenberg_marquardt};
use crate::models::washburn;

/// A fitted Washburn model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WashburnFit {
    /// Penetrativity.
    pub k: f64,
    pub quality: FitQuality,
}

impl WashburnFit {
    /// Build a model from a known penetrativity (no fit).
    pub fn from_params(k: f64) -> Self {
        Self {
            k,
            quality: FitQuality::new(0.0, 0, 0, ResidualAxis::Position),
        }
    }

    /// Position at time `t`.
    pub fn position(&self, t: f64) -> Result<f64, DomainError> {
        Ok(washburn(check_time(t)?, self.k))
    }

    /// Positions at each of `times`.
    pub fn positions(&self, times: &[f64]) -> Result<Vec<f64>, DomainError> {
        times.iter().map(|&t| self.position(t)).collect()
    }
}

struct WashburnProblem<'a> {
    sqrt_t: Vec<f64>,
    positions: &'a [f64],
}

impl LeastSquaresProblem for WashburnProblem<'_> {
    fn residual_len(&self) -> usize {
        self.positions.len()
    }

    fn param_len(&self) -> usize {
        1
    }

    fn residuals(&self, params: &[f64], out: &mut [f64]) {
        let k = params[0];
        for (i, (&s, &x)) in self.sqrt_t.iter().zip(self.positions).enumerate() {
            out[i] = k * s - x;
        }
    }

    fn jacobian(&self, _params: &[f64], out: &mut DMatrix<f64>) {
        for (i, &s) in self.sqrt_t.iter().enumerate() {
            out[(i, 0)] = s;
        }
    }
}

/// Fit `x = k·√t` with default solver options.
pub fn fit_washburn(times: &[f64], positions: &[f64]) -> Result<WashburnFit, FitError> {
    fit_washburn_with(times, positions, &SolverOptions::default())
}

/// Fit `x = k·√t`.
///
/// Points at `t = 0` are accepted but carry no information about `k`; at least
/// one point with `t > 0` is required.
pub fn fit_washburn_with(
    times: &[f64],
    positions: &[f64],
    opts: &SolverOptions,
) -> Result<WashburnFit, FitError> {
    let model = ModelKind::Washburn;
    validate_series(times, positions)?;

    let informative = times.iter().filter(|&&t| t > 0.0).count();
    require_points(model, informative, 1)?;

    let problem = WashburnProblem {
        sqrt_t: times.iter().map(|t| t.sqrt()).collect(),
        positions,
    };

    let report = levenberg_marquardt(&problem, &[initial_k(times, positions)], opts).map_err(|e| {
        match e {
            LmFailure::NotConverged { iterations, sse, .. } => FitError::NotConverged {
                model,
                iterations,
                sse,
            },
            other => FitError::NonPhysical {
                model,
                detail: other.to_string(),
            },
        }
    })?;

    let k = report.params[0];
    if !k.is_finite() {
        return Err(FitError::NonPhysical {
            model,
            detail: format!("k={k}"),
        });
    }

    Ok(WashburnFit {
        k,
        quality: FitQuality::new(report.sse, times.len(), report.iterations, ResidualAxis::Position),
    })
}

fn initial_k(times: &[f64], positions: &[f64]) -> f64 {
    let (sum, n) = times
        .iter()
        .zip(positions)
        .filter(|(t, _)| **t > 0.0)
        .fold((0.0, 0usize), |(s, n), (&t, &x)| (s + x / t.sqrt(), n + 1));
    if n == 0 { 1.0 } else { sum / n as f64 }
}
