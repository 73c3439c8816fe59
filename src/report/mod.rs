//! Reporting utilities: residuals, largest deviations, trial statistics.

use crate::domain::{ModelKind, PointResidual, SampleSeries};
use crate::fit::{FitError, FittedModel, InversionError};

pub mod format;

pub use format::*;

/// Residuals of a fitted model against its series, in position space.
#[derive(Debug, Clone, Default)]
pub struct ResidualTable {
    pub rows: Vec<PointResidual>,
    /// Points whose fitted position could not be computed.
    pub unresolved: Vec<Unresolved>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Unresolved {
    pub index: usize,
    pub t: f64,
    pub error: InversionError,
}

/// Points where the observed front is furthest ahead of and behind the model.
#[derive(Debug, Clone)]
pub struct Deviations {
    pub ahead: Vec<PointResidual>,
    pub behind: Vec<PointResidual>,
}

/// Compute fitted positions and residuals for each observation.
///
/// Washburn–Rideal inversion can fail for individual times (e.g. below the
/// minimum of `t(z)`); those points are listed in `unresolved` instead of
/// failing the whole table.
pub fn compute_residuals(series: &SampleSeries, model: &FittedModel) -> ResidualTable {
    let fitted = model.positions(&series.times);
    let mut table = ResidualTable {
        rows: Vec::with_capacity(series.len()),
        unresolved: Vec::new(),
    };

    for (index, ((t, x_obs), x_fit)) in series.iter().zip(fitted).enumerate() {
        match x_fit {
            Ok(x_fit) => table.rows.push(PointResidual {
                t,
                x_obs,
                x_fit,
                residual: x_obs - x_fit,
            }),
            Err(error) => table.unresolved.push(Unresolved { index, t, error }),
        }
    }
    table
}

/// Top-N points each side by residual.
pub fn largest_deviations(rows: &[PointResidual], top_n: usize) -> Deviations {
    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| b.residual.total_cmp(&a.residual));

    let ahead = sorted
        .iter()
        .take(top_n)
        .filter(|r| r.residual > 0.0)
        .copied()
        .collect();
    let behind = sorted
        .iter()
        .rev()
        .take(top_n)
        .filter(|r| r.residual < 0.0)
        .copied()
        .collect();

    Deviations { ahead, behind }
}

/// Spread of one fitted parameter over repeated trials.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamStats {
    pub name: &'static str,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrialSummary {
    pub model: ModelKind,
    pub trials: usize,
    pub failures: usize,
    /// Empty when every trial failed.
    pub params: Vec<ParamStats>,
    pub mean_rmse: f64,
    /// First failure message, if any, for context.
    pub first_failure: Option<String>,
}

/// Summarize the outcome of repeated fits of the same model.
pub fn summarize_trials(model: ModelKind, outcomes: &[Result<FittedModel, FitError>]) -> TrialSummary {
    let fits: Vec<&FittedModel> = outcomes.iter().filter_map(|o| o.as_ref().ok()).collect();
    let first_failure = outcomes
        .iter()
        .find_map(|o| o.as_ref().err())
        .map(|e| e.to_string());

    let params = if fits.is_empty() {
        Vec::new()
    } else {
        let names = model.param_names();
        (0..model.param_count())
            .map(|i| {
                let values: Vec<f64> = fits.iter().map(|f| f.params()[i]).collect();
                param_stats(names[i], &values)
            })
            .collect()
    };

    let mean_rmse = if fits.is_empty() {
        f64::NAN
    } else {
        fits.iter().map(|f| f.quality().rmse).sum::<f64>() / fits.len() as f64
    };

    TrialSummary {
        model,
        trials: outcomes.len(),
        failures: outcomes.len() - fits.len(),
        params,
        mean_rmse,
        first_failure,
    }
}

fn param_stats(name: &'static str, values: &[f64]) -> ParamStats {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = if values.len() > 1 {
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)
    } else {
        0.0
    };
    ParamStats {
        name,
        mean,
        std: var.sqrt(),
        min: values.iter().copied().fold(f64::INFINITY, f64::min),
        max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    }
}
