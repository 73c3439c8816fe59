//! Model dispatch over the closed set of [`ModelKind`]s.
//!
//! Callers that pick a model at run time (CLI, saved model files) go through
//! [`ModelKind::fit`] and get a [`FittedModel`] back; callers that know the model
//! statically can use the concrete fitters directly.

use crate::domain::{FitOptions, FitQuality, ModelKind, ModelParams, SampleSeries, SolverOptions};
use crate::fit::error::{FitError, InversionError};
use crate::fit::offset::{WashburnOffsetFit, fit_washburn_offset};
use crate::fit::washburn::{WashburnFit, fit_washburn_with};
use crate::fit::washburn_rideal::{WashburnRidealFit, fit_washburn_rideal_with};

/// A fitted model of any kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FittedModel {
    Washburn(WashburnFit),
    WashburnRideal(WashburnRidealFit),
    WashburnOffset(WashburnOffsetFit),
}

impl ModelKind {
    /// Fit this model to a series.
    pub fn fit(self, series: &SampleSeries, opts: &FitOptions) -> Result<FittedModel, FitError> {
        let (t, x) = (&series.times, &series.positions);
        match self {
            ModelKind::Washburn => fit_washburn_with(t, x, &opts.fit).map(FittedModel::Washburn),
            ModelKind::WashburnRideal => {
                fit_washburn_rideal_with(t, x, opts).map(FittedModel::WashburnRideal)
            }
            ModelKind::WashburnOffset => fit_washburn_offset(t, x).map(FittedModel::WashburnOffset),
        }
    }
}

impl FittedModel {
    /// Rebuild a model from saved parameters.
    pub fn from_params(params: ModelParams, inversion: SolverOptions) -> Self {
        match params {
            ModelParams::Washburn { k } => FittedModel::Washburn(WashburnFit::from_params(k)),
            ModelParams::WashburnRideal { alpha, beta } => {
                FittedModel::WashburnRideal(WashburnRidealFit::from_params(alpha, beta, inversion))
            }
            ModelParams::WashburnOffset { k, a, b } => {
                FittedModel::WashburnOffset(WashburnOffsetFit::from_params(k, a, b))
            }
        }
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            FittedModel::Washburn(_) => ModelKind::Washburn,
            FittedModel::WashburnRideal(_) => ModelKind::WashburnRideal,
            FittedModel::WashburnOffset(_) => ModelKind::WashburnOffset,
        }
    }

    /// Fitted parameters, in the order of [`ModelKind::param_names`].
    pub fn params(&self) -> Vec<f64> {
        match self {
            FittedModel::Washburn(m) => vec![m.k],
            FittedModel::WashburnRideal(m) => vec![m.alpha, m.beta],
            FittedModel::WashburnOffset(m) => vec![m.k, m.a, m.b],
        }
    }

    pub fn model_params(&self) -> ModelParams {
        match self {
            FittedModel::Washburn(m) => ModelParams::Washburn { k: m.k },
            FittedModel::WashburnRideal(m) => ModelParams::WashburnRideal {
                alpha: m.alpha,
                beta: m.beta,
            },
            FittedModel::WashburnOffset(m) => ModelParams::WashburnOffset {
                k: m.k,
                a: m.a,
                b: m.b,
            },
        }
    }

    pub fn quality(&self) -> FitQuality {
        match self {
            FittedModel::Washburn(m) => m.quality,
            FittedModel::WashburnRideal(m) => m.quality,
            FittedModel::WashburnOffset(m) => m.quality,
        }
    }

    /// Inversion settings (defaults for models that need no inversion).
    pub fn inversion(&self) -> SolverOptions {
        match self {
            FittedModel::WashburnRideal(m) => m.inversion,
            _ => SolverOptions::default(),
        }
    }

    /// Position at time `t`.
    pub fn position(&self, t: f64) -> Result<f64, InversionError> {
        match self {
            FittedModel::Washburn(m) => Ok(m.position(t)?),
            FittedModel::WashburnRideal(m) => m.position(t),
            FittedModel::WashburnOffset(m) => Ok(m.position(t)?),
        }
    }

    /// Position at each query time, one result per query.
    pub fn positions(&self, times: &[f64]) -> Vec<Result<f64, InversionError>> {
        match self {
            FittedModel::WashburnRideal(m) => m.positions(times),
            _ => times.iter().map(|&t| self.position(t)).collect(),
        }
    }
}
