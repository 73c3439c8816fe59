//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON
//! - reloaded later for inversion queries or plotting

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Which capillary-flow model to fit.
///
/// This is a closed set: every supported physical model has a variant here and a
/// matching fitter in [`crate::fit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ModelKind {
    /// `x = k·√t`.
    Washburn,
    /// Implicit `t(z) = (α/2β)·z² − (1/α)·ln(α·z/√β)`.
    WashburnRideal,
    /// `x = k·√(t − a) + b` (Washburn with time and position offsets).
    WashburnOffset,
}

impl ModelKind {
    pub const ALL: [ModelKind; 3] = [
        ModelKind::Washburn,
        ModelKind::WashburnRideal,
        ModelKind::WashburnOffset,
    ];

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::Washburn => "Washburn",
            ModelKind::WashburnRideal => "Washburn-Rideal",
            ModelKind::WashburnOffset => "Washburn (offset)",
        }
    }

    /// Number of fitted parameters.
    pub fn param_count(self) -> usize {
        match self {
            ModelKind::Washburn => 1,
            ModelKind::WashburnRideal => 2,
            ModelKind::WashburnOffset => 3,
        }
    }

    /// Parameter names, in the order of [`crate::fit::FittedModel::params`].
    pub fn param_names(self) -> &'static [&'static str] {
        match self {
            ModelKind::Washburn => &["k"],
            ModelKind::WashburnRideal => &["alpha", "beta"],
            ModelKind::WashburnOffset => &["k", "a", "b"],
        }
    }
}

/// Which axis the least-squares residuals were measured on.
///
/// Washburn fits displacement as a function of time. Washburn–Rideal and the
/// offset model are fitted in the reverse direction (time as a function of
/// displacement), so their SSE is in time units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResidualAxis {
    Position,
    Time,
}

/// Iteration budget and tolerance for an iterative solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverOptions {
    /// Relative step tolerance; iteration stops once `|Δx| <= rel_tol·|x|`.
    pub rel_tol: f64,
    /// Maximum number of outer iterations.
    pub max_iterations: usize,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            rel_tol: 1e-8,
            max_iterations: 200,
        }
    }
}

/// Solver settings for both stages of a fit.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FitOptions {
    /// Outer nonlinear least-squares stage.
    pub fit: SolverOptions,
    /// Per-point inversion stage (Washburn–Rideal only).
    pub inversion: SolverOptions,
}

/// Fit quality diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitQuality {
    pub sse: f64,
    pub rmse: f64,
    pub n: usize,
    /// Solver iterations used (0 for closed-form fits).
    pub iterations: usize,
    pub axis: ResidualAxis,
}

impl FitQuality {
    pub fn new(sse: f64, n: usize, iterations: usize, axis: ResidualAxis) -> Self {
        let rmse = if n > 0 { (sse / n as f64).sqrt() } else { 0.0 };
        Self {
            sse,
            rmse,
            n,
            iterations,
            axis,
        }
    }
}

/// A front-position time series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleSeries {
    pub times: Vec<f64>,
    pub positions: Vec<f64>,
}

impl SampleSeries {
    pub fn new(times: Vec<f64>, positions: Vec<f64>) -> Self {
        Self { times, positions }
    }

    pub fn len(&self) -> usize {
        self.times.len().min(self.positions.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate `(t, x)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.times.iter().copied().zip(self.positions.iter().copied())
    }

    /// Range statistics, or `None` for an empty or non-finite series.
    pub fn stats(&self) -> Option<SeriesStats> {
        let mut t_min = f64::INFINITY;
        let mut t_max = f64::NEG_INFINITY;
        let mut x_min = f64::INFINITY;
        let mut x_max = f64::NEG_INFINITY;

        for (t, x) in self.iter() {
            t_min = t_min.min(t);
            t_max = t_max.max(t);
            x_min = x_min.min(x);
            x_max = x_max.max(x);
        }

        if !(t_min.is_finite() && t_max.is_finite() && x_min.is_finite() && x_max.is_finite()) {
            return None;
        }

        Some(SeriesStats {
            n_points: self.len(),
            t_min,
            t_max,
            x_min,
            x_max,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesStats {
    pub n_points: usize,
    pub t_min: f64,
    pub t_max: f64,
    pub x_min: f64,
    pub x_max: f64,
}

/// True parameters used to synthesize a series.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrueParams {
    pub k: f64,
    pub alpha: f64,
    pub beta: f64,
    pub time_offset: f64,
    pub position_offset: f64,
}

/// A per-point fitted result in displacement space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointResidual {
    pub t: f64,
    pub x_obs: f64,
    pub x_fit: f64,
    pub residual: f64,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub model: ModelKind,
    pub truth: TrueParams,

    pub sample_count: usize,
    pub sample_seed: u64,
    /// Upper end of the synthetic time (Washburn, offset) or depth
    /// (Washburn–Rideal) axis.
    pub domain_max: f64,
    /// Gaussian noise σ as a fraction of the signal range.
    pub noise_frac: f64,

    pub options: FitOptions,

    pub trials: usize,
    /// Rows shown in each largest-deviation table.
    pub top_n: usize,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_model: Option<PathBuf>,
}

/// Serialized model parameters, tagged by model kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ModelParams {
    Washburn { k: f64 },
    WashburnRideal { alpha: f64, beta: f64 },
    WashburnOffset { k: f64, a: f64, b: f64 },
}

impl ModelParams {
    pub fn kind(&self) -> ModelKind {
        match self {
            ModelParams::Washburn { .. } => ModelKind::Washburn,
            ModelParams::WashburnRideal { .. } => ModelKind::WashburnRideal,
            ModelParams::WashburnOffset { .. } => ModelKind::WashburnOffset,
        }
    }
}

/// A saved model file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub params: ModelParams,
    pub quality: FitQuality,
    pub inversion: SolverOptions,
    pub grid: CurveGrid,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurveGrid {
    pub time: Vec<f64>,
    pub position: Vec<f64>,
}
