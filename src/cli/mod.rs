//! Command-line parsing for the wetting-front fitter.
//!
//! Argument parsing and command dispatch stay separate from the modeling and
//! fitting code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::ModelKind;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "wettingfront", version, about = "Capillary wetting-front model fitter")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit a model to a synthetic series, print diagnostics, and optionally plot/export.
    Fit(FitArgs),
    /// Fit many seeded noisy realisations and summarise parameter spread.
    Trials(FitArgs),
    /// Compute positions at given times from a saved model file.
    Invert(InvertArgs),
    /// Plot a saved model file.
    Plot(PlotArgs),
}

/// Common options for fitting and trials.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Model to fit.
    #[arg(short = 'm', long, value_enum, default_value_t = ModelKind::Washburn)]
    pub model: ModelKind,

    /// Washburn coefficient k used to generate the series.
    #[arg(long, default_value_t = 2.0)]
    pub k: f64,

    /// Washburn–Rideal alpha used to generate the series.
    #[arg(long, default_value_t = 2.0)]
    pub alpha: f64,

    /// Washburn–Rideal beta used to generate the series.
    #[arg(long, default_value_t = 1.0)]
    pub beta: f64,

    /// Time offset a of the offset model.
    #[arg(long, default_value_t = 0.0)]
    pub time_offset: f64,

    /// Position offset b of the offset model.
    #[arg(long, default_value_t = 0.0)]
    pub position_offset: f64,

    /// Number of samples per series.
    #[arg(short = 'n', long, default_value_t = 100)]
    pub sample_count: usize,

    /// Random seed for noise.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// End of the sampled axis: time for Washburn and offset, depth for
    /// Washburn–Rideal [default: 100 for time, 10 for depth].
    #[arg(long)]
    pub domain_max: Option<f64>,

    /// Gaussian noise σ as a fraction of the position range.
    #[arg(long, default_value_t = 0.005)]
    pub noise: f64,

    /// Relative step tolerance of the least-squares fit.
    #[arg(long, default_value_t = 1e-8)]
    pub rel_tol: f64,

    /// Iteration cap of the least-squares fit.
    #[arg(long, default_value_t = 200)]
    pub max_iter: usize,

    /// Relative step tolerance of the per-point inversion.
    #[arg(long, default_value_t = 1e-8)]
    pub inversion_rel_tol: f64,

    /// Iteration cap of the per-point inversion.
    #[arg(long, default_value_t = 200)]
    pub inversion_max_iter: usize,

    /// Number of trials (`trials` command only).
    #[arg(long, default_value_t = 100)]
    pub trials: usize,

    /// Show the top-N points furthest ahead of and behind the model.
    #[arg(long, default_value_t = 5)]
    pub top: usize,

    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export the fitted model (params + quality + grid) to JSON.
    #[arg(long = "export-model", value_name = "JSON")]
    pub export_model: Option<PathBuf>,
}

/// Options for inverting a saved model.
#[derive(Debug, Parser)]
pub struct InvertArgs {
    /// Model JSON file produced by `wettingfront fit --export-model`.
    #[arg(long = "model", value_name = "JSON")]
    pub model_file: PathBuf,

    /// Query times.
    #[arg(required = true, allow_negative_numbers = true)]
    pub times: Vec<f64>,
}

/// Options for plotting a saved model.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Model JSON file produced by `wettingfront fit --export-model`.
    #[arg(long = "model", value_name = "JSON")]
    pub model_file: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}
