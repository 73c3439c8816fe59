//! Shared fit pipeline used by the `fit`, `trials` and `plot`-style commands.
//!
//! sample generation -> fit -> residuals -> largest deviations
//!
//! The command handlers then only deal with presentation.

use rayon::prelude::*;

use crate::data::sample::{SeriesSpec, generate};
use crate::domain::{FitConfig, ModelKind, SampleSeries};
use crate::error::AppError;
use crate::fit::FittedModel;
use crate::report::{Deviations, ResidualTable, TrialSummary, compute_residuals, largest_deviations, summarize_trials};

/// All computed outputs of a single `fit` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub series: SampleSeries,
    pub model: FittedModel,
    pub residuals: ResidualTable,
    pub deviations: Deviations,
}

/// Sampling settings for one realisation of the configured experiment.
pub fn series_spec(config: &FitConfig, seed: u64) -> SeriesSpec {
    let domain_min = match config.model {
        ModelKind::WashburnOffset => config.truth.time_offset,
        ModelKind::Washburn | ModelKind::WashburnRideal => 0.0,
    };
    SeriesSpec {
        n: config.sample_count,
        domain_min,
        domain_max: config.domain_max,
        noise_frac: config.noise_frac,
        seed,
    }
}

/// Generate the configured series and fit it.
pub fn run_fit(config: &FitConfig) -> Result<RunOutput, AppError> {
    let series = generate(config.model, &config.truth, &series_spec(config, config.sample_seed))?;
    tracing::info!(
        model = config.model.display_name(),
        points = series.len(),
        seed = config.sample_seed,
        "generated sample"
    );
    run_fit_with_series(config, series)
}

/// Fit a pre-built series.
pub fn run_fit_with_series(config: &FitConfig, series: SampleSeries) -> Result<RunOutput, AppError> {
    let model = config.model.fit(&series, &config.options)?;
    let quality = model.quality();
    tracing::info!(
        model = config.model.display_name(),
        sse = quality.sse,
        iterations = quality.iterations,
        params = ?model.params(),
        "fit converged"
    );

    let residuals = compute_residuals(&series, &model);
    if !residuals.unresolved.is_empty() {
        tracing::warn!(count = residuals.unresolved.len(), "some points could not be inverted");
    }
    let deviations = largest_deviations(&residuals.rows, config.top_n);

    Ok(RunOutput {
        series,
        model,
        residuals,
        deviations,
    })
}

/// Fit `config.trials` independent noisy realisations in parallel.
///
/// Trial `i` uses seed `sample_seed + i`, so results are reproducible and do not
/// depend on scheduling. Fit failures are counted; invalid sampling settings
/// abort the whole run.
pub fn run_trials(config: &FitConfig) -> Result<TrialSummary, AppError> {
    if config.trials == 0 {
        return Err(AppError::new(2, "Trial count must be > 0."));
    }

    let outcomes = (0..config.trials as u64)
        .into_par_iter()
        .map(|i| {
            let seed = config.sample_seed.wrapping_add(i);
            let series = generate(config.model, &config.truth, &series_spec(config, seed))?;
            let outcome = config.model.fit(&series, &config.options);
            if let Err(e) = &outcome {
                tracing::debug!(seed, error = %e, "trial failed");
            }
            Ok(outcome)
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    let summary = summarize_trials(config.model, &outcomes);
    tracing::info!(
        model = config.model.display_name(),
        trials = summary.trials,
        failures = summary.failures,
        "trials finished"
    );
    Ok(summary)
}
