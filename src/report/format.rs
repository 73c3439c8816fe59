//! Formatted terminal output.
//!
//! All formatting lives here so the fitting code stays free of presentation
//! and output changes stay in one file.

use crate::domain::{FitConfig, ModelKind, PointResidual, ResidualAxis, SampleSeries, TrueParams};
use crate::fit::{FittedModel, InversionError};
use crate::report::{Deviations, ResidualTable, TrialSummary};

/// Generating parameters in the order of [`ModelKind::param_names`].
pub fn truth_values(kind: ModelKind, truth: &TrueParams) -> Vec<f64> {
    match kind {
        ModelKind::Washburn => vec![truth.k],
        ModelKind::WashburnRideal => vec![truth.alpha, truth.beta],
        ModelKind::WashburnOffset => vec![truth.k, truth.time_offset, truth.position_offset],
    }
}

/// Format the full run summary (series stats + fit diagnostics + parameters).
pub fn format_run_summary(series: &SampleSeries, model: &FittedModel, config: &FitConfig) -> String {
    let mut out = String::new();
    let kind = model.kind();

    out.push_str("=== wettingfront - capillary front fit ===\n");
    out.push_str(&format!("Model: {}\n", kind.display_name()));
    out.push_str(&format!(
        "Sample: n={} | seed={} | noise={:.3}% of range\n",
        config.sample_count,
        config.sample_seed,
        config.noise_frac * 100.0,
    ));
    if let Some(stats) = series.stats() {
        out.push_str(&format!(
            "Points: n={} | t=[{:.4}, {:.4}] | x=[{:.4}, {:.4}]\n",
            stats.n_points, stats.t_min, stats.t_max, stats.x_min, stats.x_max
        ));
    }

    let q = model.quality();
    out.push_str("\nFit diagnostics:\n");
    out.push_str(&format!(
        "- SSE={:.6e} RMSE={:.6e} ({} axis) n={} iterations={}\n",
        q.sse,
        q.rmse,
        axis_label(q.axis),
        q.n,
        q.iterations
    ));

    out.push_str(&format!("\nParameters ({}, fitted vs generating):\n", kind.param_count()));
    let truth = truth_values(kind, &config.truth);
    for ((name, fitted), true_value) in kind.param_names().iter().zip(model.params()).zip(truth) {
        out.push_str(&format!(
            "- {name:<6} {fitted:>14.6} {true_value:>14.6} ({:+.3}%)\n",
            rel_error(fitted, true_value) * 100.0
        ));
    }

    if let FittedModel::WashburnRideal(m) = model {
        let (z_star, t_min) = m.minimum();
        out.push_str(&format!(
            "- minimum of t(z): z*={z_star:.6} t_min={t_min:.6}\n"
        ));
    }
    out.push('\n');

    out
}

/// Format the largest deviations and any unresolved points.
pub fn format_residuals(table: &ResidualTable, deviations: &Deviations) -> String {
    let mut out = String::new();

    out.push_str("Front ahead of model (positive residual):\n");
    out.push_str(&format_table(&deviations.ahead));
    out.push('\n');

    out.push_str("Front behind model (negative residual):\n");
    out.push_str(&format_table(&deviations.behind));

    if !table.unresolved.is_empty() {
        out.push('\n');
        out.push_str(&format!("Unresolved points ({}):\n", table.unresolved.len()));
        for u in &table.unresolved {
            out.push_str(&format!("  #{:<5} t={:<12.6} {}\n", u.index, u.t, u.error));
        }
    }

    out
}

fn format_table(rows: &[PointResidual]) -> String {
    let mut out = String::new();
    out.push_str(format!("{:>12} {:>12} {:>12} {:>12}", "t", "x_obs", "x_fit", "residual").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<12} {:-<12} {:-<12} {:-<12}", "", "", "", "").trim_end());
    out.push('\n');

    for r in rows {
        out.push_str(
            format!(
                "{:>12.4} {:>12.4} {:>12.4} {:>12.4}",
                r.t, r.x_obs, r.x_fit, r.residual
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Format a repeated-trial summary against the generating parameters.
pub fn format_trial_summary(summary: &TrialSummary, truth: &TrueParams) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "=== {} trials: {} runs, {} failed ===\n",
        summary.model.display_name(),
        summary.trials,
        summary.failures
    ));

    if summary.params.is_empty() {
        out.push_str("No successful fits.\n");
    } else {
        out.push_str(
            format!(
                "{:<6} {:>14} {:>14} {:>14} {:>14} {:>14}",
                "param", "true", "mean", "std", "min", "max"
            )
            .trim_end(),
        );
        out.push('\n');
        let truth = truth_values(summary.model, truth);
        for (p, t) in summary.params.iter().zip(truth) {
            out.push_str(&format!(
                "{:<6} {:>14.6} {:>14.6} {:>14.6} {:>14.6} {:>14.6}\n",
                p.name, t, p.mean, p.std, p.min, p.max
            ));
        }
        out.push_str(&format!("Mean RMSE: {:.6e}\n", summary.mean_rmse));
    }

    if let Some(msg) = &summary.first_failure {
        out.push_str(&format!("First failure: {msg}\n"));
    }

    out
}

/// Format one line per query time; failures are reported inline.
pub fn format_inversions(times: &[f64], results: &[Result<f64, InversionError>]) -> String {
    let mut out = String::new();
    out.push_str(format!("{:>14} {:>14}", "t", "x").trim_end());
    out.push('\n');
    for (t, r) in times.iter().zip(results) {
        match r {
            Ok(x) => out.push_str(&format!("{t:>14.6} {x:>14.6}\n")),
            Err(e) => out.push_str(&format!("{t:>14.6} error: {e}\n")),
        }
    }
    out
}

fn axis_label(axis: ResidualAxis) -> &'static str {
    match axis {
        ResidualAxis::Position => "position",
        ResidualAxis::Time => "time",
    }
}

fn rel_error(fitted: f64, truth: f64) -> f64 {
    if truth == 0.0 {
        fitted - truth
    } else {
        (fitted - truth) / truth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FitOptions, ModelParams, SolverOptions};
    use crate::fit::FitError;
    use crate::report::{Unresolved, compute_residuals, largest_deviations, summarize_trials};

    #[test]
    fn inversion_lines_keep_query_order() {
        let results = vec![
            Ok(1.5),
            Err(InversionError::BelowMinimum { t: 0.1, t_min: 0.5 }),
        ];
        let text = format_inversions(&[2.0, 0.1], &results);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].ends_with("1.500000"), "{text}");
        assert!(lines[2].contains("error:"), "{text}");
    }

    #[test]
    fn residual_report_lists_unresolved() {
        let model = FittedModel::from_params(ModelParams::Washburn { k: 1.0 }, SolverOptions::default());
        let series = SampleSeries::new(vec![1.0, 4.0], vec![1.5, 1.0]);
        let mut table = compute_residuals(&series, &model);
        table.unresolved.push(Unresolved {
            index: 9,
            t: 0.25,
            error: InversionError::NonFinite { t: 0.25 },
        });
        let dev = largest_deviations(&table.rows, 5);

        let text = format_residuals(&table, &dev);
        assert!(text.contains("Front ahead"));
        assert!(text.contains("0.5000"), "{text}");
        assert!(text.contains("-1.0000"), "{text}");
        assert!(text.contains("Unresolved points (1)"), "{text}");
        assert!(!text.lines().any(|l| l.ends_with(' ')));
    }

    #[test]
    fn run_summary_lists_one_line_per_parameter() {
        let model = FittedModel::from_params(
            ModelParams::WashburnRideal { alpha: 2.0, beta: 1.0 },
            SolverOptions::default(),
        );
        let config = FitConfig {
            model: ModelKind::WashburnRideal,
            truth: TrueParams {
                alpha: 2.0,
                beta: 1.0,
                ..TrueParams::default()
            },
            sample_count: 10,
            sample_seed: 1,
            domain_max: 10.0,
            noise_frac: 0.0,
            options: FitOptions::default(),
            trials: 1,
            top_n: 1,
            plot: false,
            plot_width: 40,
            plot_height: 10,
            export_model: None,
        };
        let series = SampleSeries::new(vec![1.0, 2.0], vec![1.0, 2.0]);

        let text = format_run_summary(&series, &model, &config);
        assert!(text.contains("Parameters (2, fitted vs generating):"), "{text}");
        assert!(text.contains("- alpha"), "{text}");
        assert!(text.contains("- beta"), "{text}");
        assert!(text.contains("z*=0.500000 t_min=0.250000"), "{text}");
    }

    #[test]
    fn trial_summary_without_fits() {
        let outcomes = vec![Err(FitError::InsufficientData {
            model: ModelKind::Washburn,
            required: 1,
            got: 0,
        })];
        let s = summarize_trials(ModelKind::Washburn, &outcomes);
        let text = format_trial_summary(&s, &TrueParams::default());
        assert!(text.contains("1 runs, 1 failed"), "{text}");
        assert!(text.contains("No successful fits."));
        assert!(text.contains("First failure: insufficient data"), "{text}");
    }
}
