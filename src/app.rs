//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and installs logging
//! - generates synthetic series and fits them
//! - prints reports/plots
//! - reads and writes model files

use clap::Parser;

use crate::cli::{Command, FitArgs, InvertArgs, PlotArgs};
use crate::domain::{FitConfig, FitOptions, ModelKind, SolverOptions, TrueParams};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `wettingfront` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    crate::telemetry::init()?;

    match cli.command {
        Command::Fit(args) => handle_fit(&args),
        Command::Trials(args) => handle_trials(&args),
        Command::Invert(args) => handle_invert(&args),
        Command::Plot(args) => handle_plot(&args),
    }
}

fn handle_fit(args: &FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(args)?;
    let run = pipeline::run_fit(&config)?;

    println!("{}", crate::report::format_run_summary(&run.series, &run.model, &config));
    println!("{}", crate::report::format_residuals(&run.residuals, &run.deviations));

    if config.plot {
        let plot = crate::plot::render_ascii_plot(
            &run.series,
            &run.model,
            config.plot_width,
            config.plot_height,
            Some(&run.deviations),
        );
        println!("{plot}");
    }

    if let Some(path) = &config.export_model {
        let t_max = run.series.stats().map(|s| s.t_max).unwrap_or(1.0);
        crate::io::write_model_json(path, &run.model, t_max)?;
    }

    Ok(())
}

fn handle_trials(args: &FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(args)?;
    let summary = pipeline::run_trials(&config)?;
    println!("{}", crate::report::format_trial_summary(&summary, &config.truth));
    Ok(())
}

fn handle_invert(args: &InvertArgs) -> Result<(), AppError> {
    let file = crate::io::read_model_json(&args.model_file)?;
    let model = crate::io::load_model(&file);
    tracing::info!(
        model = model.kind().display_name(),
        queries = args.times.len(),
        "inverting saved model"
    );

    // Per-query failures are printed inline, not fatal.
    let results = model.positions(&args.times);
    println!("{}", crate::report::format_inversions(&args.times, &results));
    Ok(())
}

fn handle_plot(args: &PlotArgs) -> Result<(), AppError> {
    let file = crate::io::read_model_json(&args.model_file)?;
    let plot = crate::plot::render_ascii_plot_from_model_file(&file, args.width, args.height);
    println!("{plot}");
    Ok(())
}

pub fn fit_config_from_args(args: &FitArgs) -> Result<FitConfig, AppError> {
    let options = FitOptions {
        fit: solver_options("fit", args.rel_tol, args.max_iter)?,
        inversion: solver_options("inversion", args.inversion_rel_tol, args.inversion_max_iter)?,
    };
    let domain_max = args.domain_max.unwrap_or(match args.model {
        ModelKind::WashburnRideal => 10.0,
        ModelKind::Washburn | ModelKind::WashburnOffset => 100.0,
    });

    Ok(FitConfig {
        model: args.model,
        truth: TrueParams {
            k: args.k,
            alpha: args.alpha,
            beta: args.beta,
            time_offset: args.time_offset,
            position_offset: args.position_offset,
        },
        sample_count: args.sample_count,
        sample_seed: args.seed,
        domain_max,
        noise_frac: args.noise,
        options,
        trials: args.trials,
        top_n: args.top,
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_model: args.export_model.clone(),
    })
}

fn solver_options(stage: &str, rel_tol: f64, max_iterations: usize) -> Result<SolverOptions, AppError> {
    if !(rel_tol.is_finite() && rel_tol > 0.0) {
        return Err(AppError::new(2, format!("Invalid {stage} tolerance: {rel_tol} (must be > 0).")));
    }
    if max_iterations == 0 {
        return Err(AppError::new(2, format!("Invalid {stage} iteration cap: must be > 0.")));
    }
    Ok(SolverOptions {
        rel_tol,
        max_iterations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;

    fn fit_args(argv: &[&str]) -> FitArgs {
        let mut full = vec!["wettingfront", "fit"];
        full.extend_from_slice(argv);
        match Cli::parse_from(full).command {
            Command::Fit(args) => args,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn domain_default_depends_on_model() {
        let cfg = fit_config_from_args(&fit_args(&[])).unwrap();
        assert_eq!(cfg.domain_max, 100.0);
        assert!(cfg.plot);

        let cfg = fit_config_from_args(&fit_args(&["-m", "washburn-rideal", "--no-plot"])).unwrap();
        assert_eq!(cfg.domain_max, 10.0);
        assert!(!cfg.plot);

        let cfg = fit_config_from_args(&fit_args(&["--domain-max", "7.5"])).unwrap();
        assert_eq!(cfg.domain_max, 7.5);
    }

    #[test]
    fn solver_flags_flow_into_options() {
        let cfg = fit_config_from_args(&fit_args(&["--max-iter", "50", "--inversion-rel-tol", "1e-12"])).unwrap();
        assert_eq!(cfg.options.fit.max_iterations, 50);
        assert_eq!(cfg.options.inversion.rel_tol, 1e-12);
    }

    #[test]
    fn invalid_solver_flags_are_rejected() {
        let err = fit_config_from_args(&fit_args(&["--max-iter", "0"])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        let err = fit_config_from_args(&fit_args(&["--rel-tol=-1"])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
