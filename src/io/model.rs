//! Read/write fitted-model JSON files.
//!
//! A model file is the portable representation of a fit:
//! - model kind + parameters
//! - fit quality and inversion settings
//! - a precomputed `(time, position)` grid for quick plotting
//!
//! The schema is defined by `domain::ModelFile`.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use chrono::Utc;

use crate::domain::{CurveGrid, ModelFile};
use crate::error::AppError;
use crate::fit::FittedModel;

const GRID_POINTS: usize = 101;

/// Build the file contents for a fitted model over `[0, t_max]`.
pub fn model_file(model: &FittedModel, t_max: f64) -> ModelFile {
    ModelFile {
        tool: "wettingfront".to_string(),
        generated_at: Utc::now(),
        params: model.model_params(),
        quality: model.quality(),
        inversion: model.inversion(),
        grid: build_grid(model, t_max, GRID_POINTS),
    }
}

/// Write a model JSON file.
pub fn write_model_json(path: &Path, model: &FittedModel, t_max: f64) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(5, format!("Failed to create model JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(BufWriter::new(file), &model_file(model, t_max))
        .map_err(|e| AppError::new(5, format!("Failed to write model JSON: {e}")))?;

    tracing::info!(path = %path.display(), model = model.kind().display_name(), "wrote model file");
    Ok(())
}

/// Read a model JSON file.
pub fn read_model_json(path: &Path) -> Result<ModelFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(5, format!("Failed to open model JSON '{}': {e}", path.display())))?;
    let model: ModelFile = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::new(2, format!("Invalid model JSON: {e}")))?;

    if model.grid.time.len() != model.grid.position.len() {
        return Err(AppError::new(
            2,
            format!(
                "Invalid model JSON: grid has {} times but {} positions",
                model.grid.time.len(),
                model.grid.position.len()
            ),
        ));
    }
    Ok(model)
}

/// Rebuild the fitted model described by a file.
pub fn load_model(file: &ModelFile) -> FittedModel {
    FittedModel::from_params(file.params, file.inversion)
}

fn build_grid(model: &FittedModel, t_max: f64, n: usize) -> CurveGrid {
    let n = n.max(2);
    let t_max = if t_max.is_finite() && t_max > 0.0 { t_max } else { 1.0 };
    let times: Vec<f64> = (0..n).map(|i| t_max * i as f64 / (n as f64 - 1.0)).collect();

    // Times with no position (e.g. below the Washburn–Rideal minimum) are left out.
    let (time, position): (Vec<f64>, Vec<f64>) = times
        .iter()
        .zip(model.positions(&times))
        .filter_map(|(&t, x)| x.ok().map(|x| (t, x)))
        .unzip();
    CurveGrid { time, position }
}
