//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the closed set of model kinds (`ModelKind`)
//! - solver settings (`SolverOptions`, `FitOptions`)
//! - input series and fit outputs (`SampleSeries`, `FitQuality`, `ModelFile`, etc.)

pub mod types;

pub use types::*;
