//! `wettingfront` library crate.
//!
//! Capillary wetting-front models (Washburn, Washburn–Rideal, offset Washburn),
//! their least-squares fitters, and the per-point inversion from time to front
//! position.
//!
//! The binary (`wettingfront`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the fitting core (`fit`, `math`, `models`) can be used without the CLI

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
pub mod telemetry;
