//! Synthetic data generation for demos, trials and tests.

pub mod sample;

pub use sample::*;
