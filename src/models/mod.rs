//! Capillary-flow model implementations.
//!
//! Models are implemented as small, pure functions so that fitting/inversion code
//! can stay generic.

pub mod model;

pub use model::*;
