//! Curve fitting.
//!
//! Responsibilities:
//!
//! - validate `(time, position)` series before any solver runs
//! - fit Washburn (`x = k√t`) by Levenberg–Marquardt
//! - fit Washburn–Rideal in the time-of-depth direction, then invert per point
//! - fit offset Washburn through a quadratic polynomial
//! - dispatch over the closed set of model kinds

pub mod dispatch;
pub mod error;
pub mod offset;
pub mod seed_grid;
pub mod validation;
pub mod washburn;
pub mod washburn_rideal;

pub use dispatch::*;
pub use error::*;
pub use offset::*;
pub use washburn::*;
pub use washburn_rideal::*;
