//! Numerical building blocks: linear least squares, Levenberg–Marquardt and
//! bracketed root finding.

pub mod lm;
pub mod ols;
pub mod roots;

pub use lm::*;
pub use ols::*;
pub use roots::*;
