//! Error types for fitting and inversion.

use std::fmt;

use crate::domain::ModelKind;

/// Which input quantity a domain violation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    Time,
    Position,
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantity::Time => write!(f, "time"),
            Quantity::Position => write!(f, "position"),
        }
    }
}

/// A value outside the domain of a model: negative, non-finite, or before the
/// model's time origin.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error(
    "invalid {quantity} {value}{}{}",
    .origin.map(|a| format!(" (before model origin {a})")).unwrap_or_default(),
    .index.map(|i| format!(" at index {i}")).unwrap_or_default()
)]
pub struct DomainError {
    pub quantity: Quantity,
    pub value: f64,
    /// Position in the input series, when the value came from one.
    pub index: Option<usize>,
    /// Time origin the value falls before, for shifted models.
    pub origin: Option<f64>,
}

impl DomainError {
    pub fn time(value: f64) -> Self {
        Self {
            quantity: Quantity::Time,
            value,
            index: None,
            origin: None,
        }
    }

    pub fn position(value: f64) -> Self {
        Self {
            quantity: Quantity::Position,
            value,
            index: None,
            origin: None,
        }
    }

    pub fn at(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn before_origin(mut self, origin: f64) -> Self {
        self.origin = Some(origin);
        self
    }
}

/// Failure of a whole fit.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FitError {
    #[error("insufficient data for {}: need at least {required} informative points, got {got}", .model.display_name())]
    InsufficientData {
        model: ModelKind,
        required: usize,
        got: usize,
    },

    #[error("length mismatch: {times} time values vs {positions} positions")]
    LengthMismatch { times: usize, positions: usize },

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("{} fit did not converge after {iterations} iterations (sse={sse:e})", .model.display_name())]
    NotConverged {
        model: ModelKind,
        iterations: usize,
        sse: f64,
    },

    #[error("{} fit produced non-physical parameters: {detail}", .model.display_name())]
    NonPhysical { model: ModelKind, detail: String },
}

/// Failure to resolve the position for a single query time.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum InversionError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("time {t} is below the model minimum {t_min}")]
    BelowMinimum { t: f64, t_min: f64 },

    #[error("inversion at t={t} did not converge after {iterations} iterations (last z={last_z})")]
    NotConverged {
        t: f64,
        iterations: usize,
        last_z: f64,
    },

    #[error("inversion at t={t} hit a non-finite value")]
    NonFinite { t: f64 },
}
