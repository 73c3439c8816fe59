//! Input validation shared by the fitters.
//!
//! Every fitter rejects bad input here, before any solver runs, so that NaN never
//! reaches the least-squares stage.

use crate::domain::ModelKind;
use crate::fit::error::{DomainError, FitError};

/// Check lengths and domains of a `(time, position)` series.
///
/// Both sequences must have the same length and contain only finite,
/// non-negative values. Errors carry the index of the first offending value.
pub fn validate_series(times: &[f64], positions: &[f64]) -> Result<(), FitError> {
    if times.len() != positions.len() {
        return Err(FitError::LengthMismatch {
            times: times.len(),
            positions: positions.len(),
        });
    }

    for (i, (&t, &x)) in times.iter().zip(positions).enumerate() {
        if !(t.is_finite() && t >= 0.0) {
            return Err(DomainError::time(t).at(i).into());
        }
        if !(x.is_finite() && x >= 0.0) {
            return Err(DomainError::position(x).at(i).into());
        }
    }

    Ok(())
}

/// Fail fast when fewer than `required` informative points are available.
pub fn require_points(model: ModelKind, got: usize, required: usize) -> Result<(), FitError> {
    if got < required {
        return Err(FitError::InsufficientData {
            model,
            required,
            got,
        });
    }
    Ok(())
}

/// Domain check for a single query time.
pub fn check_time(t: f64) -> Result<f64, DomainError> {
    if t.is_finite() && t >= 0.0 {
        Ok(t)
    } else {
        Err(DomainError::time(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_length_mismatch() {
        let err = validate_series(&[1.0, 2.0], &[1.0]).unwrap_err();
        assert_eq!(
            err,
            FitError::LengthMismatch {
                times: 2,
                positions: 1
            }
        );
    }

    #[test]
    fn reports_first_negative_time() {
        let err = validate_series(&[0.0, 1.0, -2.0, -3.0], &[0.0, 1.0, 2.0, 3.0]).unwrap_err();
        assert_eq!(err, FitError::Domain(DomainError::time(-2.0).at(2)));
    }

    #[test]
    fn rejects_nan_position() {
        let err = validate_series(&[0.0, 1.0], &[0.0, f64::NAN]).unwrap_err();
        match err {
            FitError::Domain(DomainError { index, value, .. }) => {
                assert_eq!(index, Some(1));
                assert!(value.is_nan());
            }
            other => panic!("expected domain error, got {other:?}"),
        }
    }

    #[test]
    fn accepts_empty_series() {
        // Emptiness is reported by `require_points`, not as a domain problem.
        assert!(validate_series(&[], &[]).is_ok());
        assert!(require_points(ModelKind::Washburn, 0, 1).is_err());
    }

    #[test]
    fn check_time_rejects_negative_and_non_finite() {
        assert_eq!(check_time(2.0), Ok(2.0));
        assert!(check_time(-0.1).is_err());
        assert!(check_time(f64::INFINITY).is_err());
    }
}
