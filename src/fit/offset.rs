//! Washburn fit with offsets: `h = k·√(t − a) + b`.
//!
//! Real recordings rarely start exactly at first contact, and a detected front
//! can sit a few pixels off the true origin. Solving for `t` gives a quadratic
//! in `h`:
//!
//! ```text
//! t = (1/k²)·h² − (2b/k²)·h + (b²/k² + a)
//! ```
//!
//! so one linear least-squares polynomial fit `t = A h² + B h + C` recovers
//! `k = 1/√A`, `b = −B/2A`, `a = C − B²/4A`. No iteration is needed.

use serde::Serialize;

use crate::domain::{FitQuality, ModelKind, ResidualAxis};
use crate::fit::error::{DomainError, FitError};
use crate::fit::validation::{check_time, require_points, validate_series};
use crate::math::polyfit;
use crate::models::washburn_offset;

/// A fitted offset Washburn model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WashburnOffsetFit {
    pub k: f64,
    /// Time offset: the model starts at `t = a`.
    pub a: f64,
    /// Position offset at `t = a`.
    pub b: f64,
    pub quality: FitQuality,
}

impl WashburnOffsetFit {
    /// Build a model from known parameters (no fit).
    pub fn from_params(k: f64, a: f64, b: f64) -> Self {
        Self {
            k,
            a,
            b,
            quality: FitQuality::new(0.0, 0, 0, ResidualAxis::Time),
        }
    }

    /// Position at time `t`; times before the origin `a` are rejected.
    pub fn position(&self, t: f64) -> Result<f64, DomainError> {
        let t = check_time(t)?;
        if t < self.a {
            return Err(DomainError::time(t).before_origin(self.a));
        }
        Ok(washburn_offset(t, self.k, self.a, self.b))
    }

    pub fn positions(&self, times: &[f64]) -> Result<Vec<f64>, DomainError> {
        times.iter().map(|&t| self.position(t)).collect()
    }
}

/// Fit `h = k·√(t − a) + b` through a quadratic in `h`.
pub fn fit_washburn_offset(times: &[f64], heights: &[f64]) -> Result<WashburnOffsetFit, FitError> {
    let model = ModelKind::WashburnOffset;
    validate_series(times, heights)?;
    require_points(model, times.len(), 3)?;

    let coef = polyfit(heights, times, 2).ok_or_else(|| FitError::NonPhysical {
        model,
        detail: "singular design matrix (need at least 3 distinct heights)".to_string(),
    })?;
    let (qa, qb, qc) = (coef[0], coef[1], coef[2]);
    if !(qa.is_finite() && qa > 0.0) {
        return Err(FitError::NonPhysical {
            model,
            detail: format!("quadratic coefficient {qa} must be positive"),
        });
    }

    let k = 1.0 / qa.sqrt();
    let b = -qb / (2.0 * qa);
    let a = qc - qb * qb / (4.0 * qa);

    let sse: f64 = times
        .iter()
        .zip(heights)
        .map(|(&t, &h)| {
            let r = qa * h * h + qb * h + qc - t;
            r * r
        })
        .sum();

    Ok(WashburnOffsetFit {
        k,
        a,
        b,
        quality: FitQuality::new(sse, times.len(), 0, ResidualAxis::Time),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovers_offsets_from_clean_data() {
        let (k, a, b) = (12.0, 0.4, 30.0);
        let t: Vec<f64> = (0..40).map(|i| a + 0.1 * i as f64).collect();
        let h: Vec<f64> = t.iter().map(|&v| washburn_offset(v, k, a, b)).collect();

        let fit = fit_washburn_offset(&t, &h).unwrap();
        assert!((fit.k - k).abs() < 1e-6, "k={}", fit.k);
        assert!((fit.a - a).abs() < 1e-6, "a={}", fit.a);
        assert!((fit.b - b).abs() < 1e-6, "b={}", fit.b);
        assert!(fit.quality.sse < 1e-12);

        let h_fit = fit.positions(&t[1..]).unwrap();
        for (x, y) in h_fit.iter().zip(&h[1..]) {
            assert!((x - y).abs() < 1e-6);
        }
    }

    #[test]
    fn rejects_times_before_origin() {
        let fit = WashburnOffsetFit::from_params(1.0, 2.0, 0.0);
        let err = fit.position(1.0).unwrap_err();
        assert_eq!(err, DomainError::time(1.0).before_origin(2.0));
        assert!(err.to_string().contains("origin 2"), "{err}");
        assert_eq!(fit.position(3.0), Ok(1.0));
    }

    #[test]
    fn receding_front_is_non_physical() {
        // Heights decreasing in time give a negative quadratic coefficient.
        let t = [0.0, 1.0, 2.0, 3.0, 4.0];
        let h = [10.0, 9.0, 7.0, 4.0, 0.0];
        let err = fit_washburn_offset(&t, &h).unwrap_err();
        assert!(matches!(err, FitError::NonPhysical { .. }), "{err:?}");
    }

    #[test]
    fn needs_three_points() {
        let err = fit_washburn_offset(&[1.0, 2.0], &[1.0, 2.0]).unwrap_err();
        assert_eq!(
            err,
            FitError::InsufficientData {
                model: ModelKind::WashburnOffset,
                required: 3,
                got: 2
            }
        );
    }
}
