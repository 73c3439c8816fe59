//! Linear least squares solver.
//!
//! Every linear subproblem in this crate goes through one routine:
//!
//! ```text
//! minimize ||A x - b||^2
//! ```
//!
//! - the damped normal equations of each Levenberg–Marquardt step (square)
//! - the quadratic design matrix of the offset Washburn fit (tall)
//!
//! We use SVD so the same call works for square and tall systems.
//! (Nalgebra's `QR::solve` is intended for square systems and will panic for
//! non-square matrices.)

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(a: &DMatrix<f64>, b: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = a.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-14, 1e-10, 1e-6] {
        if let Ok(x) = svd.solve(b, tol) {
            if x.iter().all(|v| v.is_finite()) {
                return Some(x);
            }
        }
    }

    None
}

/// Fit a polynomial of the given degree to `(x, y)` pairs.
///
/// Coefficients are returned highest power first, so a quadratic comes back as
/// `[A, B, C]` for `y = A x² + B x + C`.
pub fn polyfit(x: &[f64], y: &[f64], degree: usize) -> Option<Vec<f64>> {
    let n = x.len();
    if n != y.len() || n < degree + 1 {
        return None;
    }

    let cols = degree + 1;
    let mut a = DMatrix::<f64>::zeros(n, cols);
    for (i, &xi) in x.iter().enumerate() {
        let mut p = 1.0;
        for j in (0..cols).rev() {
            a[(i, j)] = p;
            p *= xi;
        }
    }
    let b = DVector::from_row_slice(y);

    solve_least_squares(&a, &b).map(|c| c.iter().copied().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let a = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let b = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let x = solve_least_squares(&a, &b).unwrap();
        assert!((x[0] - 2.0).abs() < 1e-10);
        assert!((x[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn polyfit_recovers_quadratic() {
        let x: Vec<f64> = (0..10).map(|i| i as f64 * 0.5).collect();
        let y: Vec<f64> = x.iter().map(|&v| 0.25 * v * v - 1.5 * v + 4.0).collect();

        let c = polyfit(&x, &y, 2).unwrap();
        assert_eq!(c.len(), 3);
        assert!((c[0] - 0.25).abs() < 1e-9, "A={}", c[0]);
        assert!((c[1] + 1.5).abs() < 1e-9, "B={}", c[1]);
        assert!((c[2] - 4.0).abs() < 1e-9, "C={}", c[2]);
    }

    #[test]
    fn polyfit_rejects_underdetermined_input() {
        assert!(polyfit(&[1.0, 2.0], &[1.0, 2.0], 2).is_none());
        assert!(polyfit(&[1.0, 2.0, 3.0], &[1.0, 2.0], 1).is_none());
    }
}
