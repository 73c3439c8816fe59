//! Levenberg–Marquardt nonlinear least squares.
//!
//! Minimizes `Σ r_i(p)²` for a problem that can evaluate its residual vector and
//! analytic Jacobian. Each iteration solves the damped normal equations
//!
//! ```text
//! (JᵀJ + λ·D) δ = −Jᵀr,    D = diag(JᵀJ)
//! ```
//!
//! with [`solve_least_squares`], and accepts the step only if the cost is finite
//! and strictly lower. A rejected step doubles `λ`, an accepted one divides it
//! by three.
//!
//! Non-finite residuals count as a rejected step. Models whose parameters have
//! a restricted domain (e.g. a logarithm of a parameter) therefore never leave
//! it once started inside.

use nalgebra::{DMatrix, DVector};

use crate::domain::SolverOptions;
use crate::math::solve_least_squares;

const INITIAL_DAMPING: f64 = 1e-3;
const MIN_DAMPING: f64 = 1e-12;
const MAX_DAMPING: f64 = 1e32;
/// Floor for the Marquardt scaling so flat parameters still get damped.
const DIAG_FLOOR: f64 = 1e-12;

/// A least-squares problem with an analytic Jacobian.
pub trait LeastSquaresProblem {
    /// Number of residuals `m`.
    fn residual_len(&self) -> usize;

    /// Number of parameters `n`.
    fn param_len(&self) -> usize;

    /// Write the `m` residuals at `params` into `out`.
    fn residuals(&self, params: &[f64], out: &mut [f64]);

    /// Write the `m × n` Jacobian `∂r_i/∂p_j` at `params` into `out`.
    fn jacobian(&self, params: &[f64], out: &mut DMatrix<f64>);

    /// Sum of squared residuals at `params`.
    fn sse(&self, params: &[f64]) -> f64 {
        let mut r = vec![0.0; self.residual_len()];
        self.residuals(params, &mut r);
        r.iter().map(|v| v * v).sum()
    }
}

/// Successful solve.
#[derive(Debug, Clone, PartialEq)]
pub struct LmReport {
    pub params: Vec<f64>,
    pub sse: f64,
    pub iterations: usize,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LmFailure {
    #[error("initial guess has length {got}, expected {expected}")]
    ParamLength { expected: usize, got: usize },

    #[error("initial guess produces non-finite residuals")]
    NonFiniteStart,

    #[error("no convergence after {iterations} iterations (sse={sse:e})")]
    NotConverged {
        iterations: usize,
        sse: f64,
        params: Vec<f64>,
    },
}

/// Run Levenberg–Marquardt from `x0`.
pub fn levenberg_marquardt<P: LeastSquaresProblem>(
    problem: &P,
    x0: &[f64],
    opts: &SolverOptions,
) -> Result<LmReport, LmFailure> {
    let m = problem.residual_len();
    let n = problem.param_len();
    if x0.len() != n {
        return Err(LmFailure::ParamLength {
            expected: n,
            got: x0.len(),
        });
    }

    let mut x = DVector::from_row_slice(x0);
    let mut r = DVector::<f64>::zeros(m);
    let mut r_new = DVector::<f64>::zeros(m);
    let mut jac = DMatrix::<f64>::zeros(m, n);

    problem.residuals(x.as_slice(), r.as_mut_slice());
    let mut sse = r.norm_squared();
    if !sse.is_finite() {
        return Err(LmFailure::NonFiniteStart);
    }

    let done = |x: &DVector<f64>, sse: f64, iterations: usize| LmReport {
        params: x.iter().copied().collect(),
        sse,
        iterations,
    };

    let mut lambda: Option<f64> = None;

    for iter in 0..opts.max_iterations {
        if sse == 0.0 {
            return Ok(done(&x, sse, iter));
        }

        problem.jacobian(x.as_slice(), &mut jac);
        let jt = jac.transpose();
        let jtj = &jt * &jac;
        let neg_g = -(&jt * &r);

        // Stationary to machine precision.
        let scale = jac.norm() * r.norm();
        if neg_g.amax() <= f64::EPSILON * (1.0 + scale) {
            return Ok(done(&x, sse, iter));
        }

        let diag: Vec<f64> = (0..n).map(|i| jtj[(i, i)].max(DIAG_FLOOR)).collect();
        let lambda = lambda.get_or_insert_with(|| {
            INITIAL_DAMPING * diag.iter().copied().fold(DIAG_FLOOR, f64::max)
        });

        // Raise the damping until a step lowers the cost.
        loop {
            let mut lhs = jtj.clone();
            for (i, d) in diag.iter().enumerate() {
                lhs[(i, i)] += *lambda * d;
            }

            let Some(step) = solve_least_squares(&lhs, &neg_g) else {
                *lambda *= 10.0;
                if *lambda > MAX_DAMPING {
                    return Err(LmFailure::NotConverged {
                        iterations: iter,
                        sse,
                        params: x.iter().copied().collect(),
                    });
                }
                continue;
            };

            let small_step = step.norm() <= opts.rel_tol * (x.norm() + opts.rel_tol);
            let x_new = &x + &step;
            problem.residuals(x_new.as_slice(), r_new.as_mut_slice());
            let sse_new = r_new.norm_squared();

            if sse_new.is_finite() && sse_new < sse {
                x = x_new;
                std::mem::swap(&mut r, &mut r_new);
                sse = sse_new;
                *lambda = (*lambda / 3.0).max(MIN_DAMPING);
                if small_step {
                    return Ok(done(&x, sse, iter + 1));
                }
                break;
            }

            // No descent left at the resolution of the step tolerance.
            if small_step {
                return Ok(done(&x, sse, iter + 1));
            }

            *lambda *= 2.0;
            if *lambda > MAX_DAMPING {
                return Err(LmFailure::NotConverged {
                    iterations: iter + 1,
                    sse,
                    params: x.iter().copied().collect(),
                });
            }
        }
    }

    Err(LmFailure::NotConverged {
        iterations: opts.max_iterations,
        sse,
        params: x.iter().copied().collect(),
    })
}
