//! Safeguarded Newton root finding for scalar functions.
//!
//! Newton steps converge fast near a simple root but can leave the region where
//! the function is well behaved. We keep a sign-changing bracket `[lo, hi]`
//! updated after every evaluation and fall back to bisection whenever a Newton
//! step would land outside it or is not shrinking fast enough.

use crate::domain::SolverOptions;

/// A converged root.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Root {
    pub x: f64,
    pub iterations: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum RootError {
    #[error("root is not bracketed by [{lo}, {hi}]")]
    NotBracketed { lo: f64, hi: f64 },

    #[error("non-finite value encountered at x={x}")]
    NonFinite { x: f64 },

    #[error("no convergence after {iterations} iterations (last x={last})")]
    Iterations { iterations: usize, last: f64 },
}

/// Find a root of `f` inside `[lo, hi]`, starting from `x0`.
///
/// `f` returns `(value, derivative)`. `f(lo)` and `f(hi)` must have opposite
/// signs (or one of them be zero). `x0` is clamped into the bracket.
pub fn newton_bracketed<F>(
    f: F,
    x0: f64,
    lo: f64,
    hi: f64,
    opts: &SolverOptions,
) -> Result<Root, RootError>
where
    F: Fn(f64) -> (f64, f64),
{
    let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    let (f_lo, _) = f(lo);
    let (f_hi, _) = f(hi);
    if !f_lo.is_finite() {
        return Err(RootError::NonFinite { x: lo });
    }
    if !f_hi.is_finite() {
        return Err(RootError::NonFinite { x: hi });
    }
    if f_lo == 0.0 {
        return Ok(Root { x: lo, iterations: 0 });
    }
    if f_hi == 0.0 {
        return Ok(Root { x: hi, iterations: 0 });
    }
    if f_lo.signum() == f_hi.signum() {
        return Err(RootError::NotBracketed { lo, hi });
    }

    // Orient the bracket so that f(neg) < 0 < f(pos).
    let (mut neg, mut pos) = if f_lo < 0.0 { (lo, hi) } else { (hi, lo) };

    let mut x = if x0.is_finite() { x0.clamp(lo, hi) } else { 0.5 * (lo + hi) };
    let mut dx_old = hi - lo;
    let mut dx = dx_old;
    let (mut fx, mut dfx) = f(x);

    for iter in 1..=opts.max_iterations {
        if !(fx.is_finite() && dfx.is_finite()) {
            return Err(RootError::NonFinite { x });
        }
        if fx == 0.0 {
            return Ok(Root {
                x,
                iterations: iter - 1,
            });
        }

        let newton_leaves_bracket = ((x - pos) * dfx - fx) * ((x - neg) * dfx - fx) > 0.0;
        let newton_too_slow = (2.0 * fx).abs() > (dx_old * dfx).abs();
        dx_old = dx;

        if newton_leaves_bracket || newton_too_slow {
            dx = 0.5 * (pos - neg);
            x = neg + dx;
        } else {
            dx = fx / dfx;
            x -= dx;
        }

        if dx.abs() <= opts.rel_tol * x.abs().max(f64::MIN_POSITIVE) {
            return Ok(Root {
                x,
                iterations: iter,
            });
        }

        (fx, dfx) = f(x);
        if fx < 0.0 {
            neg = x;
        } else {
            pos = x;
        }
    }

    Err(RootError::Iterations {
        iterations: opts.max_iterations,
        last: x,
    })
}
