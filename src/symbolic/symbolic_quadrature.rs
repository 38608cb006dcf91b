//! Numerical quadrature used when no closed-form antiderivative is available.
//!
//! [`adaptive_simpson`] halves intervals until the Simpson estimates of the two halves agree
//! with the estimate of the whole (`|S_l + S_r - S| <= 15*tol`) or the depth ceiling is hit.
//! It never fails because of accuracy: the best estimate is returned together with the
//! accumulated error estimate and a `converged` flag. Errors of the integrand itself
//! (domain errors, unbound variables) are propagated, except at the two bounds: an integrand
//! that is undefined exactly at a bound (`sin(x)/x` at `0`) is sampled a tiny step inside it.
//!
//! [`quad_gauss_legendre`] is a fixed-degree Gauss-Legendre rule, used as a reference.
use crate::Utils::config::QuadratureConfig;
use crate::symbolic::symbolic_error::{SymbolicError, SymbolicResult};
use gauss_quad::GaussLegendre;
use log::{debug, warn};

/// fraction of the interval a bound is moved inwards when the integrand is undefined on it
const ENDPOINT_NUDGE: f64 = 1e-10;
/// levels that are always subdivided, so that a coarse sample cannot accept by accident
const MIN_DEPTH: usize = 3;

#[derive(Clone, Debug, PartialEq)]
pub struct QuadratureOutcome {
    pub value: f64,
    /// sum of the local error estimates
    pub error_estimate: f64,
    /// false if some interval stopped at the depth ceiling without meeting its tolerance
    pub converged: bool,
    pub evaluations: usize,
}

impl QuadratureOutcome {
    /// Error estimate relative to the magnitude of the result.
    pub fn relative_error(&self) -> f64 {
        if self.value.abs() > f64::MIN_POSITIVE {
            self.error_estimate / self.value.abs()
        } else {
            self.error_estimate
        }
    }
}

struct Simpson<'a, F> {
    f: &'a F,
    max_depth: usize,
    evaluations: usize,
    error_estimate: f64,
    converged: bool,
}

impl<F> Simpson<'_, F>
where
    F: Fn(f64) -> SymbolicResult<f64>,
{
    fn eval(&mut self, x: f64) -> SymbolicResult<f64> {
        self.evaluations += 1;
        (self.f)(x)
    }

    /// Value at the bound `x`, or a tiny step towards `inside` if the bound is a domain error.
    fn eval_bound(&mut self, x: f64, inside: f64) -> SymbolicResult<f64> {
        match self.eval(x) {
            Err(SymbolicError::DomainError { operation, .. }) => {
                let nudged = x + (inside - x) * ENDPOINT_NUDGE;
                debug!("integrand undefined at bound {} ({}), sampling at {}", x, operation, nudged);
                self.eval(nudged)
            }
            other => other,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn refine(
        &mut self,
        a: f64,
        b: f64,
        fa: f64,
        fm: f64,
        fb: f64,
        whole: f64,
        tol: f64,
        depth: usize,
    ) -> SymbolicResult<f64> {
        let m = 0.5 * (a + b);
        let lm = 0.5 * (a + m);
        let rm = 0.5 * (m + b);
        let flm = self.eval(lm)?;
        let frm = self.eval(rm)?;
        let left = (m - a) / 6.0 * (fa + 4.0 * flm + fm);
        let right = (b - m) / 6.0 * (fm + 4.0 * frm + fb);
        let delta = left + right - whole;

        let accepted = depth >= MIN_DEPTH && delta.abs() <= 15.0 * tol;
        if accepted || depth >= self.max_depth {
            if !accepted {
                self.converged = false;
            }
            self.error_estimate += delta.abs() / 15.0;
            // Richardson extrapolation
            return Ok(left + right + delta / 15.0);
        }
        let left_value = self.refine(a, m, fa, flm, fm, left, 0.5 * tol, depth + 1)?;
        let right_value = self.refine(m, b, fm, frm, fb, right, 0.5 * tol, depth + 1)?;
        Ok(left_value + right_value)
    }
}

/// Adaptive Simpson quadrature of `f` over `[a, b]`.
///
/// The target accuracy is `max(relative_tolerance * |estimate|, absolute_tolerance)`;
/// intervals are halved at most `max_depth` times. Reversed bounds give the negated integral.
pub fn adaptive_simpson<F>(f: F, a: f64, b: f64, config: &QuadratureConfig) -> SymbolicResult<QuadratureOutcome>
where
    F: Fn(f64) -> SymbolicResult<f64>,
{
    if !a.is_finite() || !b.is_finite() {
        return Err(SymbolicError::domain("integration bound", if a.is_finite() { b } else { a }));
    }
    if a == b {
        return Ok(QuadratureOutcome {
            value: 0.0,
            error_estimate: 0.0,
            converged: true,
            evaluations: 0,
        });
    }
    let mut state = Simpson {
        f: &f,
        max_depth: config.max_depth,
        evaluations: 0,
        error_estimate: 0.0,
        converged: true,
    };
    let fa = state.eval_bound(a, b)?;
    let fb = state.eval_bound(b, a)?;
    let m = 0.5 * (a + b);
    let fm = state.eval(m)?;
    let whole = (b - a) / 6.0 * (fa + 4.0 * fm + fb);
    let tol = (config.relative_tolerance * whole.abs()).max(config.absolute_tolerance);

    let value = state.refine(a, b, fa, fm, fb, whole, tol, 0)?;
    if !state.converged {
        warn!(
            "adaptive Simpson stopped at depth {} on [{}, {}], error estimate {:e}",
            config.max_depth, a, b, state.error_estimate
        );
    }
    Ok(QuadratureOutcome {
        value,
        error_estimate: state.error_estimate,
        converged: state.converged,
        evaluations: state.evaluations,
    })
}

/// Gauss-Legendre quadrature of the given degree over `[a, b]`.
pub fn quad_gauss_legendre<F>(f: F, a: f64, b: f64, degree: usize) -> SymbolicResult<f64>
where
    F: Fn(f64) -> f64,
{
    let quad = GaussLegendre::new(degree).map_err(|e| {
        SymbolicError::malformed(format!("Failed to create Gauss-Legendre quadrature: {:?}", e))
    })?;
    Ok(quad.integrate(a, b, f))
}
