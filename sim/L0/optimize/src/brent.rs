//! Brent's method for minimizing a bracketed univariate function.
//!
//! # Algorithm
//!
//! Brent's method alternates between parabolic interpolation through the
//! three best points seen so far and golden-section steps. A parabolic step
//! is accepted only if it falls inside the current interval and moves less
//! than half the step before last; otherwise the larger sub-interval is cut
//! at the golden ratio. The interval shrinks monotonically and every
//! evaluation lies inside it.
//!
//! The derivative-assisted variant uses secant extrapolation of the slope
//! instead of a parabola and bisects (rather than golden-sections) toward the
//! downhill side.
//!
//! # Termination
//!
//! Both variants stop when the interval half-width around the best point
//! drops below `tolerance·|x| + ZEPS`. The absolute floor keeps a minimum at
//! exactly zero from demanding infinite relative precision.

use sim_types::{Result, SimError};
use tracing::trace;

use crate::bracket::{Bracket, evaluate};
use crate::function::{DifferentiableUnivariateFunction, UnivariateFunction};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Golden-section fraction `(3 - √5) / 2`.
const GOLDEN_SECTION: f64 = 0.381_966_011_250_105;

/// Absolute location tolerance for minima at zero.
const ZEPS: f64 = 1e-12;

/// Iteration budget for one search.
pub const BRENT_MAX_ITERATIONS: usize = 200;

/// The minimum found by a line search.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LineMinimum {
    /// Location of the minimum.
    pub x: f64,
    /// Function value at `x`.
    pub value: f64,
    /// Derivative at `x`, when the search was derivative-assisted.
    pub slope: Option<f64>,
    /// Iterations taken.
    pub iterations: usize,
}

fn check_search_inputs(bracket: &Bracket, tolerance: f64) -> Result<()> {
    if !tolerance.is_finite() || tolerance <= 0.0 {
        return Err(SimError::invalid_argument(format!(
            "line tolerance must be positive and finite, got {tolerance}"
        )));
    }
    if !bracket.is_valid() {
        return Err(SimError::invalid_argument(format!(
            "not a valid bracket: {bracket:?}"
        )));
    }
    Ok(())
}

/// Minimize `function` inside `bracket` to relative `tolerance`.
///
/// # Example
///
/// ```
/// use sim_optimize::{find_bracket, find_brent};
///
/// let f = |x: f64| (x - 3.0).powi(2);
/// let bracket = find_bracket(&f, 0.0, 1.0).unwrap();
/// let minimum = find_brent(&f, &bracket, 1e-8).unwrap();
/// assert!((minimum.x - 3.0).abs() < 1e-6);
/// ```
#[allow(clippy::float_cmp, clippy::many_single_char_names)] // exact identity of iterates
pub fn find_brent<F>(function: &F, bracket: &Bracket, tolerance: f64) -> Result<LineMinimum>
where
    F: UnivariateFunction + ?Sized,
{
    check_search_inputs(bracket, tolerance)?;

    let mut a = bracket.lower();
    let mut b = bracket.upper();
    let mut x = bracket.b.x;
    let mut w = x;
    let mut v = x;
    let mut fx = bracket.b.value;
    let mut fw = fx;
    let mut fv = fx;
    // Step before last, and last step.
    let mut e: f64 = 0.0;
    let mut d: f64 = 0.0;

    for iteration in 0..BRENT_MAX_ITERATIONS {
        let xm = 0.5 * (a + b);
        let tol1 = tolerance * x.abs() + ZEPS;
        let tol2 = 2.0 * tol1;
        if (x - xm).abs() <= tol2 - 0.5 * (b - a) {
            trace!(x, fx, iteration, "brent converged");
            return Ok(LineMinimum {
                x,
                value: fx,
                slope: None,
                iterations: iteration,
            });
        }

        if e.abs() > tol1 {
            let r = (x - w) * (fx - fv);
            let mut q = (x - v) * (fx - fw);
            let mut p = (x - v) * q - (x - w) * r;
            q = 2.0 * (q - r);
            if q > 0.0 {
                p = -p;
            }
            q = q.abs();
            let e_before_last = e;
            e = d;
            if p.abs() >= (0.5 * q * e_before_last).abs() || p <= q * (a - x) || p >= q * (b - x)
            {
                e = if x >= xm { a - x } else { b - x };
                d = GOLDEN_SECTION * e;
            } else {
                d = p / q;
                let u = x + d;
                if u - a < tol2 || b - u < tol2 {
                    d = tol1.copysign(xm - x);
                }
            }
        } else {
            e = if x >= xm { a - x } else { b - x };
            d = GOLDEN_SECTION * e;
        }

        let u = if d.abs() >= tol1 {
            x + d
        } else {
            x + tol1.copysign(d)
        };
        let fu = evaluate(function, u)?;

        if fu <= fx {
            if u >= x {
                a = x;
            } else {
                b = x;
            }
            v = w;
            fv = fw;
            w = x;
            fw = fx;
            x = u;
            fx = fu;
        } else {
            if u < x {
                a = u;
            } else {
                b = u;
            }
            if fu <= fw || w == x {
                v = w;
                fv = fw;
                w = u;
                fw = fu;
            } else if fu <= fv || v == x || v == w {
                v = u;
                fv = fu;
            }
        }
    }

    Err(SimError::poorly_conditioned(format!(
        "brent search did not converge in {BRENT_MAX_ITERATIONS} iterations"
    )))
}

/// Minimize a differentiable `function` inside `bracket`, using its slope.
///
/// Returns the slope at the minimum in [`LineMinimum::slope`].
#[allow(clippy::float_cmp, clippy::many_single_char_names, clippy::too_many_lines)]
pub fn find_brent_with_slope<F>(
    function: &F,
    bracket: &Bracket,
    tolerance: f64,
) -> Result<LineMinimum>
where
    F: DifferentiableUnivariateFunction + ?Sized,
{
    check_search_inputs(bracket, tolerance)?;

    let mut a = bracket.lower();
    let mut b = bracket.upper();
    let mut x = bracket.b.x;
    let (mut fx, mut dx) = evaluate_with_slope(function, x)?;
    let (mut w, mut fw, mut dw) = (x, fx, dx);
    let (mut v, mut fv, mut dv) = (x, fx, dx);
    let mut e: f64 = 0.0;
    let mut d: f64 = 0.0;

    for iteration in 0..BRENT_MAX_ITERATIONS {
        let xm = 0.5 * (a + b);
        let tol1 = tolerance * x.abs() + ZEPS;
        let tol2 = 2.0 * tol1;
        if (x - xm).abs() <= tol2 - 0.5 * (b - a) {
            trace!(x, fx, dx, iteration, "brent with slope converged");
            return Ok(LineMinimum {
                x,
                value: fx,
                slope: Some(dx),
                iterations: iteration,
            });
        }

        // Bisect toward the downhill side unless a secant step is acceptable.
        let mut bisect = true;
        if e.abs() > tol1 {
            let mut d1 = 2.0 * (b - a);
            let mut d2 = d1;
            if dw != dx {
                d1 = (w - x) * dx / (dx - dw);
            }
            if dv != dx {
                d2 = (v - x) * dx / (dx - dv);
            }
            let u1 = x + d1;
            let u2 = x + d2;
            let ok1 = (a - u1) * (u1 - b) > 0.0 && dx * d1 <= 0.0;
            let ok2 = (a - u2) * (u2 - b) > 0.0 && dx * d2 <= 0.0;
            let e_before_last = e;
            e = d;
            if ok1 || ok2 {
                let candidate = match (ok1, ok2) {
                    (true, true) => {
                        if d1.abs() < d2.abs() {
                            d1
                        } else {
                            d2
                        }
                    }
                    (true, false) => d1,
                    _ => d2,
                };
                if candidate.abs() <= (0.5 * e_before_last).abs() {
                    bisect = false;
                    d = candidate;
                    let u = x + d;
                    if u - a < tol2 || b - u < tol2 {
                        d = tol1.copysign(xm - x);
                    }
                }
            }
        }
        if bisect {
            e = if dx >= 0.0 { a - x } else { b - x };
            d = 0.5 * e;
        }

        let minimal_step = d.abs() < tol1;
        let u = if minimal_step { x + tol1.copysign(d) } else { x + d };
        let (fu, du) = evaluate_with_slope(function, u)?;
        if minimal_step && fu > fx {
            // Even the smallest allowed step goes uphill.
            trace!(x, fx, dx, iteration, "brent with slope converged");
            return Ok(LineMinimum {
                x,
                value: fx,
                slope: Some(dx),
                iterations: iteration + 1,
            });
        }

        if fu <= fx {
            if u >= x {
                a = x;
            } else {
                b = x;
            }
            (v, fv, dv) = (w, fw, dw);
            (w, fw, dw) = (x, fx, dx);
            (x, fx, dx) = (u, fu, du);
        } else {
            if u < x {
                a = u;
            } else {
                b = u;
            }
            if fu <= fw || w == x {
                (v, fv, dv) = (w, fw, dw);
                (w, fw, dw) = (u, fu, du);
            } else if fu < fv || v == x || v == w {
                (v, fv, dv) = (u, fu, du);
            }
        }
    }

    Err(SimError::poorly_conditioned(format!(
        "brent search with slope did not converge in {BRENT_MAX_ITERATIONS} iterations"
    )))
}

fn evaluate_with_slope<F>(function: &F, x: f64) -> Result<(f64, f64)>
where
    F: DifferentiableUnivariateFunction + ?Sized,
{
    if !x.is_finite() {
        return Err(SimError::poorly_conditioned(format!(
            "search left the finite range at x = {x}"
        )));
    }
    let (value, slope) = function.value_and_slope(x)?;
    if value.is_finite() && slope.is_finite() {
        Ok((value, slope))
    } else {
        Err(SimError::poorly_conditioned(format!(
            "non-finite value {value} or slope {slope} at x = {x}"
        )))
    }
}
