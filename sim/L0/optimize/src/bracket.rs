//! Bracketing a minimum of a univariate function.
//!
//! # Algorithm
//!
//! Starting from two seed points, step downhill with geometrically growing
//! steps until the function turns back up:
//!
//! ```text
//! 1. Order the seeds so that f(b) <= f(a)
//! 2. c = b + φ·(b − a)
//! 3. While f(b) > f(c):
//!      u = parabolic extrapolation through (a, b, c),
//!          limited to b + 100·(c − b)
//!      accept u if it closes the bracket, otherwise take a golden step
//!      shift (a, b, c) ← (b, c, u)
//! ```
//!
//! The expansion budget is bounded. Exhausting it, or running into
//! non-finite locations or values, means the function has no locally
//! reachable minimum and is reported as
//! [`SimError::PoorlyConditioned`](sim_types::SimError).

use sim_types::{Result, SimError};
use tracing::trace;

use crate::function::UnivariateFunction;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Ratio by which successive bracket steps grow.
pub const GOLDEN_RATIO: f64 = 1.618_033_988_749_895;

/// Default number of bracket expansions before giving up.
pub const DEFAULT_MAX_EXPANSIONS: usize = 100;

/// Largest magnification a single parabolic extrapolation may take.
const MAX_PARABOLIC_MAGNIFICATION: f64 = 100.0;

/// Guards the parabolic extrapolation against a zero denominator.
const TINY: f64 = 1e-20;

/// A location on a line and the function value there.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinePoint {
    /// Location.
    pub x: f64,
    /// Function value at `x`.
    pub value: f64,
}

impl LinePoint {
    /// Create a point.
    #[must_use]
    pub const fn new(x: f64, value: f64) -> Self {
        Self { x, value }
    }
}

/// Three points known to contain a local minimum.
///
/// `b` lies strictly between `a` and `c` (in either order) and
/// `f(b) <= f(a)`, `f(b) <= f(c)`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bracket {
    /// First outer point.
    pub a: LinePoint,
    /// Interior point with the lowest value.
    pub b: LinePoint,
    /// Second outer point.
    pub c: LinePoint,
}

impl Bracket {
    /// Create a bracket, checking ordering and values.
    pub fn new(a: LinePoint, b: LinePoint, c: LinePoint) -> Result<Self> {
        let bracket = Self { a, b, c };
        if bracket.is_valid() {
            Ok(bracket)
        } else {
            Err(SimError::invalid_argument(format!(
                "({}, {}, {}) with values ({}, {}, {}) is not a bracket",
                a.x, b.x, c.x, a.value, b.value, c.value
            )))
        }
    }

    /// Whether `b` is interior and no higher than either end.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        let interior = (self.a.x < self.b.x && self.b.x < self.c.x)
            || (self.c.x < self.b.x && self.b.x < self.a.x);
        interior && self.b.value <= self.a.value && self.b.value <= self.c.value
    }

    /// Smaller end of the bracketed interval.
    #[must_use]
    pub fn lower(&self) -> f64 {
        self.a.x.min(self.c.x)
    }

    /// Larger end of the bracketed interval.
    #[must_use]
    pub fn upper(&self) -> f64 {
        self.a.x.max(self.c.x)
    }

    /// Width of the bracketed interval.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.upper() - self.lower()
    }

    /// Whether `x` lies within the closed interval.
    #[must_use]
    pub fn contains(&self, x: f64) -> bool {
        self.lower() <= x && x <= self.upper()
    }
}

/// Evaluate `function`, rejecting non-finite locations and values.
pub(crate) fn evaluate<F>(function: &F, x: f64) -> Result<f64>
where
    F: UnivariateFunction + ?Sized,
{
    if !x.is_finite() {
        return Err(SimError::poorly_conditioned(format!(
            "search left the finite range at x = {x}"
        )));
    }
    let value = function.value(x)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SimError::poorly_conditioned(format!(
            "non-finite function value {value} at x = {x}"
        )))
    }
}

/// Bracket a minimum starting from the seeds `x1` and `x2`.
///
/// Uses [`DEFAULT_MAX_EXPANSIONS`] as the expansion budget.
///
/// # Example
///
/// ```
/// use sim_optimize::find_bracket;
///
/// let bracket = find_bracket(&|x: f64| (x - 3.0).powi(2), 0.0, 1.0).unwrap();
/// assert!(bracket.contains(3.0));
/// assert!(bracket.b.value <= bracket.a.value && bracket.b.value <= bracket.c.value);
/// ```
pub fn find_bracket<F>(function: &F, x1: f64, x2: f64) -> Result<Bracket>
where
    F: UnivariateFunction + ?Sized,
{
    find_bracket_with_budget(function, x1, x2, DEFAULT_MAX_EXPANSIONS)
}

/// Bracket a minimum with an explicit expansion budget.
#[allow(clippy::float_cmp)]
pub fn find_bracket_with_budget<F>(
    function: &F,
    x1: f64,
    x2: f64,
    max_expansions: usize,
) -> Result<Bracket>
where
    F: UnivariateFunction + ?Sized,
{
    if !x1.is_finite() || !x2.is_finite() {
        return Err(SimError::invalid_argument(
            "bracket seeds must be finite",
        ));
    }
    if x1 == x2 {
        return Err(SimError::invalid_argument(
            "bracket seeds must be distinct",
        ));
    }

    let (mut a, mut b) = (x1, x2);
    let mut fa = evaluate(function, a)?;
    let mut fb = evaluate(function, b)?;
    if fb > fa {
        std::mem::swap(&mut a, &mut b);
        std::mem::swap(&mut fa, &mut fb);
    }

    let mut c = b + GOLDEN_RATIO * (b - a);
    let mut fc = evaluate(function, c)?;
    let mut expansions = 0;

    while fb > fc {
        if expansions >= max_expansions {
            return Err(SimError::poorly_conditioned(format!(
                "no bracket after {max_expansions} expansions (last point {c}, value {fc})"
            )));
        }
        expansions += 1;

        let r = (b - a) * (fb - fc);
        let q = (b - c) * (fb - fa);
        let denominator = 2.0 * (q - r).abs().max(TINY).copysign(q - r);
        let mut u = b - ((b - c) * q - (b - a) * r) / denominator;
        let limit = b + MAX_PARABOLIC_MAGNIFICATION * (c - b);

        let fu;
        if (b - u) * (u - c) > 0.0 {
            // Parabolic u lies between b and c.
            let f_trial = evaluate(function, u)?;
            if f_trial < fc {
                a = b;
                fa = fb;
                b = u;
                fb = f_trial;
                break;
            } else if f_trial > fb {
                c = u;
                fc = f_trial;
                break;
            }
            u = c + GOLDEN_RATIO * (c - b);
            fu = evaluate(function, u)?;
        } else if (c - u) * (u - limit) > 0.0 {
            // Parabolic u lies between c and the magnification limit.
            let mut f_trial = evaluate(function, u)?;
            if f_trial < fc {
                b = c;
                c = u;
                u = c + GOLDEN_RATIO * (c - b);
                fb = fc;
                fc = f_trial;
                f_trial = evaluate(function, u)?;
            }
            fu = f_trial;
        } else if (u - limit) * (limit - c) >= 0.0 {
            u = limit;
            fu = evaluate(function, u)?;
        } else {
            u = c + GOLDEN_RATIO * (c - b);
            fu = evaluate(function, u)?;
        }

        a = b;
        b = c;
        c = u;
        fa = fb;
        fb = fc;
        fc = fu;
    }

    trace!(a, b, c, fb, expansions, "bracketed minimum");
    Ok(Bracket {
        a: LinePoint::new(a, fa),
        b: LinePoint::new(b, fb),
        c: LinePoint::new(c, fc),
    })
}
