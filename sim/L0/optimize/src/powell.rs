//! Powell's direction-set method.
//!
//! # Algorithm
//!
//! ```text
//! directions ← coordinate basis
//! repeat:
//!     minimize along each direction in turn
//!     Δ ← net displacement of this iteration
//!     if the extrapolated point p + Δ is promising:
//!         minimize along Δ
//!         replace the direction of largest decrease with Δ
//!     every N iterations: directions ← coordinate basis
//! until the fractional decrease over an iteration is below tolerance
//! ```
//!
//! The direction of largest decrease is the one discarded because it is
//! the largest component of Δ; keeping both would push the set toward
//! linear dependence. Unmodified Powell still drifts toward a dependent set,
//! so the basis is restored every N iterations. Convergence is never
//! declared before N iterations, i.e. before every coordinate has been
//! searched at least once.
//!
//! Only function values are used.

use nalgebra::{DMatrix, DVector};
use sim_types::{MinimizerConfig, Result, SimError, check_dimension};
use tracing::{debug, trace};

use crate::function::MultivariateFunction;
use crate::line::{LineSearch, minimise_along_line};
use crate::minimum::{Minimum, Termination};

/// Guards the fractional-decrease test when the minimum value is zero.
const TINY: f64 = 1e-25;

/// Minimize `function` from `start` with Powell's method.
///
/// Uses [`MinimizerConfig::default`] apart from `tolerance`.
///
/// # Example
///
/// ```
/// use nalgebra::DVector;
/// use sim_optimize::{FnMultivariate, find_powell};
///
/// let f = FnMultivariate::new(2, |x: &DVector<f64>| {
///     (x[0] - 1.0).powi(2) + 4.0 * (x[1] + 2.0).powi(2)
/// });
/// let minimum = find_powell(&f, &DVector::zeros(2), 1e-6).unwrap();
/// assert!((minimum.point[0] - 1.0).abs() < 1e-6);
/// assert!((minimum.point[1] + 2.0).abs() < 1e-6);
/// ```
pub fn find_powell<F>(function: &F, start: &DVector<f64>, tolerance: f64) -> Result<Minimum>
where
    F: MultivariateFunction + ?Sized,
{
    let config = MinimizerConfig::default().with_tolerance(tolerance);
    find_powell_with_config(function, start, &config)
}

/// Minimize `function` from `start` with Powell's method and explicit settings.
pub fn find_powell_with_config<F>(
    function: &F,
    start: &DVector<f64>,
    config: &MinimizerConfig,
) -> Result<Minimum>
where
    F: MultivariateFunction + ?Sized,
{
    let n = function.dimension();
    if n == 0 {
        return Err(SimError::invalid_argument(
            "cannot minimize a function of zero variables",
        ));
    }
    check_dimension("starting point", n, start.len())?;
    config.validate()?;

    let search = LineSearch::from(config);
    let mut point = start.clone();
    let mut directions = DMatrix::<f64>::identity(n, n);
    let mut value = function.value(&point)?;
    if !value.is_finite() {
        return Err(SimError::poorly_conditioned(format!(
            "non-finite value {value} at the starting point"
        )));
    }
    let mut iteration_start = point.clone();

    for iteration in 1..=config.max_iterations {
        let value_at_start = value;
        let mut biggest = 0;
        let mut largest_decrease = 0.0;

        for i in 0..n {
            let mut direction = directions.column(i).into_owned();
            let before = value;
            value = minimise_along_line(function, &mut point, &mut direction, &search)?;
            if before - value > largest_decrease {
                largest_decrease = before - value;
                biggest = i;
            }
        }

        let decrease = value_at_start - value;
        trace!(iteration, value, decrease, "powell iteration");
        if 2.0 * decrease <= config.tolerance * (value_at_start.abs() + value.abs()) + TINY
            && iteration >= n
        {
            debug!(iterations = iteration, value, "powell converged");
            return Ok(Minimum {
                point,
                value,
                iterations: iteration,
                termination: Termination::ValueConverged,
            });
        }

        if iteration % n == 0 {
            directions.fill_with_identity();
            iteration_start.copy_from(&point);
            trace!(iteration, "powell direction set reset");
            continue;
        }

        let extrapolated = &point * 2.0 - &iteration_start;
        let mut displacement = &point - &iteration_start;
        iteration_start.copy_from(&point);

        let value_extrapolated = function.value(&extrapolated)?;
        if value_extrapolated < value_at_start {
            let t = 2.0
                * (value_at_start - 2.0 * value + value_extrapolated)
                * (value_at_start - value - largest_decrease).powi(2)
                - largest_decrease * (value_at_start - value_extrapolated).powi(2);
            if t < 0.0 {
                value = minimise_along_line(function, &mut point, &mut displacement, &search)?;
                let last = directions.column(n - 1).into_owned();
                directions.set_column(biggest, &last);
                directions.set_column(n - 1, &displacement);
            }
        }
    }

    Err(SimError::poorly_conditioned(format!(
        "powell did not converge in {} iterations",
        config.max_iterations
    )))
}
