//! Fletcher-Reeves-Polak-Ribière nonlinear conjugate gradient.
//!
//! # Algorithm
//!
//! ```text
//! g_0 = −∇f(x_0)                       (steepest descent)
//! h_0 = g_0
//! For k = 0, 1, 2, ...:
//!    x_{k+1} = line minimum of f from x_k along h_k
//!    g_{k+1} = −∇f(x_{k+1})
//!    γ_k = (g_{k+1} − g_k) · g_{k+1} / (g_k · g_k)      (Polak-Ribière)
//!    h_{k+1} = g_{k+1} + γ_k · h_k
//! ```
//!
//! # Convergence
//!
//! The iteration stops when any of these hold:
//!
//! - the value reduction of an iteration is at most `tolerance` times the
//!   largest reduction seen so far
//! - `|γ| < tolerance`
//! - the gradient is exactly zero
//! - a line search cannot bracket a minimum; near a minimum this is how a
//!   numerically vanished gradient shows up, so it counts as convergence
//!
//! A search direction that is numerically zero is replaced by a fixed unit
//! direction, so no division by zero happens next to a minimum.

use nalgebra::DVector;
use sim_types::{MinimizerConfig, Result, SimError, check_dimension};
use tracing::{debug, trace};

use crate::function::DifferentiableMultivariateFunction;
use crate::line::{LineSearch, minimise_along_line_with_gradient};
use crate::minimum::{Minimum, Termination};

/// Minimize `function` from `start` with Polak-Ribière conjugate gradient.
///
/// Uses [`MinimizerConfig::default`] apart from `tolerance`.
///
/// # Example
///
/// ```
/// use nalgebra::DVector;
/// use sim_optimize::{FnDifferentiable, find_fletcher_reeves_polak_ribiere};
///
/// let f = FnDifferentiable::new(2, |x: &DVector<f64>| {
///     let (dx, dy) = (x[0] - 1.0, x[1] + 2.0);
///     (dx * dx + 4.0 * dy * dy, DVector::from_vec(vec![2.0 * dx, 8.0 * dy]))
/// });
/// let minimum = find_fletcher_reeves_polak_ribiere(&f, &DVector::zeros(2), 1e-10).unwrap();
/// assert!((minimum.point[0] - 1.0).abs() < 1e-5);
/// assert!((minimum.point[1] + 2.0).abs() < 1e-5);
/// ```
pub fn find_fletcher_reeves_polak_ribiere<F>(
    function: &F,
    start: &DVector<f64>,
    tolerance: f64,
) -> Result<Minimum>
where
    F: DifferentiableMultivariateFunction + ?Sized,
{
    let config = MinimizerConfig::default().with_tolerance(tolerance);
    find_fletcher_reeves_polak_ribiere_with_config(function, start, &config)
}

/// Conjugate-gradient minimization with explicit settings.
pub fn find_fletcher_reeves_polak_ribiere_with_config<F>(
    function: &F,
    start: &DVector<f64>,
    config: &MinimizerConfig,
) -> Result<Minimum>
where
    F: DifferentiableMultivariateFunction + ?Sized,
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
    let (mut value, gradient) = function.value_and_gradient(&point)?;
    check_finite(value, &gradient)?;

    let mut descent = -gradient;
    let mut conjugate = descent.clone();
    let mut largest_reduction: f64 = 0.0;

    for iteration in 1..=config.max_iterations {
        let mut direction = usable_direction(&conjugate);
        let (new_value, new_gradient) =
            match minimise_along_line_with_gradient(function, &mut point, &mut direction, &search) {
                Ok(result) => result,
                Err(err) if err.is_poorly_conditioned() => {
                    debug!(iterations = iteration, value, %err, "line search stalled; accepting point");
                    return Ok(Minimum {
                        point,
                        value,
                        iterations: iteration,
                        termination: Termination::LineSearchStalled,
                    });
                }
                Err(err) => return Err(err),
            };
        check_finite(new_value, &new_gradient)?;

        let reduction = value - new_value;
        largest_reduction = largest_reduction.max(reduction);
        value = new_value;
        trace!(iteration, value, reduction, "conjugate gradient iteration");

        if reduction <= config.tolerance * largest_reduction {
            return Ok(converged(point, value, iteration, Termination::ValueConverged));
        }

        let new_descent = -new_gradient;
        let gg = descent.norm_squared();
        if gg == 0.0 || new_descent.norm_squared() == 0.0 {
            return Ok(converged(point, value, iteration, Termination::GradientVanished));
        }

        let gamma = (&new_descent - &descent).dot(&new_descent) / gg;
        if gamma.abs() < config.tolerance {
            return Ok(converged(point, value, iteration, Termination::GammaConverged));
        }

        conjugate = &new_descent + &conjugate * gamma;
        descent = new_descent;
    }

    Err(SimError::poorly_conditioned(format!(
        "conjugate gradient did not converge in {} iterations",
        config.max_iterations
    )))
}

fn converged(point: DVector<f64>, value: f64, iterations: usize, termination: Termination) -> Minimum {
    debug!(iterations, value, ?termination, "conjugate gradient converged");
    Minimum {
        point,
        value,
        iterations,
        termination,
    }
}

/// The search direction, or a fixed unit direction if it has vanished.
fn usable_direction(direction: &DVector<f64>) -> DVector<f64> {
    if direction.norm_squared() < f64::MIN_POSITIVE {
        let n = direction.len();
        #[allow(clippy::cast_precision_loss)]
        let component = 1.0 / (n as f64).sqrt();
        DVector::from_element(n, component)
    } else {
        direction.clone()
    }
}

fn check_finite(value: f64, gradient: &DVector<f64>) -> Result<()> {
    if value.is_finite() && gradient.iter().all(|g| g.is_finite()) {
        Ok(())
    } else {
        Err(SimError::poorly_conditioned(format!(
            "non-finite value {value} or gradient during conjugate gradient"
        )))
    }
}
