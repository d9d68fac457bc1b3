//! Central finite-difference gradients.
//!
//! Used to validate analytic gradients. The step for component `i` is
//! `step · max(1, |x_i|)` so large coordinates are not perturbed below
//! their own rounding error.

use nalgebra::DVector;
use sim_types::{Result, SimError, check_dimension};

use crate::function::MultivariateFunction;

/// Approximate the gradient of `function` at `x` by central differences.
pub fn finite_difference_gradient<F>(function: &F, x: &DVector<f64>, step: f64) -> Result<DVector<f64>>
where
    F: MultivariateFunction + ?Sized,
{
    check_dimension("finite difference point", function.dimension(), x.len())?;
    if !step.is_finite() || step <= 0.0 {
        return Err(SimError::invalid_argument(format!(
            "finite difference step must be positive, got {step}"
        )));
    }

    let mut gradient = DVector::zeros(x.len());
    let mut probe = x.clone();
    for i in 0..x.len() {
        let h = step * x[i].abs().max(1.0);
        probe[i] = x[i] + h;
        let forward = function.value(&probe)?;
        probe[i] = x[i] - h;
        let backward = function.value(&probe)?;
        probe[i] = x[i];
        gradient[i] = (forward - backward) / (2.0 * h);
    }
    Ok(gradient)
}
