//! Restricting a multidimensional function to a line.
//!
//! [`LineFunction`] is an explicit value holding the wrapped function, the
//! origin and the direction, so the borrows of all three are visible in its
//! type. It is the bridge between the scalar searches in
//! [`bracket`](crate::bracket)/[`brent`](crate::brent) and the
//! multidimensional minimizers.

use nalgebra::DVector;
use sim_types::{MinimizerConfig, Result, check_dimension};
use tracing::trace;

use crate::bracket::{DEFAULT_MAX_EXPANSIONS, find_bracket_with_budget};
use crate::brent::{find_brent, find_brent_with_slope};
use crate::function::{
    DifferentiableMultivariateFunction, DifferentiableUnivariateFunction, MultivariateFunction,
    UnivariateFunction,
};

/// The univariate function `w ↦ f(origin + w·direction)`.
#[derive(Debug, Clone, Copy)]
pub struct LineFunction<'a, F: ?Sized> {
    function: &'a F,
    origin: &'a DVector<f64>,
    direction: &'a DVector<f64>,
}

impl<'a, F> LineFunction<'a, F>
where
    F: MultivariateFunction + ?Sized,
{
    /// Restrict `function` to the line through `origin` along `direction`.
    ///
    /// Fails if either vector does not match the function's dimension.
    pub fn new(
        function: &'a F,
        origin: &'a DVector<f64>,
        direction: &'a DVector<f64>,
    ) -> Result<Self> {
        check_dimension("line origin", function.dimension(), origin.len())?;
        check_dimension("line direction", function.dimension(), direction.len())?;
        Ok(Self {
            function,
            origin,
            direction,
        })
    }

    /// The point at parameter `w` along the line.
    #[must_use]
    pub fn point_at(&self, w: f64) -> DVector<f64> {
        let mut point = self.origin.clone();
        point.axpy(w, self.direction, 1.0);
        point
    }

    /// Line origin.
    #[must_use]
    pub fn origin(&self) -> &DVector<f64> {
        self.origin
    }

    /// Line direction.
    #[must_use]
    pub fn direction(&self) -> &DVector<f64> {
        self.direction
    }
}

impl<F> UnivariateFunction for LineFunction<'_, F>
where
    F: MultivariateFunction + ?Sized,
{
    fn value(&self, w: f64) -> Result<f64> {
        self.function.value(&self.point_at(w))
    }
}

impl<F> DifferentiableUnivariateFunction for LineFunction<'_, F>
where
    F: DifferentiableMultivariateFunction + ?Sized,
{
    fn value_and_slope(&self, w: f64) -> Result<(f64, f64)> {
        let (value, gradient) = self.function.value_and_gradient(&self.point_at(w))?;
        Ok((value, gradient.dot(self.direction)))
    }
}

/// Settings for one line minimization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSearch {
    /// Relative tolerance on the minimum's location along the line.
    pub tolerance: f64,
    /// Bracket expansion budget.
    pub max_bracket_iterations: usize,
}

impl Default for LineSearch {
    fn default() -> Self {
        Self {
            tolerance: 1e-7,
            max_bracket_iterations: DEFAULT_MAX_EXPANSIONS,
        }
    }
}

impl From<&MinimizerConfig> for LineSearch {
    fn from(config: &MinimizerConfig) -> Self {
        Self {
            tolerance: config.line_tolerance,
            max_bracket_iterations: config.max_bracket_iterations,
        }
    }
}

/// Minimize `function` along `direction` from `point`.
///
/// On success `point` is moved to the minimum, `direction` is replaced by
/// the displacement actually made, and the minimum value is returned. On
/// failure both are left untouched.
pub fn minimise_along_line<F>(
    function: &F,
    point: &mut DVector<f64>,
    direction: &mut DVector<f64>,
    search: &LineSearch,
) -> Result<f64>
where
    F: MultivariateFunction + ?Sized,
{
    let minimum = {
        let line = LineFunction::new(function, point, direction)?;
        let bracket = find_bracket_with_budget(&line, 0.0, 1.0, search.max_bracket_iterations)?;
        find_brent(&line, &bracket, search.tolerance)?
    };

    direction.scale_mut(minimum.x);
    *point += &*direction;
    trace!(step = minimum.x, value = minimum.value, "line minimum");
    Ok(minimum.value)
}

/// Gradient-aware [`minimise_along_line`].
///
/// Returns the value and full gradient at the new point.
pub fn minimise_along_line_with_gradient<F>(
    function: &F,
    point: &mut DVector<f64>,
    direction: &mut DVector<f64>,
    search: &LineSearch,
) -> Result<(f64, DVector<f64>)>
where
    F: DifferentiableMultivariateFunction + ?Sized,
{
    let minimum = {
        let line = LineFunction::new(function, point, direction)?;
        let bracket = find_bracket_with_budget(&line, 0.0, 1.0, search.max_bracket_iterations)?;
        find_brent_with_slope(&line, &bracket, search.tolerance)?
    };

    direction.scale_mut(minimum.x);
    *point += &*direction;
    let (value, gradient) = function.value_and_gradient(point)?;
    trace!(step = minimum.x, value, "line minimum with gradient");
    Ok((value, gradient))
}
