//! Function abstractions shared by the scalar and multidimensional minimizers.
//!
//! Scalar functions are the interchange type between the two layers: a
//! [`LineFunction`](crate::LineFunction) turns a multidimensional function
//! into a [`UnivariateFunction`] that the bracketing and Brent searches can
//! consume.
//!
//! Evaluation is fallible. The only failures are precondition violations
//! (a point of the wrong dimension); numerical trouble is reported by the
//! minimizers, not by the functions.
//!
//! Gradients are returned by value. No buffer is shared between nested
//! evaluations.

use std::fmt;

use nalgebra::DVector;
use sim_types::{Result, check_dimension};

/// A real function of one real variable.
pub trait UnivariateFunction {
    /// Evaluate the function at `x`.
    fn value(&self, x: f64) -> Result<f64>;
}

impl<F> UnivariateFunction for F
where
    F: Fn(f64) -> f64,
{
    fn value(&self, x: f64) -> Result<f64> {
        Ok(self(x))
    }
}

/// A univariate function that also knows its derivative.
pub trait DifferentiableUnivariateFunction: UnivariateFunction {
    /// Evaluate the function and its derivative at `x`.
    fn value_and_slope(&self, x: f64) -> Result<(f64, f64)>;
}

/// Adapter for a closure returning `(value, slope)`.
///
/// ```
/// use sim_optimize::{DifferentiableUnivariateFunction, SlopeFn};
///
/// let parabola = SlopeFn(|x: f64| ((x - 3.0).powi(2), 2.0 * (x - 3.0)));
/// assert_eq!(parabola.value_and_slope(3.0).unwrap(), (0.0, 0.0));
/// ```
#[derive(Clone, Copy)]
pub struct SlopeFn<F>(pub F);

impl<F> fmt::Debug for SlopeFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SlopeFn").finish_non_exhaustive()
    }
}

impl<F> UnivariateFunction for SlopeFn<F>
where
    F: Fn(f64) -> (f64, f64),
{
    fn value(&self, x: f64) -> Result<f64> {
        Ok((self.0)(x).0)
    }
}

impl<F> DifferentiableUnivariateFunction for SlopeFn<F>
where
    F: Fn(f64) -> (f64, f64),
{
    fn value_and_slope(&self, x: f64) -> Result<(f64, f64)> {
        Ok((self.0)(x))
    }
}

/// A real function of a fixed-dimension real vector.
pub trait MultivariateFunction {
    /// Dimension of the argument vector.
    fn dimension(&self) -> usize;

    /// Evaluate the function at `x`.
    ///
    /// Fails with [`SimError::DimensionMismatch`](sim_types::SimError) when
    /// `x` does not have [`dimension`](Self::dimension) components.
    fn value(&self, x: &DVector<f64>) -> Result<f64>;
}

/// A multivariate function with an analytic gradient.
pub trait DifferentiableMultivariateFunction: MultivariateFunction {
    /// Evaluate the function and its gradient at `x`.
    fn value_and_gradient(&self, x: &DVector<f64>) -> Result<(f64, DVector<f64>)>;
}

/// Adapter for a closure over vectors of a fixed dimension.
#[derive(Clone, Copy)]
pub struct FnMultivariate<F> {
    dimension: usize,
    function: F,
}

impl<F> fmt::Debug for FnMultivariate<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnMultivariate")
            .field("dimension", &self.dimension)
            .finish_non_exhaustive()
    }
}

impl<F> FnMultivariate<F>
where
    F: Fn(&DVector<f64>) -> f64,
{
    /// Wrap `function`, which accepts vectors of `dimension` components.
    #[must_use]
    pub fn new(dimension: usize, function: F) -> Self {
        Self {
            dimension,
            function,
        }
    }
}

impl<F> MultivariateFunction for FnMultivariate<F>
where
    F: Fn(&DVector<f64>) -> f64,
{
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn value(&self, x: &DVector<f64>) -> Result<f64> {
        check_dimension("function argument", self.dimension, x.len())?;
        Ok((self.function)(x))
    }
}

/// Adapter for a closure returning `(value, gradient)`.
#[derive(Clone, Copy)]
pub struct FnDifferentiable<F> {
    dimension: usize,
    function: F,
}

impl<F> fmt::Debug for FnDifferentiable<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnDifferentiable")
            .field("dimension", &self.dimension)
            .finish_non_exhaustive()
    }
}

impl<F> FnDifferentiable<F>
where
    F: Fn(&DVector<f64>) -> (f64, DVector<f64>),
{
    /// Wrap `function`, which accepts vectors of `dimension` components.
    #[must_use]
    pub fn new(dimension: usize, function: F) -> Self {
        Self {
            dimension,
            function,
        }
    }
}

impl<F> MultivariateFunction for FnDifferentiable<F>
where
    F: Fn(&DVector<f64>) -> (f64, DVector<f64>),
{
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn value(&self, x: &DVector<f64>) -> Result<f64> {
        check_dimension("function argument", self.dimension, x.len())?;
        Ok((self.function)(x).0)
    }
}

impl<F> DifferentiableMultivariateFunction for FnDifferentiable<F>
where
    F: Fn(&DVector<f64>) -> (f64, DVector<f64>),
{
    fn value_and_gradient(&self, x: &DVector<f64>) -> Result<(f64, DVector<f64>)> {
        check_dimension("function argument", self.dimension, x.len())?;
        let (value, gradient) = (self.function)(x);
        check_dimension("function gradient", self.dimension, gradient.len())?;
        Ok((value, gradient))
    }
}
