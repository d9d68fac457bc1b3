//! Result of a multidimensional minimization.

use nalgebra::DVector;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How a minimization ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Termination {
    /// The value stopped decreasing by more than the tolerance.
    ValueConverged,
    /// The conjugate-gradient coefficient vanished.
    GammaConverged,
    /// The gradient vanished.
    GradientVanished,
    /// A line search could not bracket a minimum; typical near a minimum
    /// where the gradient has numerically vanished.
    LineSearchStalled,
}

/// The minimum located by a multidimensional minimizer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Minimum {
    /// Location of the minimum.
    pub point: DVector<f64>,
    /// Function value at `point`.
    pub value: f64,
    /// Outer iterations taken.
    pub iterations: usize,
    /// Why the iteration stopped.
    pub termination: Termination,
}
