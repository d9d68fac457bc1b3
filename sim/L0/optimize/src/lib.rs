//! Scalar and multidimensional minimization.
//!
//! This crate provides the numerical engine behind the energy-minimizing
//! integrator. It is deliberately independent of physics: anything that
//! implements [`MultivariateFunction`] can be minimized.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │            Powell            Conjugate gradient (PR)         │
//! │   value-only direction set   gradient-aware, γ-restarted     │
//! └─────────────────────────┬───────────────────────────────────┘
//!                           │ minimise_along_line
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      LineFunction                            │
//! │        w ↦ f(x₀ + w·dx), slope = ∇f · dx                      │
//! └─────────────────────────┬───────────────────────────────────┘
//!                           │
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │          find_bracket  →  find_brent / with slope            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Failure semantics
//!
//! Mismatched dimensions and invalid tolerances are precondition violations.
//! A line search that cannot bracket a minimum, or an outer iteration that
//! exhausts its budget, is
//! [`SimError::PoorlyConditioned`](sim_types::SimError). Nothing is retried
//! internally.
//!
//! # Quick Start
//!
//! ```
//! use nalgebra::DVector;
//! use sim_optimize::{FnMultivariate, find_powell};
//!
//! let f = FnMultivariate::new(2, |x: &DVector<f64>| {
//!     (x[0] - 1.0).powi(2) + 4.0 * (x[1] + 2.0).powi(2)
//! });
//! let minimum = find_powell(&f, &DVector::zeros(2), 1e-6).unwrap();
//! assert!(minimum.value < 1e-10);
//! ```

#![doc(html_root_url = "https://docs.rs/sim-optimize/0.7.0")]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,     // Many methods can't be const due to nalgebra
    clippy::suboptimal_flops,          // mul_add style changes aren't always clearer
    clippy::missing_errors_doc,        // Error docs added where non-obvious
)]

pub mod bracket;
pub mod brent;
pub mod conjugate_gradient;
mod finite_difference;
mod function;
pub mod line;
mod minimum;
pub mod powell;

pub use bracket::{Bracket, GOLDEN_RATIO, LinePoint, find_bracket, find_bracket_with_budget};
pub use brent::{LineMinimum, find_brent, find_brent_with_slope};
pub use conjugate_gradient::{
    find_fletcher_reeves_polak_ribiere, find_fletcher_reeves_polak_ribiere_with_config,
};
pub use finite_difference::finite_difference_gradient;
pub use function::{
    DifferentiableMultivariateFunction, DifferentiableUnivariateFunction, FnDifferentiable,
    FnMultivariate, MultivariateFunction, SlopeFn, UnivariateFunction,
};
pub use line::{LineFunction, LineSearch, minimise_along_line, minimise_along_line_with_gradient};
pub use minimum::{Minimum, Termination};
pub use powell::{find_powell, find_powell_with_config};
