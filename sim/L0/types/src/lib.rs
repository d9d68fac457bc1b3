//! Shared types for the energy-minimizing integrator.
//!
//! This crate provides the vocabulary used by the minimizer and the
//! physical-law layer:
//!
//! - [`SimError`] - Precondition and numerical failures
//! - [`ReferenceScales`] - Characteristic magnitudes that turn law violations
//!   into energies
//! - [`MinimizerConfig`], [`IntegratorConfig`] - Tolerances, budgets and
//!   retry policy
//! - [`Gravity`] - Uniform field acceleration
//!
//! # Layer 0
//!
//! This is a Layer 0 crate with **zero Bevy dependencies**. It can be used in
//! headless tools, tests and other engines.
//!
//! # Example
//!
//! ```
//! use sim_types::{IntegratorConfig, MinimizerMethod, ReferenceScales};
//!
//! let scales = ReferenceScales::for_motion(1.0, 0.1, 0.01);
//! assert!(scales.validate().is_ok());
//!
//! let config = IntegratorConfig::with_timestep(0.01);
//! assert_eq!(config.minimizer.method, MinimizerMethod::ConjugateGradient);
//! ```

#![doc(html_root_url = "https://docs.rs/sim-types/0.7.0")]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,     // Many methods can't be const due to nalgebra
    clippy::suboptimal_flops,          // mul_add style changes aren't always clearer
    clippy::missing_errors_doc,        // Error docs added where non-obvious
)]

mod config;
mod error;
mod field;
mod scales;

pub use config::{IntegratorConfig, MinimizerConfig, MinimizerMethod};
pub use error::{SimError, check_dimension, check_timestep};
pub use field::Gravity;
pub use scales::ReferenceScales;

// Re-export math types for convenience
pub use nalgebra::{DVector, Quaternion, SVector, Unit, UnitQuaternion, Vector3};

/// Flat state vector: every tracked degree of freedom at one instant.
pub type StateVector = DVector<f64>;

/// Result type for integrator operations.
pub type Result<T> = std::result::Result<T, SimError>;
