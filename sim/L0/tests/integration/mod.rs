//! Integration tests for the energy-minimizing integrator.
//!
//! These tests drive the full pipeline: state layout → term set → energy
//! function → minimizer → decoded state.
//! - Closed-form trajectories under constant acceleration
//! - Re-solving from an accepted state
//! - Multi-step runs through the stepper
//! - Open systems with mass transfer

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]

pub mod constant_acceleration;
pub mod fixed_point;
pub mod mass_transfer;
pub mod stepper_trajectory;
