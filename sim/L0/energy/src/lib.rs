//! Energy-minimizing implicit time stepping.
//!
//! A time step is posed as a minimization. Every physical law the next state
//! must satisfy is written as a non-negative energy that vanishes when the
//! law holds; the accepted next state is the minimizer of their sum,
//! searched for from the previous state.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Stepper                              │
//! │       clock, current state, retry by timestep halving        │
//! └─────────────────────────┬───────────────────────────────────┘
//!                           │ solve(x₀, dt)
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       EnergySolver                           │
//! │     EnergyErrorFunction = Σ terms  →  Powell / PR-CG          │
//! └─────────────────────────┬───────────────────────────────────┘
//!                           │ evaluate(x₀, x, dt, ∇)
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Terms: mass, momentum, Newton, kinematics, versor, field    │
//! └─────────────────────────┬───────────────────────────────────┘
//!                           │ decode / accumulate
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │      Mappers: scalar, vector, quaternion, axis-angle         │
//! │                 allocated by StateLayout                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Layer 0
//!
//! This is a Layer 0 crate with **zero Bevy dependencies**. Everything is
//! synchronous and single-threaded; independent systems share no mutable
//! state.
//!
//! # Quick Start
//!
//! ```
//! use sim_energy::{EnergySolver, ParticleLayout, ParticleState};
//! use sim_types::{Gravity, MinimizerConfig, ReferenceScales, Vector3};
//!
//! let particle = ParticleLayout::new();
//! let gravity = Gravity::custom(Vector3::new(0.0, 0.0, -2.0));
//! let terms = particle.standard_terms(ReferenceScales::unit(), &gravity);
//! let solver = EnergySolver::new(particle.dimension(), terms, MinimizerConfig::high_accuracy())
//!     .unwrap();
//!
//! let start = ParticleState::in_field(1.0, Vector3::zeros(), Vector3::zeros(), &gravity);
//! let outcome = solver.solve(&start.encode(&particle).unwrap(), 1.0).unwrap();
//! let next = ParticleState::decode(&particle, &outcome.state).unwrap();
//!
//! // x = ½·a·dt², v = a·dt
//! assert!((next.position.z + 1.0).abs() < 1e-4);
//! assert!((next.velocity.z + 2.0).abs() < 1e-4);
//! ```

#![doc(html_root_url = "https://docs.rs/sim-energy/0.7.0")]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,     // Many methods can't be const due to nalgebra
    clippy::suboptimal_flops,          // mul_add style changes aren't always clearer
    clippy::missing_errors_doc,        // Error docs added where non-obvious
    clippy::many_single_char_names,    // m, v, a, x follow the physics
)]

mod function;
mod layout;
pub mod mapper;
mod particle;
mod solver;
mod stepper;
pub mod terms;

pub use function::EnergyErrorFunction;
pub use layout::StateLayout;
pub use mapper::{
    AxisAngle, AxisAngleMapper, DVectorMapper, QuaternionMapper, RotationMapper, ScalarMapper,
    StateSpaceMapper, Vector3Mapper, VectorMapper, check_disjoint,
};
pub use particle::{ParticleLayout, ParticleState};
pub use solver::{EnergySolver, StepOutcome};
pub use stepper::{StepResult, Stepper};
pub use terms::{
    EnergyTerm, MassConservation, MassTransfer, MomentumConservation, NewtonSecondLaw,
    PositionKinematics, Term, UniformField, VelocityKinematics, VersorConstraint,
};
