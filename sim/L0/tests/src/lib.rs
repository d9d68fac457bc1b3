//! Shared fixtures for the integration tests.
//!
//! Systems here are small and closed-form so that every test can compare
//! the minimized step against the exact answer.

#![warn(missing_docs)]

use nalgebra::Vector3;
use sim_energy::{
    EnergySolver, MassConservation, MomentumConservation, NewtonSecondLaw, ParticleLayout,
    ParticleState, PositionKinematics, ScalarMapper, StateLayout, Term, UniformField,
    VelocityKinematics,
};
use sim_types::{DVector, Gravity, MinimizerConfig, ReferenceScales, Result};

/// A single particle in a uniform field, ready to solve.
#[derive(Debug, Clone)]
pub struct FallingParticle {
    /// State indices.
    pub layout: ParticleLayout,
    /// Field acting on the particle.
    pub gravity: Gravity,
    /// Solver over the standard particle term set.
    pub solver: EnergySolver,
}

impl FallingParticle {
    /// Unit-scaled particle under `acceleration`.
    pub fn new(acceleration: Vector3<f64>, config: MinimizerConfig) -> Result<Self> {
        Self::scaled(acceleration, ReferenceScales::unit(), config)
    }

    /// Particle under `acceleration` whose terms use `scales`.
    pub fn scaled(
        acceleration: Vector3<f64>,
        scales: ReferenceScales,
        config: MinimizerConfig,
    ) -> Result<Self> {
        Self::build(ParticleLayout::new(), acceleration, scales, config)
    }

    /// Unit-scaled particle with an orientation under `acceleration`.
    pub fn oriented(acceleration: Vector3<f64>, config: MinimizerConfig) -> Result<Self> {
        Self::build(
            ParticleLayout::oriented(),
            acceleration,
            ReferenceScales::unit(),
            config,
        )
    }

    fn build(
        layout: ParticleLayout,
        acceleration: Vector3<f64>,
        scales: ReferenceScales,
        config: MinimizerConfig,
    ) -> Result<Self> {
        let gravity = Gravity::custom(acceleration);
        let terms = layout.standard_terms(scales, &gravity);
        let solver = EnergySolver::new(layout.dimension(), terms, config)?;
        Ok(Self {
            layout,
            gravity,
            solver,
        })
    }

    /// Encoded state of a particle of `mass` already in equilibrium with
    /// the field.
    pub fn start(
        &self,
        mass: f64,
        position: Vector3<f64>,
        velocity: Vector3<f64>,
    ) -> Result<DVector<f64>> {
        ParticleState::in_field(mass, position, velocity, &self.gravity).encode(&self.layout)
    }

    /// Decode a solved state.
    pub fn decode(&self, state: &DVector<f64>) -> Result<ParticleState> {
        ParticleState::decode(&self.layout, state)
    }
}

/// One spatial axis of a falling body: mass, position, velocity,
/// acceleration and force.
#[derive(Debug, Clone, Copy)]
pub struct AxisBody {
    /// Mass index.
    pub mass: ScalarMapper,
    /// Position index.
    pub position: ScalarMapper,
    /// Velocity index.
    pub velocity: ScalarMapper,
    /// Acceleration index.
    pub acceleration: ScalarMapper,
    /// Force index.
    pub force: ScalarMapper,
}

impl AxisBody {
    /// Allocate the five quantities.
    pub fn allocate(layout: &mut StateLayout) -> Self {
        Self {
            mass: layout.scalar(),
            position: layout.scalar(),
            velocity: layout.scalar(),
            acceleration: layout.scalar(),
            force: layout.scalar(),
        }
    }

    /// Closed-system terms for a body under field acceleration `g`.
    pub fn terms(&self, g: f64, scales: ReferenceScales) -> Vec<Term> {
        vec![
            MassConservation::new(self.mass, scales).into(),
            MomentumConservation::new(self.mass, self.velocity, scales)
                .with_force(self.force)
                .into(),
            NewtonSecondLaw::new(self.mass, self.velocity, self.acceleration, scales)
                .with_force(self.force)
                .into(),
            PositionKinematics::new(self.position, self.velocity, scales).into(),
            VelocityKinematics::new(self.velocity, self.acceleration, scales).into(),
            UniformField::new(self.force, self.mass, g, scales).into(),
        ]
    }

    /// A state whose force `m·g` and acceleration `g` already match the field.
    pub fn encode(&self, dimension: usize, m: f64, x: f64, v: f64, g: f64) -> DVector<f64> {
        let mut state = DVector::zeros(dimension);
        state[self.mass.index()] = m;
        state[self.position.index()] = x;
        state[self.velocity.index()] = v;
        state[self.acceleration.index()] = g;
        state[self.force.index()] = m * g;
        state
    }
}
