//! A point mass in a uniform field.
//!
//! [`ParticleLayout`] allocates the quantities of one particle and assembles
//! the standard term set that governs it. [`ParticleState`] is the decoded,
//! structured view of those quantities.

use nalgebra::{DVector, UnitQuaternion, Vector3};
use sim_types::{Gravity, ReferenceScales, Result, SimError};

use crate::layout::StateLayout;
use crate::mapper::{
    QuaternionMapper, RotationMapper, ScalarMapper, StateSpaceMapper, Vector3Mapper,
};
use crate::terms::{
    MassConservation, MomentumConservation, NewtonSecondLaw, PositionKinematics, Term,
    UniformField, VelocityKinematics, VersorConstraint,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// State indices of one particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParticleLayout {
    /// Mass (kg).
    pub mass: ScalarMapper,
    /// Position (m).
    pub position: Vector3Mapper,
    /// Velocity (m/s).
    pub velocity: Vector3Mapper,
    /// Acceleration (m/s²).
    pub acceleration: Vector3Mapper,
    /// Net applied force (N).
    pub force: Vector3Mapper,
    /// Orientation quaternion, if the particle carries one.
    pub orientation: Option<QuaternionMapper>,
}

impl Default for ParticleLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl ParticleLayout {
    /// A single particle occupying a state of its own.
    #[must_use]
    pub fn new() -> Self {
        Self::allocate(&mut StateLayout::new())
    }

    /// A single oriented particle occupying a state of its own.
    #[must_use]
    pub fn oriented() -> Self {
        Self::allocate_oriented(&mut StateLayout::new())
    }

    /// Allocate a particle in a shared layout.
    pub fn allocate(layout: &mut StateLayout) -> Self {
        Self {
            mass: layout.scalar(),
            position: layout.vector(),
            velocity: layout.vector(),
            acceleration: layout.vector(),
            force: layout.vector(),
            orientation: None,
        }
    }

    /// Allocate an oriented particle in a shared layout.
    pub fn allocate_oriented(layout: &mut StateLayout) -> Self {
        let mut particle = Self::allocate(layout);
        particle.orientation = Some(layout.quaternion());
        particle
    }

    /// Smallest state dimension holding every quantity of this particle.
    #[must_use]
    pub fn dimension(&self) -> usize {
        let translational = [
            self.mass.required_dimension(),
            self.position.required_dimension(),
            self.velocity.required_dimension(),
            self.acceleration.required_dimension(),
            self.force.required_dimension(),
        ];
        translational
            .into_iter()
            .chain(self.orientation.map(|q| q.required_dimension()))
            .max()
            .unwrap_or(0)
    }

    /// Terms for a closed particle whose only force is the field.
    ///
    /// Mass conservation, momentum conservation and Newton's law per axis,
    /// position and velocity kinematics per axis, the field force per axis,
    /// and a versor constraint when the particle is oriented.
    #[must_use]
    pub fn standard_terms(&self, scales: ReferenceScales, field: &Gravity) -> Vec<Term> {
        let mut terms: Vec<Term> = vec![MassConservation::new(self.mass, scales).into()];

        let velocities = self.velocity.components();
        let accelerations = self.acceleration.components();
        let forces = self.force.components();
        for axis in 0..3 {
            terms.push(
                MomentumConservation::new(self.mass, velocities[axis], scales)
                    .with_force(forces[axis])
                    .into(),
            );
            terms.push(
                NewtonSecondLaw::new(self.mass, velocities[axis], accelerations[axis], scales)
                    .with_force(forces[axis])
                    .into(),
            );
        }

        terms.extend(
            PositionKinematics::per_axis(&self.position, &self.velocity, scales)
                .into_iter()
                .map(Term::from),
        );
        terms.extend(
            VelocityKinematics::per_axis(&self.velocity, &self.acceleration, scales)
                .into_iter()
                .map(Term::from),
        );
        terms.extend(
            UniformField::per_axis(&self.force, self.mass, field, scales)
                .into_iter()
                .map(Term::from),
        );
        if let Some(orientation) = self.orientation {
            terms.push(VersorConstraint::new(orientation, scales).into());
        }
        terms
    }
}

/// Structured values of one particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleState {
    /// Mass (kg).
    pub mass: f64,
    /// Position (m).
    pub position: Vector3<f64>,
    /// Velocity (m/s).
    pub velocity: Vector3<f64>,
    /// Acceleration (m/s²).
    pub acceleration: Vector3<f64>,
    /// Net applied force (N).
    pub force: Vector3<f64>,
    /// Orientation, if any.
    pub orientation: Option<UnitQuaternion<f64>>,
}

impl ParticleState {
    /// A particle at rest with no forces.
    #[must_use]
    pub fn at_rest(mass: f64, position: Vector3<f64>) -> Self {
        Self {
            mass,
            position,
            velocity: Vector3::zeros(),
            acceleration: Vector3::zeros(),
            force: Vector3::zeros(),
            orientation: None,
        }
    }

    /// A particle whose force and acceleration already match the field.
    #[must_use]
    pub fn in_field(
        mass: f64,
        position: Vector3<f64>,
        velocity: Vector3<f64>,
        field: &Gravity,
    ) -> Self {
        Self {
            mass,
            position,
            velocity,
            acceleration: field.acceleration,
            force: field.force_on_mass(mass),
            orientation: None,
        }
    }

    /// Attach an orientation.
    #[must_use]
    pub fn with_orientation(mut self, orientation: UnitQuaternion<f64>) -> Self {
        self.orientation = Some(orientation);
        self
    }

    /// Add this particle's values into `state` at the layout's indices.
    ///
    /// An oriented layout with no orientation set stores the identity.
    pub fn encode_into(&self, layout: &ParticleLayout, state: &mut DVector<f64>) -> Result<()> {
        let orientation = match (layout.orientation, self.orientation) {
            (Some(mapper), rotation) => {
                Some((mapper, rotation.unwrap_or_else(UnitQuaternion::identity)))
            }
            (None, Some(_)) => {
                return Err(SimError::invalid_argument(
                    "particle has an orientation but its layout stores none",
                ));
            }
            (None, None) => None,
        };
        if state.len() < layout.dimension() {
            return Err(SimError::IndexOutOfRange {
                index: layout.dimension() - 1,
                dimension: state.len(),
            });
        }

        layout.mass.accumulate(state, &self.mass)?;
        layout.position.accumulate(state, &self.position)?;
        layout.velocity.accumulate(state, &self.velocity)?;
        layout.acceleration.accumulate(state, &self.acceleration)?;
        layout.force.accumulate(state, &self.force)?;
        if let Some((mapper, rotation)) = orientation {
            RotationMapper::new(mapper).accumulate(state, &rotation)?;
        }
        Ok(())
    }

    /// A fresh state of the layout's dimension holding this particle.
    pub fn encode(&self, layout: &ParticleLayout) -> Result<DVector<f64>> {
        let mut state = DVector::zeros(layout.dimension());
        self.encode_into(layout, &mut state)?;
        Ok(state)
    }

    /// Read a particle out of `state`.
    ///
    /// The stored orientation is normalized on the way out.
    pub fn decode(layout: &ParticleLayout, state: &DVector<f64>) -> Result<Self> {
        Ok(Self {
            mass: layout.mass.decode(state)?,
            position: layout.position.decode(state)?,
            velocity: layout.velocity.decode(state)?,
            acceleration: layout.acceleration.decode(state)?,
            force: layout.force.decode(state)?,
            orientation: layout
                .orientation
                .map(|mapper| RotationMapper::new(mapper).decode(state))
                .transpose()?,
        })
    }

    /// Kinetic energy `½·m·|v|²`.
    #[must_use]
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.velocity.norm_squared()
    }
}
