//! Forces prescribed by a uniform field.

use nalgebra::DVector;
use sim_types::{Gravity, ReferenceScales, Result};

use super::{EnergyTerm, required_dimension_of, squared_error};
use crate::mapper::{ScalarMapper, StateSpaceMapper, Vector3Mapper};

/// A force component equals the field acceleration times the mass.
///
/// ```text
/// δ = F − m·g
/// energy = E·(δ·T² / (M·L))²
/// ```
///
/// Without this term the force is a free unknown and any acceleration
/// satisfies Newton's law.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformField {
    force: ScalarMapper,
    mass: ScalarMapper,
    acceleration: f64,
    scales: ReferenceScales,
}

impl UniformField {
    /// Tie one force component to the field acceleration `acceleration`.
    #[must_use]
    pub const fn new(
        force: ScalarMapper,
        mass: ScalarMapper,
        acceleration: f64,
        scales: ReferenceScales,
    ) -> Self {
        Self {
            force,
            mass,
            acceleration,
            scales,
        }
    }

    /// One term per spatial axis of `field`.
    #[must_use]
    pub fn per_axis(
        force: &Vector3Mapper,
        mass: ScalarMapper,
        field: &Gravity,
        scales: ReferenceScales,
    ) -> [Self; 3] {
        let forces = force.components();
        std::array::from_fn(|axis| Self::new(forces[axis], mass, field.acceleration[axis], scales))
    }

    /// Field acceleration along this term's axis.
    #[must_use]
    pub fn acceleration(&self) -> f64 {
        self.acceleration
    }
}

impl EnergyTerm for UniformField {
    fn evaluate(
        &self,
        _initial: &DVector<f64>,
        state: &DVector<f64>,
        _dt: f64,
        gradient: &mut DVector<f64>,
    ) -> Result<f64> {
        let force = self.force.decode(state)?;
        let mass = self.mass.decode(state)?;
        let delta = force - mass * self.acceleration;

        let (energy, slope) = squared_error(self.scales.energy(), self.scales.force(), delta);
        self.force.add(gradient, slope)?;
        self.mass.add(gradient, -self.acceleration * slope)?;
        Ok(energy)
    }

    fn required_dimension(&self) -> usize {
        required_dimension_of([&self.force, &self.mass])
    }

    fn name(&self) -> &'static str {
        "uniform field"
    }

    fn scales(&self) -> &ReferenceScales {
        &self.scales
    }
}
