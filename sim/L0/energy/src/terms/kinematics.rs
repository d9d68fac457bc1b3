//! Trapezoidal kinematic relations.

use nalgebra::DVector;
use sim_types::{ReferenceScales, Result};

use super::{EnergyTerm, decode_pair, required_dimension_of, squared_error};
use crate::mapper::{ScalarMapper, VectorMapper};

/// `δ = q − q₀ − dt·½·(r₀ + r)` for a quantity `q` whose rate is `r`.
fn trapezoid(
    quantity: &ScalarMapper,
    rate: &ScalarMapper,
    initial: &DVector<f64>,
    state: &DVector<f64>,
    dt: f64,
) -> Result<f64> {
    let (q0, q) = decode_pair(quantity, initial, state)?;
    let (r0, r) = decode_pair(rate, initial, state)?;
    Ok(q - q0 - 0.5 * dt * (r0 + r))
}

/// Position advances with the mean of the old and new velocity.
///
/// ```text
/// δ = x − x₀ − dt·½·(v₀ + v)
/// energy = E·(δ / L)²
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionKinematics {
    position: ScalarMapper,
    velocity: ScalarMapper,
    scales: ReferenceScales,
}

impl PositionKinematics {
    /// Relate one position component to one velocity component.
    #[must_use]
    pub const fn new(
        position: ScalarMapper,
        velocity: ScalarMapper,
        scales: ReferenceScales,
    ) -> Self {
        Self {
            position,
            velocity,
            scales,
        }
    }

    /// One term per axis.
    #[must_use]
    pub fn per_axis<const D: usize>(
        position: &VectorMapper<D>,
        velocity: &VectorMapper<D>,
        scales: ReferenceScales,
    ) -> [Self; D] {
        let positions = position.components();
        let velocities = velocity.components();
        std::array::from_fn(|axis| Self::new(positions[axis], velocities[axis], scales))
    }
}

impl EnergyTerm for PositionKinematics {
    fn evaluate(
        &self,
        initial: &DVector<f64>,
        state: &DVector<f64>,
        dt: f64,
        gradient: &mut DVector<f64>,
    ) -> Result<f64> {
        let delta = trapezoid(&self.position, &self.velocity, initial, state, dt)?;
        let (energy, slope) = squared_error(self.scales.energy(), self.scales.length, delta);
        self.position.add(gradient, slope)?;
        self.velocity.add(gradient, -0.5 * dt * slope)?;
        Ok(energy)
    }

    fn required_dimension(&self) -> usize {
        required_dimension_of([&self.position, &self.velocity])
    }

    fn name(&self) -> &'static str {
        "position kinematics"
    }

    fn scales(&self) -> &ReferenceScales {
        &self.scales
    }
}

/// Velocity advances with the mean of the old and new acceleration.
///
/// ```text
/// δ = v − v₀ − dt·½·(a₀ + a)
/// energy = E·(δ·T / L)²
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityKinematics {
    velocity: ScalarMapper,
    acceleration: ScalarMapper,
    scales: ReferenceScales,
}

impl VelocityKinematics {
    /// Relate one velocity component to one acceleration component.
    #[must_use]
    pub const fn new(
        velocity: ScalarMapper,
        acceleration: ScalarMapper,
        scales: ReferenceScales,
    ) -> Self {
        Self {
            velocity,
            acceleration,
            scales,
        }
    }

    /// One term per axis.
    #[must_use]
    pub fn per_axis<const D: usize>(
        velocity: &VectorMapper<D>,
        acceleration: &VectorMapper<D>,
        scales: ReferenceScales,
    ) -> [Self; D] {
        let velocities = velocity.components();
        let accelerations = acceleration.components();
        std::array::from_fn(|axis| Self::new(velocities[axis], accelerations[axis], scales))
    }
}

impl EnergyTerm for VelocityKinematics {
    fn evaluate(
        &self,
        initial: &DVector<f64>,
        state: &DVector<f64>,
        dt: f64,
        gradient: &mut DVector<f64>,
    ) -> Result<f64> {
        let delta = trapezoid(&self.velocity, &self.acceleration, initial, state, dt)?;
        let (energy, slope) = squared_error(self.scales.energy(), self.scales.velocity(), delta);
        self.velocity.add(gradient, slope)?;
        self.acceleration.add(gradient, -0.5 * dt * slope)?;
        Ok(energy)
    }

    fn required_dimension(&self) -> usize {
        required_dimension_of([&self.velocity, &self.acceleration])
    }

    fn name(&self) -> &'static str {
        "velocity kinematics"
    }

    fn scales(&self) -> &ReferenceScales {
        &self.scales
    }
}
