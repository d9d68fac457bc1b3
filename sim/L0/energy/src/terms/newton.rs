//! Newton's second law along one axis.

use nalgebra::DVector;
use sim_types::{ReferenceScales, Result};

use super::transfer::MassTransfer;
use super::{EnergyTerm, required_dimension_of, squared_error};
use crate::mapper::{ScalarMapper, StateSpaceMapper};

/// Mass times acceleration equals the applied force plus transfer thrust.
///
/// Only the candidate state enters this term:
///
/// ```text
/// δ = m·a − ΣF − Σ rin·(uin − v) + Σ rout·(uout − v)
/// energy = E·(δ·T² / (M·L))²
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct NewtonSecondLaw {
    mass: ScalarMapper,
    velocity: ScalarMapper,
    acceleration: ScalarMapper,
    forces: Vec<ScalarMapper>,
    inflows: Vec<MassTransfer>,
    outflows: Vec<MassTransfer>,
    scales: ReferenceScales,
}

impl NewtonSecondLaw {
    /// A body with no forces and no mass transfer.
    #[must_use]
    pub fn new(
        mass: ScalarMapper,
        velocity: ScalarMapper,
        acceleration: ScalarMapper,
        scales: ReferenceScales,
    ) -> Self {
        Self {
            mass,
            velocity,
            acceleration,
            forces: Vec::new(),
            inflows: Vec::new(),
            outflows: Vec::new(),
            scales,
        }
    }

    /// Add a force component acting on the body.
    #[must_use]
    pub fn with_force(mut self, force: ScalarMapper) -> Self {
        self.forces.push(force);
        self
    }

    /// Add incoming mass carrying its own velocity.
    #[must_use]
    pub fn with_inflow(mut self, transfer: MassTransfer) -> Self {
        self.inflows.push(transfer);
        self
    }

    /// Add outgoing mass carrying its own velocity.
    #[must_use]
    pub fn with_outflow(mut self, transfer: MassTransfer) -> Self {
        self.outflows.push(transfer);
        self
    }
}

impl EnergyTerm for NewtonSecondLaw {
    fn evaluate(
        &self,
        _initial: &DVector<f64>,
        state: &DVector<f64>,
        _dt: f64,
        gradient: &mut DVector<f64>,
    ) -> Result<f64> {
        let m = self.mass.decode(state)?;
        let v = self.velocity.decode(state)?;
        let a = self.acceleration.decode(state)?;

        let mut delta = m * a;
        for force in &self.forces {
            delta -= force.decode(state)?;
        }
        for transfer in &self.inflows {
            let (rate, velocity) = transfer.decode(state)?;
            delta -= rate * (velocity - v);
        }
        for transfer in &self.outflows {
            let (rate, velocity) = transfer.decode(state)?;
            delta += rate * (velocity - v);
        }

        let (energy, slope) = squared_error(self.scales.energy(), self.scales.force(), delta);
        self.mass.add(gradient, a * slope)?;
        self.acceleration.add(gradient, m * slope)?;
        for force in &self.forces {
            force.add(gradient, -slope)?;
        }
        for transfer in &self.inflows {
            let (rate, velocity) = transfer.decode(state)?;
            transfer.rate.add(gradient, -(velocity - v) * slope)?;
            transfer.velocity.add(gradient, -rate * slope)?;
            self.velocity.add(gradient, rate * slope)?;
        }
        for transfer in &self.outflows {
            let (rate, velocity) = transfer.decode(state)?;
            transfer.rate.add(gradient, (velocity - v) * slope)?;
            transfer.velocity.add(gradient, rate * slope)?;
            self.velocity.add(gradient, -rate * slope)?;
        }
        Ok(energy)
    }

    fn required_dimension(&self) -> usize {
        required_dimension_of(
            [&self.mass, &self.velocity, &self.acceleration]
                .into_iter()
                .chain(&self.forces)
                .chain(self.inflows.iter().flat_map(MassTransfer::mappers))
                .chain(self.outflows.iter().flat_map(MassTransfer::mappers)),
        )
    }

    fn name(&self) -> &'static str {
        "newton second law"
    }

    fn scales(&self) -> &ReferenceScales {
        &self.scales
    }
}
