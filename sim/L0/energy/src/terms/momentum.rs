//! Conservation of linear momentum along one axis.

use nalgebra::DVector;
use sim_types::{ReferenceScales, Result};

use super::transfer::{MassTransfer, momentum_flux};
use super::{EnergyTerm, decode_pair, required_dimension_of, squared_error};
use crate::mapper::{ScalarMapper, StateSpaceMapper};

/// The change in momentum over a step equals the applied impulse.
///
/// ```text
/// p(x) = F + Σ rin·uin − Σ rout·uout
/// δ = m·v − m₀·v₀ − dt·½·(p(x₀) + p(x))
/// energy = E·(δ·T / (M·L))²
/// ```
///
/// `F` is the sum of all attached force components.
#[derive(Debug, Clone, PartialEq)]
pub struct MomentumConservation {
    mass: ScalarMapper,
    velocity: ScalarMapper,
    forces: Vec<ScalarMapper>,
    inflows: Vec<MassTransfer>,
    outflows: Vec<MassTransfer>,
    scales: ReferenceScales,
}

impl MomentumConservation {
    /// A body with no forces and no mass transfer.
    #[must_use]
    pub fn new(mass: ScalarMapper, velocity: ScalarMapper, scales: ReferenceScales) -> Self {
        Self {
            mass,
            velocity,
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

    fn momentum_rate(&self, state: &DVector<f64>) -> Result<f64> {
        let mut rate = momentum_flux(&self.inflows, &self.outflows, state)?;
        for force in &self.forces {
            rate += force.decode(state)?;
        }
        Ok(rate)
    }
}

impl EnergyTerm for MomentumConservation {
    fn evaluate(
        &self,
        initial: &DVector<f64>,
        state: &DVector<f64>,
        dt: f64,
        gradient: &mut DVector<f64>,
    ) -> Result<f64> {
        let (m0, m) = decode_pair(&self.mass, initial, state)?;
        let (v0, v) = decode_pair(&self.velocity, initial, state)?;
        let impulse = 0.5 * dt * (self.momentum_rate(initial)? + self.momentum_rate(state)?);
        let delta = m * v - m0 * v0 - impulse;

        let (energy, slope) = squared_error(self.scales.energy(), self.scales.momentum(), delta);
        let half_dt = 0.5 * dt * slope;
        self.mass.add(gradient, v * slope)?;
        self.velocity.add(gradient, m * slope)?;
        for force in &self.forces {
            force.add(gradient, -half_dt)?;
        }
        for transfer in &self.inflows {
            let (rate, velocity) = transfer.decode(state)?;
            transfer.rate.add(gradient, -half_dt * velocity)?;
            transfer.velocity.add(gradient, -half_dt * rate)?;
        }
        for transfer in &self.outflows {
            let (rate, velocity) = transfer.decode(state)?;
            transfer.rate.add(gradient, half_dt * velocity)?;
            transfer.velocity.add(gradient, half_dt * rate)?;
        }
        Ok(energy)
    }

    fn required_dimension(&self) -> usize {
        required_dimension_of(
            [&self.mass, &self.velocity]
                .into_iter()
                .chain(&self.forces)
                .chain(self.inflows.iter().flat_map(MassTransfer::mappers))
                .chain(self.outflows.iter().flat_map(MassTransfer::mappers)),
        )
    }

    fn name(&self) -> &'static str {
        "momentum conservation"
    }

    fn scales(&self) -> &ReferenceScales {
        &self.scales
    }
}
