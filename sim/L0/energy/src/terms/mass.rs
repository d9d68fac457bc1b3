//! Conservation of mass.

use nalgebra::DVector;
use sim_types::{ReferenceScales, Result};

use super::{EnergyTerm, decode_pair, required_dimension_of, squared_error};
use crate::mapper::{ScalarMapper, StateSpaceMapper};

/// The change in mass over a step equals the net transferred mass.
///
/// Rates are integrated with the trapezoidal rule:
///
/// ```text
/// δ = (m − m₀) − dt·½·Σ[(rin₀ + rin) − (rout₀ + rout)]
/// energy = E·(δ / M)²
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MassConservation {
    mass: ScalarMapper,
    inflows: Vec<ScalarMapper>,
    outflows: Vec<ScalarMapper>,
    scales: ReferenceScales,
}

impl MassConservation {
    /// A closed body: no mass enters or leaves.
    #[must_use]
    pub fn new(mass: ScalarMapper, scales: ReferenceScales) -> Self {
        Self {
            mass,
            inflows: Vec::new(),
            outflows: Vec::new(),
            scales,
        }
    }

    /// Add an incoming mass flow rate.
    #[must_use]
    pub fn with_inflow(mut self, rate: ScalarMapper) -> Self {
        self.inflows.push(rate);
        self
    }

    /// Add an outgoing mass flow rate.
    #[must_use]
    pub fn with_outflow(mut self, rate: ScalarMapper) -> Self {
        self.outflows.push(rate);
        self
    }

    fn net_rate(&self, state: &DVector<f64>) -> Result<f64> {
        let mut net = 0.0;
        for rate in &self.inflows {
            net += rate.decode(state)?;
        }
        for rate in &self.outflows {
            net -= rate.decode(state)?;
        }
        Ok(net)
    }
}

impl EnergyTerm for MassConservation {
    fn evaluate(
        &self,
        initial: &DVector<f64>,
        state: &DVector<f64>,
        dt: f64,
        gradient: &mut DVector<f64>,
    ) -> Result<f64> {
        let (m0, m) = decode_pair(&self.mass, initial, state)?;
        let transferred = 0.5 * dt * (self.net_rate(initial)? + self.net_rate(state)?);
        let delta = (m - m0) - transferred;

        let (energy, slope) = squared_error(self.scales.energy(), self.scales.mass, delta);
        self.mass.add(gradient, slope)?;
        for rate in &self.inflows {
            rate.add(gradient, -0.5 * dt * slope)?;
        }
        for rate in &self.outflows {
            rate.add(gradient, 0.5 * dt * slope)?;
        }
        Ok(energy)
    }

    fn required_dimension(&self) -> usize {
        required_dimension_of(
            std::iter::once(&self.mass)
                .chain(&self.inflows)
                .chain(&self.outflows),
        )
    }

    fn name(&self) -> &'static str {
        "mass conservation"
    }

    fn scales(&self) -> &ReferenceScales {
        &self.scales
    }
}
