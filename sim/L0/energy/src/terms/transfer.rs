//! Mass carried across the boundary of a body.

use nalgebra::DVector;
use sim_types::Result;

use crate::mapper::{ScalarMapper, StateSpaceMapper};

/// A stream of mass entering or leaving a body along one axis.
///
/// `rate` is the mass flow (kg/s) and `velocity` the velocity component of
/// the transferred mass (m/s).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MassTransfer {
    /// Mass flow rate.
    pub rate: ScalarMapper,
    /// Velocity component of the transferred mass.
    pub velocity: ScalarMapper,
}

impl MassTransfer {
    /// Pair a rate with a velocity component.
    #[must_use]
    pub const fn new(rate: ScalarMapper, velocity: ScalarMapper) -> Self {
        Self { rate, velocity }
    }

    /// Read `(rate, velocity)` from a state.
    pub(crate) fn decode(&self, state: &DVector<f64>) -> Result<(f64, f64)> {
        Ok((self.rate.decode(state)?, self.velocity.decode(state)?))
    }

    pub(crate) fn mappers(&self) -> [&ScalarMapper; 2] {
        [&self.rate, &self.velocity]
    }
}

/// Net momentum flux `Σ rin·uin − Σ rout·uout` carried by the transfers.
pub(crate) fn momentum_flux(
    inflows: &[MassTransfer],
    outflows: &[MassTransfer],
    state: &DVector<f64>,
) -> Result<f64> {
    let mut flux = 0.0;
    for transfer in inflows {
        let (rate, velocity) = transfer.decode(state)?;
        flux += rate * velocity;
    }
    for transfer in outflows {
        let (rate, velocity) = transfer.decode(state)?;
        flux -= rate * velocity;
    }
    Ok(flux)
}
