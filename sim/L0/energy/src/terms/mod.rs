//! Energy-error terms.
//!
//! Each term measures how far a candidate next state violates one physical
//! law over a step of length `dt`, starting from the accepted state `x0`.
//! The violation `δ` is divided by a reference magnitude and squared, then
//! multiplied by the energy scale, so that terms with different units can be
//! summed:
//!
//! ```text
//! energy = E · (δ / scale)²        E = mass · specific_energy
//! ```
//!
//! Every term is therefore non-negative and exactly zero when its law holds.
//! Terms accumulate the gradient of their energy with respect to the
//! candidate state into a buffer owned by the caller; they never overwrite
//! it.

mod field;
mod kinematics;
mod mass;
mod momentum;
mod newton;
mod transfer;
mod versor;

pub use field::UniformField;
pub use kinematics::{PositionKinematics, VelocityKinematics};
pub use mass::MassConservation;
pub use momentum::MomentumConservation;
pub use newton::NewtonSecondLaw;
pub use transfer::MassTransfer;
pub use versor::VersorConstraint;

use nalgebra::DVector;
use sim_types::{ReferenceScales, Result};

use crate::mapper::{ScalarMapper, StateSpaceMapper};

/// One physical law expressed as a non-negative energy.
pub trait EnergyTerm {
    /// Energy of `state` relative to `initial` over a step of `dt`.
    ///
    /// The gradient with respect to `state` is added into `gradient`, which
    /// must have the same dimension as `state`.
    fn evaluate(
        &self,
        initial: &DVector<f64>,
        state: &DVector<f64>,
        dt: f64,
        gradient: &mut DVector<f64>,
    ) -> Result<f64>;

    /// Smallest state dimension covering every quantity this term reads.
    fn required_dimension(&self) -> usize;

    /// Whether the term can be applied to states of `dimension` components.
    fn is_valid_for_dimension(&self, dimension: usize) -> bool {
        dimension >= self.required_dimension()
    }

    /// Short name for diagnostics.
    fn name(&self) -> &'static str;

    /// Reference scales the term normalizes against.
    fn scales(&self) -> &ReferenceScales;
}

/// The closed set of term kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    /// Change of mass balances net transfer.
    Mass(MassConservation),
    /// Change of momentum balances impulse.
    Momentum(MomentumConservation),
    /// Force equals mass times acceleration.
    Newton(NewtonSecondLaw),
    /// Position advances with the mean velocity.
    Position(PositionKinematics),
    /// Velocity advances with the mean acceleration.
    Velocity(VelocityKinematics),
    /// A quaternion stays on the unit sphere.
    Versor(VersorConstraint),
    /// A force equals the field acceleration times mass.
    Field(UniformField),
}

impl Term {
    fn inner(&self) -> &dyn EnergyTerm {
        match self {
            Self::Mass(term) => term,
            Self::Momentum(term) => term,
            Self::Newton(term) => term,
            Self::Position(term) => term,
            Self::Velocity(term) => term,
            Self::Versor(term) => term,
            Self::Field(term) => term,
        }
    }
}

impl EnergyTerm for Term {
    fn evaluate(
        &self,
        initial: &DVector<f64>,
        state: &DVector<f64>,
        dt: f64,
        gradient: &mut DVector<f64>,
    ) -> Result<f64> {
        self.inner().evaluate(initial, state, dt, gradient)
    }

    fn required_dimension(&self) -> usize {
        self.inner().required_dimension()
    }

    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn scales(&self) -> &ReferenceScales {
        self.inner().scales()
    }
}

macro_rules! impl_from_term {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Term {
                fn from(term: $ty) -> Self {
                    Self::$variant(term)
                }
            }
        )*
    };
}

impl_from_term! {
    Mass => MassConservation,
    Momentum => MomentumConservation,
    Newton => NewtonSecondLaw,
    Position => PositionKinematics,
    Velocity => VelocityKinematics,
    Versor => VersorConstraint,
    Field => UniformField,
}

/// Energy `E · (δ / scale)²` and its derivative with respect to `δ`.
pub(crate) fn squared_error(energy_scale: f64, scale: f64, delta: f64) -> (f64, f64) {
    let weight = energy_scale / (scale * scale);
    (weight * delta * delta, 2.0 * weight * delta)
}

/// Highest index any of `mappers` touches, plus one.
pub(crate) fn required_dimension_of<'a>(
    mappers: impl IntoIterator<Item = &'a ScalarMapper>,
) -> usize {
    mappers
        .into_iter()
        .map(StateSpaceMapper::required_dimension)
        .max()
        .unwrap_or(0)
}

/// Decode a scalar from both the initial and the candidate state.
pub(crate) fn decode_pair(
    mapper: &ScalarMapper,
    initial: &DVector<f64>,
    state: &DVector<f64>,
) -> Result<(f64, f64)> {
    Ok((mapper.decode(initial)?, mapper.decode(state)?))
}
