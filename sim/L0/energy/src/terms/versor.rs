//! Unit-norm constraint for quaternion-valued quantities.

use nalgebra::DVector;
use sim_types::{ReferenceScales, Result};

use super::EnergyTerm;
use crate::mapper::{QuaternionMapper, StateSpaceMapper};

/// Keeps a stored quaternion on the unit sphere.
///
/// ```text
/// δ = |q|² − 1
/// energy = (M·L²/T²)·δ²
/// ```
///
/// The initial state and timestep do not enter this term.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VersorConstraint {
    quaternion: QuaternionMapper,
    scales: ReferenceScales,
}

impl VersorConstraint {
    /// Constrain the quaternion stored at `quaternion`.
    #[must_use]
    pub const fn new(quaternion: QuaternionMapper, scales: ReferenceScales) -> Self {
        Self { quaternion, scales }
    }
}

impl EnergyTerm for VersorConstraint {
    fn evaluate(
        &self,
        _initial: &DVector<f64>,
        state: &DVector<f64>,
        _dt: f64,
        gradient: &mut DVector<f64>,
    ) -> Result<f64> {
        let q = self.quaternion.decode(state)?;
        let delta = q.norm_squared() - 1.0;
        let weight = self.scales.rotational_energy();

        // d(δ²)/dq = 2δ · 2q
        self.quaternion
            .accumulate(gradient, &(q * (4.0 * weight * delta)))?;
        Ok(weight * delta * delta)
    }

    fn required_dimension(&self) -> usize {
        self.quaternion.required_dimension()
    }

    fn name(&self) -> &'static str {
        "versor constraint"
    }

    fn scales(&self) -> &ReferenceScales {
        &self.scales
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::terms::test_support::{assert_gradient_matches, evaluate};
    use approx::assert_relative_eq;
    use nalgebra::{Quaternion, UnitQuaternion};

    fn term() -> VersorConstraint {
        VersorConstraint::new(QuaternionMapper::contiguous(1), ReferenceScales::unit())
    }

    fn state_with(q: Quaternion<f64>) -> DVector<f64> {
        let mut state = DVector::zeros(5);
        QuaternionMapper::contiguous(1)
            .accumulate(&mut state, &q)
            .unwrap();
        state
    }

    #[test]
    fn test_unit_quaternion_is_free() {
        let state = state_with(Quaternion::new(1.0, 0.0, 0.0, 0.0));
        let (energy, gradient) = evaluate(&term(), &state, &state, 0.1);
        assert_eq!(energy, 0.0);
        assert_eq!(gradient, DVector::zeros(5));

        let rotation = UnitQuaternion::from_euler_angles(0.4, 0.1, -0.8);
        let state = state_with(*rotation.quaternion());
        let (energy, gradient) = evaluate(&term(), &state, &state, 0.1);
        assert_relative_eq!(energy, 0.0, epsilon = 1e-24);
        assert_relative_eq!(gradient, DVector::zeros(5), epsilon = 1e-12);
    }

    #[test]
    fn test_scaled_quaternion() {
        let state = state_with(Quaternion::new(2.0, 0.0, 0.0, 0.0));
        // δ = 3
        let (energy, gradient) = evaluate(&term(), &state, &state, 0.1);
        assert_relative_eq!(energy, 9.0);
        assert_relative_eq!(gradient[1], 24.0);
        assert_eq!(gradient[0], 0.0);
    }

    #[test]
    fn test_zero_quaternion_gradient_vanishes() {
        let state = DVector::zeros(5);
        let (energy, gradient) = evaluate(&term(), &state, &state, 0.1);
        assert_eq!(energy, 1.0);
        assert_eq!(gradient, DVector::zeros(5));
    }

    #[test]
    fn test_rotational_energy_scale() {
        let scales = ReferenceScales::for_motion(2.0, 3.0, 1.0);
        let term = VersorConstraint::new(QuaternionMapper::contiguous(0), scales);
        let state = DVector::zeros(4);
        // M·L²/T² = 18
        let (energy, _) = evaluate(&term, &state, &state, 0.1);
        assert_relative_eq!(energy, 18.0);
    }

    #[test]
    fn test_gradient_matches_finite_difference() {
        let state = DVector::from_vec(vec![9.0, 0.7, -0.2, 0.5, 0.9]);
        assert_gradient_matches(&term(), &state, &state, 0.1);
    }
}
