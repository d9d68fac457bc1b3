//! Mappers for orientation quantities.

use std::f64::consts::{PI, TAU};

use nalgebra::{DVector, Quaternion, Unit, UnitQuaternion, Vector3};
use sim_types::{Result, SimError};

use super::{ScalarMapper, StateSpaceMapper, Vector3Mapper, check_index};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Four components stored in `w, i, j, k` order.
///
/// The decoded quaternion is not normalized; pair this mapper with a
/// [`VersorConstraint`](crate::VersorConstraint) when it should represent a
/// rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct QuaternionMapper {
    indices: [usize; 4],
}

impl QuaternionMapper {
    /// Map `w, i, j, k` to the given indices.
    #[must_use]
    pub const fn new(indices: [usize; 4]) -> Self {
        Self { indices }
    }

    /// Map `w, i, j, k` to four consecutive indices from `start`.
    #[must_use]
    pub const fn contiguous(start: usize) -> Self {
        Self {
            indices: [start, start + 1, start + 2, start + 3],
        }
    }

    fn check(&self, dimension: usize) -> Result<()> {
        for &index in &self.indices {
            check_index(index, dimension)?;
        }
        Ok(())
    }
}

impl StateSpaceMapper for QuaternionMapper {
    type Value = Quaternion<f64>;

    fn decode(&self, state: &DVector<f64>) -> Result<Quaternion<f64>> {
        self.check(state.len())?;
        let [w, i, j, k] = self.indices.map(|index| state[index]);
        Ok(Quaternion::new(w, i, j, k))
    }

    fn accumulate(&self, state: &mut DVector<f64>, value: &Quaternion<f64>) -> Result<()> {
        self.check(state.len())?;
        let [w, i, j, k] = self.indices;
        state[w] += value.w;
        state[i] += value.i;
        state[j] += value.j;
        state[k] += value.k;
        Ok(())
    }

    fn indices(&self) -> Vec<usize> {
        self.indices.to_vec()
    }
}

/// A rotation stored as a quaternion.
///
/// Decoding normalizes the stored components. A stored quaternion of zero
/// norm does not describe a rotation and fails to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RotationMapper {
    quaternion: QuaternionMapper,
}

impl RotationMapper {
    /// Wrap a quaternion mapper.
    #[must_use]
    pub const fn new(quaternion: QuaternionMapper) -> Self {
        Self { quaternion }
    }

    /// The underlying quaternion mapper.
    #[must_use]
    pub const fn quaternion(&self) -> QuaternionMapper {
        self.quaternion
    }
}

impl StateSpaceMapper for RotationMapper {
    type Value = UnitQuaternion<f64>;

    fn decode(&self, state: &DVector<f64>) -> Result<UnitQuaternion<f64>> {
        let raw = self.quaternion.decode(state)?;
        UnitQuaternion::try_new(raw, f64::EPSILON)
            .ok_or_else(|| SimError::invalid_argument("stored rotation has zero norm"))
    }

    fn accumulate(&self, state: &mut DVector<f64>, value: &UnitQuaternion<f64>) -> Result<()> {
        self.quaternion.accumulate(state, value.quaternion())
    }

    fn indices(&self) -> Vec<usize> {
        self.quaternion.indices()
    }
}

/// A rotation as a unit axis and an angle in radians.
///
/// The angle is kept in `(-π, π]`; constructing from a multi-turn angle
/// wraps it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisAngle {
    axis: Unit<Vector3<f64>>,
    angle: f64,
}

impl AxisAngle {
    /// Build from an axis of any length and an angle.
    ///
    /// A zero axis yields the identity rotation.
    #[must_use]
    pub fn new(axis: Vector3<f64>, angle: f64) -> Self {
        match Unit::try_new(axis, f64::EPSILON) {
            Some(axis) => Self {
                axis,
                angle: wrap_angle(angle),
            },
            None => Self::identity(),
        }
    }

    /// No rotation, about the z axis.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            axis: Vector3::z_axis(),
            angle: 0.0,
        }
    }

    /// Axis and angle of a unit quaternion.
    #[must_use]
    pub fn from_rotation(rotation: &UnitQuaternion<f64>) -> Self {
        rotation
            .axis_angle()
            .map_or_else(Self::identity, |(axis, angle)| Self {
                axis,
                angle: wrap_angle(angle),
            })
    }

    /// The equivalent unit quaternion.
    #[must_use]
    pub fn to_rotation(&self) -> UnitQuaternion<f64> {
        UnitQuaternion::from_axis_angle(&self.axis, self.angle)
    }

    /// Unit rotation axis.
    #[must_use]
    pub fn axis(&self) -> Unit<Vector3<f64>> {
        self.axis
    }

    /// Rotation angle in `(-π, π]`.
    #[must_use]
    pub fn angle(&self) -> f64 {
        self.angle
    }
}

impl Default for AxisAngle {
    fn default() -> Self {
        Self::identity()
    }
}

fn wrap_angle(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { PI } else { wrapped }
}

/// A rotation stored as three axis components and one angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AxisAngleMapper {
    axis: Vector3Mapper,
    angle: ScalarMapper,
}

impl AxisAngleMapper {
    /// Combine an axis mapper and an angle mapper.
    #[must_use]
    pub const fn new(axis: Vector3Mapper, angle: ScalarMapper) -> Self {
        Self { axis, angle }
    }

    /// Axis at `start..start + 3`, angle at `start + 3`.
    #[must_use]
    pub fn contiguous(start: usize) -> Self {
        Self {
            axis: Vector3Mapper::contiguous(start),
            angle: ScalarMapper::new(start + 3),
        }
    }

    /// Mapper for the axis components.
    #[must_use]
    pub const fn axis(&self) -> Vector3Mapper {
        self.axis
    }

    /// Mapper for the angle.
    #[must_use]
    pub const fn angle(&self) -> ScalarMapper {
        self.angle
    }
}

impl StateSpaceMapper for AxisAngleMapper {
    type Value = AxisAngle;

    fn decode(&self, state: &DVector<f64>) -> Result<AxisAngle> {
        let axis = self.axis.decode(state)?;
        let angle = self.angle.decode(state)?;
        Ok(AxisAngle::new(axis, angle))
    }

    fn accumulate(&self, state: &mut DVector<f64>, value: &AxisAngle) -> Result<()> {
        // Check both parts before touching the buffer.
        self.angle.decode(state)?;
        self.axis.accumulate(state, &value.axis.into_inner())?;
        self.angle.accumulate(state, &value.angle)
    }

    fn indices(&self) -> Vec<usize> {
        let mut indices = self.axis.indices();
        indices.push(self.angle.index());
        indices
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_quaternion_component_order() {
        let mapper = QuaternionMapper::contiguous(1);
        let mut state = DVector::zeros(5);
        mapper
            .accumulate(&mut state, &Quaternion::new(1.0, 2.0, 3.0, 4.0))
            .unwrap();

        assert_eq!(state, DVector::from_vec(vec![0.0, 1.0, 2.0, 3.0, 4.0]));
        let q = mapper.decode(&state).unwrap();
        assert_eq!(q.w, 1.0);
        assert_eq!(q.k, 4.0);
        assert!(!mapper.is_valid_for_dimension(4));
    }

    #[test]
    fn test_rotation_mapper_normalizes() {
        let mapper = RotationMapper::new(QuaternionMapper::contiguous(0));
        let state = DVector::from_vec(vec![2.0, 0.0, 0.0, 0.0]);
        let rotation = mapper.decode(&state).unwrap();
        assert_relative_eq!(rotation.angle(), 0.0);
        assert_relative_eq!(rotation.quaternion().norm(), 1.0);
    }

    #[test]
    fn test_rotation_mapper_zero_norm() {
        let mapper = RotationMapper::new(QuaternionMapper::contiguous(0));
        let err = mapper.decode(&DVector::zeros(4)).unwrap_err();
        assert!(err.is_precondition());
    }

    #[test]
    fn test_rotation_round_trip() {
        let mapper = RotationMapper::new(QuaternionMapper::contiguous(0));
        let rotation = UnitQuaternion::from_euler_angles(0.3, -0.2, 1.1);
        let mut state = DVector::zeros(4);
        mapper.accumulate(&mut state, &rotation).unwrap();
        let decoded = mapper.decode(&state).unwrap();
        assert_relative_eq!(decoded.coords, rotation.coords, epsilon = 1e-12);
    }

    #[test]
    fn test_wrap_angle() {
        assert_relative_eq!(wrap_angle(0.5), 0.5, epsilon = 1e-12);
        assert_relative_eq!(wrap_angle(-0.5), -0.5, epsilon = 1e-12);
        assert_relative_eq!(wrap_angle(PI), PI);
        assert_relative_eq!(wrap_angle(-PI), PI);
        assert_relative_eq!(wrap_angle(TAU + 0.25), 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_axis_angle_construction() {
        let value = AxisAngle::new(Vector3::new(0.0, 2.0, 0.0), FRAC_PI_2);
        assert_relative_eq!(value.axis().into_inner(), Vector3::y());
        assert_relative_eq!(value.angle(), FRAC_PI_2, epsilon = 1e-12);

        let identity = AxisAngle::new(Vector3::zeros(), 1.0);
        assert_eq!(identity, AxisAngle::identity());
        assert_eq!(AxisAngle::default().angle(), 0.0);
    }

    #[test]
    fn test_axis_angle_rotation_conversion() {
        let value = AxisAngle::new(Vector3::new(1.0, 1.0, 0.0), 0.7);
        let rotation = value.to_rotation();
        let back = AxisAngle::from_rotation(&rotation);
        assert_relative_eq!(back.angle(), 0.7, epsilon = 1e-12);
        assert_relative_eq!(
            back.axis().into_inner(),
            value.axis().into_inner(),
            epsilon = 1e-12
        );

        let none = AxisAngle::from_rotation(&UnitQuaternion::identity());
        assert_eq!(none, AxisAngle::identity());
    }

    #[test]
    fn test_axis_angle_mapper_round_trip() {
        let mapper = AxisAngleMapper::contiguous(2);
        assert_eq!(mapper.indices(), vec![2, 3, 4, 5]);
        assert_eq!(mapper.required_dimension(), 6);

        let value = AxisAngle::new(Vector3::new(0.0, 0.0, -1.0), 2.5);
        let mut state = DVector::zeros(6);
        mapper.accumulate(&mut state, &value).unwrap();
        let decoded = mapper.decode(&state).unwrap();
        assert_relative_eq!(decoded.angle(), 2.5, epsilon = 1e-12);
        assert_relative_eq!(decoded.axis().into_inner(), -Vector3::z());
    }

    #[test]
    fn test_axis_angle_mapper_short_state() {
        let mapper = AxisAngleMapper::contiguous(0);
        let mut state = DVector::zeros(3);
        assert!(
            mapper
                .accumulate(&mut state, &AxisAngle::identity())
                .is_err()
        );
        assert_eq!(state, DVector::zeros(3));
    }
}
