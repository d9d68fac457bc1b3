//! Allocation of state-vector index ranges.

use nalgebra::DVector;

use crate::mapper::{
    AxisAngleMapper, DVectorMapper, QuaternionMapper, RotationMapper, ScalarMapper, VectorMapper,
};

/// Hands out mappers over consecutive, non-overlapping index ranges.
///
/// Every quantity allocated from one layout owns indices no other quantity
/// touches, so a term set built from these mappers never has two quantities
/// aliasing the same component.
///
/// ```
/// use sim_energy::StateLayout;
///
/// let mut layout = StateLayout::new();
/// let mass = layout.scalar();
/// let position = layout.vector::<3>();
/// assert_eq!(mass.index(), 0);
/// assert_eq!(layout.dimension(), 4);
/// # let _ = position;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateLayout {
    dimension: usize,
}

impl StateLayout {
    /// An empty layout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self, len: usize) -> usize {
        let start = self.dimension;
        self.dimension += len;
        start
    }

    /// One real component.
    pub fn scalar(&mut self) -> ScalarMapper {
        ScalarMapper::new(self.allocate(1))
    }

    /// `D` consecutive components.
    pub fn vector<const D: usize>(&mut self) -> VectorMapper<D> {
        VectorMapper::contiguous(self.allocate(D))
    }

    /// `len` consecutive components.
    pub fn vector_n(&mut self, len: usize) -> DVectorMapper {
        DVectorMapper::contiguous(self.allocate(len), len)
    }

    /// Four components in `w, i, j, k` order.
    pub fn quaternion(&mut self) -> QuaternionMapper {
        QuaternionMapper::contiguous(self.allocate(4))
    }

    /// A rotation stored as a quaternion.
    pub fn rotation(&mut self) -> RotationMapper {
        RotationMapper::new(self.quaternion())
    }

    /// A rotation stored as axis components followed by the angle.
    pub fn axis_angle(&mut self) -> AxisAngleMapper {
        AxisAngleMapper::contiguous(self.allocate(4))
    }

    /// Number of components allocated so far.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// A zero vector of the allocated dimension.
    #[must_use]
    pub fn zero_state(&self) -> DVector<f64> {
        DVector::zeros(self.dimension)
    }
}
