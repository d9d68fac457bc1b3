//! Correspondence between structured quantities and state-vector indices.
//!
//! A mapper owns nothing but index metadata. It reads its quantity out of a
//! state vector ([`StateSpaceMapper::decode`]) and adds a quantity into a
//! buffer at its indices ([`StateSpaceMapper::accumulate`]). Accumulation
//! never overwrites, so several terms can contribute gradient components to
//! the same physical quantity in one evaluation.
//!
//! Mappers do not check that their indices are disjoint from other mappers.
//! That is the job of whoever assembles the layout; see
//! [`StateLayout`](crate::StateLayout) and [`check_disjoint`].

mod rotation;

pub use rotation::{AxisAngle, AxisAngleMapper, QuaternionMapper, RotationMapper};

use nalgebra::{DVector, SVector};
use sim_types::{Result, SimError};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Bidirectional mapping between a quantity and state-vector indices.
pub trait StateSpaceMapper {
    /// The structured quantity.
    type Value;

    /// Read the quantity out of `state`.
    ///
    /// Fails if `state` is too short for this mapper.
    fn decode(&self, state: &DVector<f64>) -> Result<Self::Value>;

    /// Add `value` into `state` at this mapper's indices.
    fn accumulate(&self, state: &mut DVector<f64>, value: &Self::Value) -> Result<()>;

    /// Indices this mapper reads and writes, in component order.
    fn indices(&self) -> Vec<usize>;

    /// Smallest state dimension this mapper can be applied to.
    fn required_dimension(&self) -> usize {
        self.indices().iter().max().map_or(0, |&i| i + 1)
    }

    /// Whether a state of `dimension` components is sufficient.
    fn is_valid_for_dimension(&self, dimension: usize) -> bool {
        dimension >= self.required_dimension()
    }
}

/// Fail with [`SimError::IndexOutOfRange`] if `index` is outside `state`.
pub(crate) fn check_index(index: usize, dimension: usize) -> Result<()> {
    if index < dimension {
        Ok(())
    } else {
        Err(SimError::IndexOutOfRange { index, dimension })
    }
}

/// Check that index sets are pairwise disjoint and fit in `dimension`.
///
/// ```
/// use sim_energy::{ScalarMapper, StateSpaceMapper, Vector3Mapper, check_disjoint};
///
/// let mass = ScalarMapper::new(0);
/// let position = Vector3Mapper::contiguous(1);
/// assert!(check_disjoint([mass.indices(), position.indices()], 4).is_ok());
/// assert!(check_disjoint([mass.indices(), ScalarMapper::new(0).indices()], 4).is_err());
/// ```
pub fn check_disjoint<I>(index_sets: I, dimension: usize) -> Result<()>
where
    I: IntoIterator<Item = Vec<usize>>,
{
    let mut claimed = vec![false; dimension];
    for set in index_sets {
        for index in set {
            check_index(index, dimension)?;
            if claimed[index] {
                return Err(SimError::invalid_config(format!(
                    "state index {index} is assigned to more than one quantity"
                )));
            }
            claimed[index] = true;
        }
    }
    Ok(())
}

/// A single real component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScalarMapper {
    index: usize,
}

impl ScalarMapper {
    /// Map the component at `index`.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self { index }
    }

    /// The mapped index.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Add `value` into `state` at this index.
    pub fn add(&self, state: &mut DVector<f64>, value: f64) -> Result<()> {
        self.accumulate(state, &value)
    }
}

impl StateSpaceMapper for ScalarMapper {
    type Value = f64;

    fn decode(&self, state: &DVector<f64>) -> Result<f64> {
        check_index(self.index, state.len())?;
        Ok(state[self.index])
    }

    fn accumulate(&self, state: &mut DVector<f64>, value: &f64) -> Result<()> {
        check_index(self.index, state.len())?;
        state[self.index] += value;
        Ok(())
    }

    fn indices(&self) -> Vec<usize> {
        vec![self.index]
    }

    fn required_dimension(&self) -> usize {
        self.index + 1
    }
}

/// A fixed-size vector of `D` components.
///
/// Serialized as a plain list of indices; deserializing a list of the wrong
/// length fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(into = "Vec<usize>", try_from = "Vec<usize>")
)]
pub struct VectorMapper<const D: usize> {
    indices: [usize; D],
}

/// Three spatial components.
pub type Vector3Mapper = VectorMapper<3>;

impl<const D: usize> VectorMapper<D> {
    /// Map components to the given indices.
    #[must_use]
    pub const fn new(indices: [usize; D]) -> Self {
        Self { indices }
    }

    /// Map components to `start, start + 1, ..., start + D - 1`.
    #[must_use]
    pub fn contiguous(start: usize) -> Self {
        Self {
            indices: std::array::from_fn(|i| start + i),
        }
    }

    /// One mapper per component.
    #[must_use]
    pub fn components(&self) -> [ScalarMapper; D] {
        self.indices.map(ScalarMapper::new)
    }

    /// The mapper for component `axis`, if it exists.
    #[must_use]
    pub fn component(&self, axis: usize) -> Option<ScalarMapper> {
        self.indices.get(axis).copied().map(ScalarMapper::new)
    }
}

impl<const D: usize> From<VectorMapper<D>> for Vec<usize> {
    fn from(mapper: VectorMapper<D>) -> Self {
        mapper.indices.to_vec()
    }
}

impl<const D: usize> TryFrom<Vec<usize>> for VectorMapper<D> {
    type Error = SimError;

    fn try_from(indices: Vec<usize>) -> Result<Self> {
        let len = indices.len();
        <[usize; D]>::try_from(indices)
            .map(Self::new)
            .map_err(|_| SimError::dimension_mismatch("vector mapper indices", D, len))
    }
}

impl<const D: usize> StateSpaceMapper for VectorMapper<D> {
    type Value = SVector<f64, D>;

    fn decode(&self, state: &DVector<f64>) -> Result<SVector<f64, D>> {
        for &index in &self.indices {
            check_index(index, state.len())?;
        }
        Ok(SVector::from_fn(|i, _| state[self.indices[i]]))
    }

    fn accumulate(&self, state: &mut DVector<f64>, value: &SVector<f64, D>) -> Result<()> {
        for &index in &self.indices {
            check_index(index, state.len())?;
        }
        for (component, &index) in self.indices.iter().enumerate() {
            state[index] += value[component];
        }
        Ok(())
    }

    fn indices(&self) -> Vec<usize> {
        self.indices.to_vec()
    }
}

/// A vector whose length is chosen at assembly time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DVectorMapper {
    indices: Vec<usize>,
}

impl DVectorMapper {
    /// Map components to the given indices.
    #[must_use]
    pub fn new(indices: Vec<usize>) -> Self {
        Self { indices }
    }

    /// Map `len` components starting at `start`.
    #[must_use]
    pub fn contiguous(start: usize, len: usize) -> Self {
        Self {
            indices: (start..start + len).collect(),
        }
    }

    /// Number of mapped components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether no components are mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

impl StateSpaceMapper for DVectorMapper {
    type Value = DVector<f64>;

    fn decode(&self, state: &DVector<f64>) -> Result<DVector<f64>> {
        for &index in &self.indices {
            check_index(index, state.len())?;
        }
        Ok(DVector::from_iterator(
            self.indices.len(),
            self.indices.iter().map(|&i| state[i]),
        ))
    }

    fn accumulate(&self, state: &mut DVector<f64>, value: &DVector<f64>) -> Result<()> {
        sim_types::check_dimension("mapped vector", self.indices.len(), value.len())?;
        for &index in &self.indices {
            check_index(index, state.len())?;
        }
        for (component, &index) in self.indices.iter().enumerate() {
            state[index] += value[component];
        }
        Ok(())
    }

    fn indices(&self) -> Vec<usize> {
        self.indices.clone()
    }
}
