//! Error types for integrator and minimizer operations.
//!
//! Two families of failure exist and callers are expected to treat them
//! differently:
//!
//! - **Precondition violations** ([`SimError::DimensionMismatch`],
//!   [`SimError::IndexOutOfRange`], [`SimError::InvalidArgument`],
//!   [`SimError::InvalidTimestep`], [`SimError::InvalidConfig`]) are assembly
//!   defects. They are reported at the violating call and retrying with the
//!   same inputs can never succeed.
//! - **Poorly-conditioned numerical failures**
//!   ([`SimError::PoorlyConditioned`]) mean the step could not be solved from
//!   this start. Either no minimum exists or it is unreachable; the two cases
//!   cannot be told apart. Recovery (smaller timestep, failing the step)
//!   belongs to the caller.

use thiserror::Error;

/// Errors that can occur while assembling or solving a time step.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    /// A vector did not have the dimension the operation was configured for.
    #[error("dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// What was being checked.
        context: &'static str,
        /// Configured dimension.
        expected: usize,
        /// Dimension actually supplied.
        actual: usize,
    },

    /// A state index lies outside the state vector.
    #[error("state index {index} out of range for dimension {dimension}")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Dimension of the state vector it was applied to.
        dimension: usize,
    },

    /// An argument was outside its valid domain.
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// Description of the problem.
        reason: String,
    },

    /// Invalid timestep.
    #[error("invalid timestep: {0} (must be positive and finite)")]
    InvalidTimestep(f64),

    /// Invalid configuration.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the configuration error.
        reason: String,
    },

    /// The minimization could not make progress.
    #[error("poorly conditioned: {reason}")]
    PoorlyConditioned {
        /// Description of what went wrong.
        reason: String,
    },
}

impl SimError {
    /// Create a dimension mismatch error.
    #[must_use]
    pub fn dimension_mismatch(context: &'static str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            context,
            expected,
            actual,
        }
    }

    /// Create an invalid argument error.
    #[must_use]
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Create a poorly-conditioned error.
    #[must_use]
    pub fn poorly_conditioned(reason: impl Into<String>) -> Self {
        Self::PoorlyConditioned {
            reason: reason.into(),
        }
    }

    /// Check if this is a numerical (poorly-conditioned) failure.
    #[must_use]
    pub fn is_poorly_conditioned(&self) -> bool {
        matches!(self, Self::PoorlyConditioned { .. })
    }

    /// Check if this is a precondition violation.
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        !self.is_poorly_conditioned()
    }
}

/// Check that a vector has the expected dimension.
pub fn check_dimension(context: &'static str, expected: usize, actual: usize) -> crate::Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(SimError::dimension_mismatch(context, expected, actual))
    }
}

/// Check that a timestep is positive and finite.
pub fn check_timestep(dt: f64) -> crate::Result<()> {
    if dt.is_finite() && dt > 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidTimestep(dt))
    }
}
