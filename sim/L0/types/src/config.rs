//! Configuration types for the integrator.
//!
//! This module provides configuration types that control how a time step is
//! solved: timestep, minimization algorithm, tolerances, iteration budgets and
//! the retry policy for steps that fail to converge.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Multidimensional minimization algorithm used to solve a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MinimizerMethod {
    /// Powell's direction-set method. Uses function values only.
    Powell,
    /// Fletcher-Reeves-Polak-Ribière nonlinear conjugate gradient.
    /// Uses the analytic gradient of every term.
    #[default]
    ConjugateGradient,
}

/// Configuration for multidimensional minimization.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MinimizerConfig {
    /// Algorithm used for the outer iteration.
    pub method: MinimizerMethod,
    /// Fractional tolerance on the outer iteration.
    ///
    /// Powell stops when the fractional decrease over one iteration is below
    /// this value. Conjugate gradient stops when the per-iteration reduction
    /// falls below this fraction of the largest reduction seen so far, so the
    /// test is relative, not absolute: a loose tolerance can stop while a
    /// visible residual energy remains. Steps whose energies are small
    /// against the reference scales want a tight value, e.g.
    /// [`MinimizerConfig::high_accuracy`].
    pub tolerance: f64,
    /// Relative tolerance on the location of each line minimum.
    ///
    /// Values below the square root of machine epsilon buy nothing: a
    /// minimum cannot be located more precisely than that.
    pub line_tolerance: f64,
    /// Maximum outer iterations before the solve is declared poorly conditioned.
    pub max_iterations: usize,
    /// Maximum bracket expansions per line search.
    pub max_bracket_iterations: usize,
}

impl Default for MinimizerConfig {
    fn default() -> Self {
        Self {
            method: MinimizerMethod::ConjugateGradient,
            tolerance: 1e-10,
            line_tolerance: 1e-7,
            max_iterations: 500,
            max_bracket_iterations: 100,
        }
    }
}

impl MinimizerConfig {
    /// High-accuracy configuration for reference solutions.
    #[must_use]
    pub fn high_accuracy() -> Self {
        Self {
            tolerance: 1e-14,
            line_tolerance: 3e-8,
            max_iterations: 2000,
            ..Default::default()
        }
    }

    /// Fast configuration for real-time applications.
    #[must_use]
    pub fn realtime() -> Self {
        Self {
            tolerance: 1e-6,
            line_tolerance: 1e-4,
            max_iterations: 100,
            ..Default::default()
        }
    }

    /// Set the minimization algorithm.
    #[must_use]
    pub const fn with_method(mut self, method: MinimizerMethod) -> Self {
        self.method = method;
        self
    }

    /// Set the outer tolerance.
    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the line-search tolerance.
    #[must_use]
    pub const fn with_line_tolerance(mut self, line_tolerance: f64) -> Self {
        self.line_tolerance = line_tolerance;
        self
    }

    /// Set the outer iteration budget.
    #[must_use]
    pub const fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Validate the minimizer configuration.
    pub fn validate(&self) -> crate::Result<()> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(crate::SimError::invalid_config(
                "tolerance must be positive and finite",
            ));
        }

        if !self.line_tolerance.is_finite() || self.line_tolerance <= 0.0 {
            return Err(crate::SimError::invalid_config(
                "line_tolerance must be positive and finite",
            ));
        }

        if self.max_iterations == 0 {
            return Err(crate::SimError::invalid_config(
                "max_iterations must be at least 1",
            ));
        }

        if self.max_bracket_iterations == 0 {
            return Err(crate::SimError::invalid_config(
                "max_bracket_iterations must be at least 1",
            ));
        }

        Ok(())
    }
}

/// Main configuration for stepping a system through time.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IntegratorConfig {
    /// Fixed timestep for each solve (seconds).
    pub timestep: f64,
    /// Minimizer settings used for every step. A stepper requires these to
    /// match the settings its solver was built with.
    pub minimizer: MinimizerConfig,
    /// How many times a poorly-conditioned step is retried with half the
    /// timestep before the failure is propagated.
    pub max_step_halvings: u32,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            timestep: 1.0 / 240.0,
            minimizer: MinimizerConfig::default(),
            max_step_halvings: 4,
        }
    }
}

impl IntegratorConfig {
    /// Create a new integrator config with the given timestep.
    #[must_use]
    pub fn with_timestep(timestep: f64) -> Self {
        Self {
            timestep,
            ..Default::default()
        }
    }

    /// Create a configuration for real-time stepping (60 Hz).
    #[must_use]
    pub fn realtime() -> Self {
        Self {
            timestep: 1.0 / 60.0,
            minimizer: MinimizerConfig::realtime(),
            ..Default::default()
        }
    }

    /// Create a configuration for high-fidelity stepping (1000 Hz).
    #[must_use]
    pub fn high_fidelity() -> Self {
        Self {
            timestep: 1.0 / 1000.0,
            minimizer: MinimizerConfig::high_accuracy(),
            ..Default::default()
        }
    }

    /// Set the minimizer configuration.
    #[must_use]
    pub fn minimizer(mut self, minimizer: MinimizerConfig) -> Self {
        self.minimizer = minimizer;
        self
    }

    /// Set the retry budget for poorly-conditioned steps.
    #[must_use]
    pub fn max_step_halvings(mut self, halvings: u32) -> Self {
        self.max_step_halvings = halvings;
        self
    }

    /// Disable timestep halving: failures propagate immediately.
    #[must_use]
    pub fn without_retry(mut self) -> Self {
        self.max_step_halvings = 0;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> crate::Result<()> {
        crate::error::check_timestep(self.timestep)?;
        self.minimizer.validate()?;
        Ok(())
    }

    /// Get the frequency in Hz.
    #[must_use]
    pub fn frequency(&self) -> f64 {
        1.0 / self.timestep
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_config() {
        let config = IntegratorConfig::default();
        assert!(config.validate().is_ok());
        assert_relative_eq!(config.timestep, 1.0 / 240.0, epsilon = 1e-10);
        assert_eq!(config.minimizer.method, MinimizerMethod::ConjugateGradient);
    }

    #[test]
    fn test_config_presets() {
        let realtime = IntegratorConfig::realtime();
        assert_relative_eq!(realtime.timestep, 1.0 / 60.0, epsilon = 1e-10);
        assert!(realtime.minimizer.tolerance > MinimizerConfig::default().tolerance);

        let hifi = IntegratorConfig::high_fidelity();
        assert_relative_eq!(hifi.timestep, 1.0 / 1000.0, epsilon = 1e-10);
        assert!(hifi.minimizer.tolerance < MinimizerConfig::default().tolerance);
        assert!(hifi.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = IntegratorConfig::with_timestep(0.01)
            .minimizer(MinimizerConfig::default().with_method(MinimizerMethod::Powell))
            .without_retry();

        assert_relative_eq!(config.timestep, 0.01, epsilon = 1e-10);
        assert_relative_eq!(config.frequency(), 100.0, epsilon = 1e-10);
        assert_eq!(config.minimizer.method, MinimizerMethod::Powell);
        assert_eq!(config.max_step_halvings, 0);
    }

    #[test]
    fn test_config_validation() {
        let mut config = IntegratorConfig::default();
        assert!(config.validate().is_ok());

        config.timestep = -0.01;
        assert!(config.validate().is_err());

        config.timestep = 0.0;
        assert!(config.validate().is_err());

        config.timestep = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_minimizer_validation() {
        let mut minimizer = MinimizerConfig::default();
        assert!(minimizer.validate().is_ok());

        minimizer.tolerance = 0.0;
        assert!(minimizer.validate().is_err());

        minimizer = MinimizerConfig::default().with_line_tolerance(-1.0);
        assert!(minimizer.validate().is_err());

        minimizer = MinimizerConfig::default().with_max_iterations(0);
        assert!(minimizer.validate().is_err());

        minimizer = MinimizerConfig {
            max_bracket_iterations: 0,
            ..Default::default()
        };
        assert!(minimizer.validate().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_serde() {
        let config = IntegratorConfig::high_fidelity();
        let json = serde_json::to_string(&config).unwrap();
        let back: IntegratorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
