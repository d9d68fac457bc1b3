//! Solving one implicit step.

use sim_optimize::{
    Termination, find_fletcher_reeves_polak_ribiere_with_config, find_powell_with_config,
};
use sim_types::{MinimizerConfig, MinimizerMethod, Result, StateVector, check_dimension};
use tracing::{debug, trace};

use crate::function::{EnergyErrorFunction, check_terms};
use crate::terms::Term;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The accepted next state of one solve.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StepOutcome {
    /// The minimizing state.
    pub state: StateVector,
    /// Total energy left at `state`. Zero when every law holds exactly.
    pub residual_energy: f64,
    /// Outer minimizer iterations.
    pub iterations: usize,
    /// Why the minimizer stopped.
    pub termination: Termination,
}

/// Minimizes the summed energy error of a fixed term set.
///
/// The term set is checked against the state dimension once, at
/// construction. Each [`solve`](Self::solve) starts the minimizer from the
/// previous state.
///
/// # Example
///
/// ```
/// use sim_energy::{EnergySolver, PositionKinematics, ScalarMapper, Term};
/// use sim_types::{DVector, MinimizerConfig, ReferenceScales};
///
/// // Position at index 0, velocity at index 1.
/// let scales = ReferenceScales::unit();
/// let terms: Vec<Term> =
///     vec![PositionKinematics::new(ScalarMapper::new(0), ScalarMapper::new(1), scales).into()];
/// let solver = EnergySolver::new(2, terms, MinimizerConfig::default()).unwrap();
///
/// let x0 = DVector::from_vec(vec![0.0, 1.0]);
/// let outcome = solver.solve(&x0, 0.5).unwrap();
/// assert!(outcome.residual_energy < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct EnergySolver {
    dimension: usize,
    terms: Vec<Term>,
    config: MinimizerConfig,
}

impl EnergySolver {
    /// Assemble a solver for states of `dimension` components.
    ///
    /// Fails if the configuration is invalid, a term reads beyond
    /// `dimension`, or a term's reference scales are not positive.
    pub fn new(dimension: usize, terms: Vec<Term>, config: MinimizerConfig) -> Result<Self> {
        config.validate()?;
        check_terms(&terms, dimension)?;
        Ok(Self {
            dimension,
            terms,
            config,
        })
    }

    /// State dimension.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// The term set.
    #[must_use]
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// The minimizer configuration.
    #[must_use]
    pub fn config(&self) -> &MinimizerConfig {
        &self.config
    }

    /// The energy function for a step of `dt` from `initial`.
    pub fn function<'a>(
        &'a self,
        initial: &'a StateVector,
        dt: f64,
    ) -> Result<EnergyErrorFunction<'a>> {
        check_dimension("initial state", self.dimension, initial.len())?;
        EnergyErrorFunction::new(initial, dt, &self.terms)
    }

    /// Find the next state after a step of `dt` from `initial`.
    ///
    /// Precondition failures (wrong dimension, invalid `dt`) are reported
    /// before any minimization. A poorly-conditioned failure means no
    /// acceptable next state was found from `initial`.
    pub fn solve(&self, initial: &StateVector, dt: f64) -> Result<StepOutcome> {
        let function = self.function(initial, dt)?;
        trace!(
            dt,
            method = ?self.config.method,
            terms = self.terms.len(),
            "solving step"
        );

        let minimum = match self.config.method {
            MinimizerMethod::Powell => find_powell_with_config(&function, initial, &self.config)?,
            MinimizerMethod::ConjugateGradient => {
                find_fletcher_reeves_polak_ribiere_with_config(&function, initial, &self.config)?
            }
        };

        debug!(
            dt,
            residual = minimum.value,
            iterations = minimum.iterations,
            termination = ?minimum.termination,
            "step solved"
        );
        Ok(StepOutcome {
            state: minimum.point,
            residual_energy: minimum.value,
            iterations: minimum.iterations,
            termination: minimum.termination,
        })
    }
}
