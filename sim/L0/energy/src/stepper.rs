//! Advancing a state through time.
//!
//! The [`Stepper`] owns the current state and the simulation clock. Each
//! [`step`](Stepper::step) solves for the state one configured timestep
//! ahead. When the minimizer reports a poorly-conditioned failure, the
//! interval is split into two half steps and each half is solved in turn,
//! recursively, up to [`IntegratorConfig::max_step_halvings`] times. Only
//! when the smallest allowed step still fails is the error propagated.
//!
//! # Example
//!
//! ```
//! use sim_energy::{ParticleLayout, ParticleState, EnergySolver, Stepper};
//! use sim_types::{Gravity, IntegratorConfig, ReferenceScales, Vector3};
//!
//! let particle = ParticleLayout::new();
//! let gravity = Gravity::custom(Vector3::new(0.0, 0.0, -1.0));
//! let terms = particle.standard_terms(ReferenceScales::unit(), &gravity);
//! let config = IntegratorConfig::with_timestep(0.125);
//! let solver = EnergySolver::new(particle.dimension(), terms, config.minimizer).unwrap();
//!
//! let start = ParticleState::in_field(1.0, Vector3::zeros(), Vector3::zeros(), &gravity);
//! let mut stepper = Stepper::new(solver, start.encode(&particle).unwrap(), config).unwrap();
//! let trajectory = stepper.run_for(0.5).unwrap();
//! assert_eq!(trajectory.len(), 4);
//! ```

use sim_types::{IntegratorConfig, Result, SimError, StateVector, check_dimension};
use tracing::{debug, warn};

use crate::solver::{EnergySolver, StepOutcome};

/// Result of one [`Stepper::step`].
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// State at the end of the step.
    pub state: StateVector,
    /// Simulation time at the end of the step.
    pub time: f64,
    /// Number of solves needed to cover the step. One unless the timestep
    /// was halved.
    pub substeps: usize,
    /// Residual energy summed over the substeps.
    pub residual_energy: f64,
    /// Minimizer iterations summed over the substeps.
    pub iterations: usize,
}

/// Accepted work while covering one interval.
#[derive(Debug, Default)]
struct Progress {
    substeps: usize,
    residual_energy: f64,
    iterations: usize,
}

impl Progress {
    fn record(&mut self, outcome: &StepOutcome) {
        self.substeps += 1;
        self.residual_energy += outcome.residual_energy;
        self.iterations += outcome.iterations;
    }
}

/// Steps a state forward with a fixed timestep.
#[derive(Debug, Clone)]
pub struct Stepper {
    solver: EnergySolver,
    config: IntegratorConfig,
    state: StateVector,
    time: f64,
    steps: u64,
}

impl Stepper {
    /// Start stepping from `initial` at time zero.
    ///
    /// Fails if the configuration is invalid, its minimizer settings differ
    /// from the ones `solver` was built with, or `initial` does not match
    /// the solver's dimension.
    pub fn new(solver: EnergySolver, initial: StateVector, config: IntegratorConfig) -> Result<Self> {
        config.validate()?;
        if config.minimizer != *solver.config() {
            return Err(SimError::invalid_config(format!(
                "integrator minimizer {:?} differs from the solver's {:?}",
                config.minimizer,
                solver.config()
            )));
        }
        check_dimension("initial state", solver.dimension(), initial.len())?;
        Ok(Self {
            solver,
            config,
            state: initial,
            time: 0.0,
            steps: 0,
        })
    }

    /// The current state.
    #[must_use]
    pub fn state(&self) -> &StateVector {
        &self.state
    }

    /// Current simulation time.
    #[must_use]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Number of completed steps.
    #[must_use]
    pub fn step_count(&self) -> u64 {
        self.steps
    }

    /// The integrator configuration.
    #[must_use]
    pub fn config(&self) -> &IntegratorConfig {
        &self.config
    }

    /// The solver used for every step.
    #[must_use]
    pub fn solver(&self) -> &EnergySolver {
        &self.solver
    }

    /// Replace the current state, keeping the clock.
    pub fn reset_state(&mut self, state: StateVector) -> Result<()> {
        check_dimension("stepper state", self.solver.dimension(), state.len())?;
        self.state = state;
        Ok(())
    }

    /// Advance by one configured timestep.
    ///
    /// # Errors
    ///
    /// Returns the solver's error if the step fails even at the smallest
    /// permitted timestep. The state and clock are unchanged on failure.
    pub fn step(&mut self) -> Result<StepResult> {
        let dt = self.config.timestep;
        let mut progress = Progress::default();
        let next = self.advance(&self.state, dt, self.config.max_step_halvings, &mut progress)?;

        self.state = next;
        self.time += dt;
        self.steps += 1;
        debug!(
            time = self.time,
            substeps = progress.substeps,
            residual = progress.residual_energy,
            "step complete"
        );

        Ok(StepResult {
            state: self.state.clone(),
            time: self.time,
            substeps: progress.substeps,
            residual_energy: progress.residual_energy,
            iterations: progress.iterations,
        })
    }

    /// Cover `dt` from `state`, halving on poorly-conditioned failures.
    fn advance(
        &self,
        state: &StateVector,
        dt: f64,
        halvings_left: u32,
        progress: &mut Progress,
    ) -> Result<StateVector> {
        match self.solver.solve(state, dt) {
            Ok(outcome) => {
                progress.record(&outcome);
                Ok(outcome.state)
            }
            Err(err) if err.is_poorly_conditioned() && halvings_left > 0 => {
                let half = 0.5 * dt;
                warn!(
                    dt,
                    retry_dt = half,
                    halvings_left,
                    error = %err,
                    "step poorly conditioned, retrying with half the timestep"
                );
                let midpoint = self.advance(state, half, halvings_left - 1, progress)?;
                self.advance(&midpoint, half, halvings_left - 1, progress)
            }
            Err(err) => Err(err),
        }
    }

    /// Take `steps` steps and return the state after each.
    ///
    /// # Errors
    ///
    /// Returns an error if any step fails; states up to the failure are
    /// kept in the stepper but not returned.
    pub fn run(&mut self, steps: usize) -> Result<Vec<StateVector>> {
        let mut trajectory = Vec::with_capacity(steps);
        for _ in 0..steps {
            trajectory.push(self.step()?.state);
        }
        Ok(trajectory)
    }

    /// Run for a span of simulation time.
    ///
    /// # Errors
    ///
    /// Returns an error if `duration` is negative or not finite, or if any
    /// step fails.
    pub fn run_for(&mut self, duration: f64) -> Result<Vec<StateVector>> {
        if !duration.is_finite() || duration < 0.0 {
            return Err(SimError::invalid_argument(format!(
                "run duration must be non-negative and finite, got {duration}"
            )));
        }
        if duration <= 0.0 {
            return Ok(Vec::new());
        }

        let target_time = self.time + duration;
        let dt = self.config.timestep;
        // Safe cast: duration and dt are positive, result is bounded
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let estimated_steps = (duration / dt).ceil().max(1.0) as usize;
        let mut trajectory = Vec::with_capacity(estimated_steps);

        for _ in 0..estimated_steps {
            if self.time >= target_time {
                break;
            }
            trajectory.push(self.step()?.state);
        }

        Ok(trajectory)
    }
}
