//! The summed energy error of a candidate next state.

use nalgebra::DVector;
use sim_optimize::{DifferentiableMultivariateFunction, MultivariateFunction};
use sim_types::{Result, SimError, check_dimension, check_timestep};

use crate::terms::{EnergyTerm, Term};

/// Sum of all term energies at a fixed initial state and timestep.
///
/// The unknown is the next state; its dimension equals that of the initial
/// state. Each evaluation allocates one gradient buffer that every term adds
/// into.
#[derive(Debug, Clone, Copy)]
pub struct EnergyErrorFunction<'a> {
    initial: &'a DVector<f64>,
    dt: f64,
    terms: &'a [Term],
}

impl<'a> EnergyErrorFunction<'a> {
    /// Bind a term set to an initial state and timestep.
    ///
    /// Fails if `dt` is not positive and finite or if any term reads an
    /// index beyond `initial`.
    pub fn new(initial: &'a DVector<f64>, dt: f64, terms: &'a [Term]) -> Result<Self> {
        check_timestep(dt)?;
        check_terms(terms, initial.len())?;
        Ok(Self { initial, dt, terms })
    }

    /// The initial state.
    #[must_use]
    pub fn initial(&self) -> &DVector<f64> {
        self.initial
    }

    /// The timestep.
    #[must_use]
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// The term set.
    #[must_use]
    pub fn terms(&self) -> &[Term] {
        self.terms
    }

    /// Total energy and its gradient at `state`.
    pub fn evaluate(&self, state: &DVector<f64>) -> Result<(f64, DVector<f64>)> {
        check_dimension("energy function state", self.initial.len(), state.len())?;
        let mut gradient = DVector::zeros(state.len());
        let mut total = 0.0;
        for term in self.terms {
            total += term.evaluate(self.initial, state, self.dt, &mut gradient)?;
        }
        Ok((total, gradient))
    }

    /// Energy of each term at `state`, paired with the term name.
    ///
    /// Useful for finding which law a poorly converged step violates.
    pub fn term_energies(&self, state: &DVector<f64>) -> Result<Vec<(&'static str, f64)>> {
        check_dimension("energy function state", self.initial.len(), state.len())?;
        let mut scratch = DVector::zeros(state.len());
        self.terms
            .iter()
            .map(|term| {
                let energy = term.evaluate(self.initial, state, self.dt, &mut scratch)?;
                Ok((term.name(), energy))
            })
            .collect()
    }
}

/// Check that every term can be applied to states of `dimension`.
pub(crate) fn check_terms(terms: &[Term], dimension: usize) -> Result<()> {
    for term in terms {
        if !term.is_valid_for_dimension(dimension) {
            return Err(SimError::invalid_config(format!(
                "{} term needs a state of at least {} components, got {dimension}",
                term.name(),
                term.required_dimension()
            )));
        }
        term.scales().validate()?;
    }
    Ok(())
}

impl MultivariateFunction for EnergyErrorFunction<'_> {
    fn dimension(&self) -> usize {
        self.initial.len()
    }

    fn value(&self, x: &DVector<f64>) -> Result<f64> {
        self.evaluate(x).map(|(value, _)| value)
    }
}

impl DifferentiableMultivariateFunction for EnergyErrorFunction<'_> {
    fn value_and_gradient(&self, x: &DVector<f64>) -> Result<(f64, DVector<f64>)> {
        self.evaluate(x)
    }
}
