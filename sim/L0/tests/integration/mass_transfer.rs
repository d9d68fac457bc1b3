//! Open systems: mass entering or leaving a body.
//!
//! Flow rates and exhaust velocities are unknowns like any other state
//! component. Here they are held at their previous values with a closed
//! mass-conservation term on each, which makes `q = q₀` the only zero of
//! that term.

use approx::assert_relative_eq;
use sim_energy::{
    EnergySolver, MassConservation, MassTransfer, MomentumConservation, ScalarMapper, StateLayout,
    Term,
};
use sim_types::{DVector, MinimizerConfig, ReferenceScales};

fn hold(mapper: ScalarMapper, scales: ReferenceScales) -> Term {
    MassConservation::new(mapper, scales).into()
}

#[test]
fn test_constant_outflow_drains_mass() {
    let scales = ReferenceScales::unit();
    let mut layout = StateLayout::new();
    let mass = layout.scalar();
    let rate = layout.scalar();

    let terms: Vec<Term> = vec![
        MassConservation::new(mass, scales).with_outflow(rate).into(),
        hold(rate, scales),
    ];
    let solver = EnergySolver::new(layout.dimension(), terms, MinimizerConfig::high_accuracy())
        .expect("assemble");

    let x0 = DVector::from_vec(vec![10.0, 0.5]);
    let outcome = solver.solve(&x0, 2.0).expect("solve");
    assert_relative_eq!(outcome.state[mass.index()], 9.0, epsilon = 1e-5);
    assert_relative_eq!(outcome.state[rate.index()], 0.5, epsilon = 1e-5);
}

#[test]
fn test_inflow_and_outflow_balance() {
    let scales = ReferenceScales::unit();
    let mut layout = StateLayout::new();
    let mass = layout.scalar();
    let inflow = layout.scalar();
    let outflow = layout.scalar();

    let terms: Vec<Term> = vec![
        MassConservation::new(mass, scales)
            .with_inflow(inflow)
            .with_outflow(outflow)
            .into(),
        hold(inflow, scales),
        hold(outflow, scales),
    ];
    let solver = EnergySolver::new(layout.dimension(), terms, MinimizerConfig::high_accuracy())
        .expect("assemble");

    let x0 = DVector::from_vec(vec![3.0, 1.25, 1.25]);
    let outcome = solver.solve(&x0, 0.5).expect("solve");
    assert_relative_eq!(outcome.state[mass.index()], 3.0, epsilon = 1e-5);
}

#[test]
fn test_rocket_gains_momentum_from_exhaust() {
    let scales = ReferenceScales::unit();
    let mut layout = StateLayout::new();
    let mass = layout.scalar();
    let velocity = layout.scalar();
    let exhaust = MassTransfer::new(layout.scalar(), layout.scalar());

    let terms: Vec<Term> = vec![
        MassConservation::new(mass, scales)
            .with_outflow(exhaust.rate)
            .into(),
        MomentumConservation::new(mass, velocity, scales)
            .with_outflow(exhaust)
            .into(),
        hold(exhaust.rate, scales),
        hold(exhaust.velocity, scales),
    ];
    let solver = EnergySolver::new(layout.dimension(), terms, MinimizerConfig::high_accuracy())
        .expect("assemble");

    // 10 kg at rest ejecting 0.5 kg/s at -10 m/s for 1 s.
    let x0 = DVector::from_vec(vec![10.0, 0.0, 0.5, -10.0]);
    let outcome = solver.solve(&x0, 1.0).expect("solve");

    let m = outcome.state[mass.index()];
    let v = outcome.state[velocity.index()];
    assert_relative_eq!(m, 9.5, epsilon = 1e-5);
    // m·v = dt·rout·(-uout) = 5
    assert_relative_eq!(m * v, 5.0, epsilon = 1e-5);
    assert!(v > 0.0);
}
