//! Re-solving from an accepted state.
//!
//! The accepted state is a minimizer of the step's energy function, so
//! starting the minimizer there again must not move it.

use approx::assert_relative_eq;
use nalgebra::Vector3;
use sim_energy::{EnergySolver, StateLayout};
use sim_integration_tests::{AxisBody, FallingParticle};
use sim_optimize::{
    MultivariateFunction, find_fletcher_reeves_polak_ribiere_with_config, find_powell_with_config,
};
use sim_types::{MinimizerConfig, MinimizerMethod, ReferenceScales};

#[test]
fn test_conjugate_gradient_fixed_point() {
    let config = MinimizerConfig::high_accuracy();
    let system = FallingParticle::new(Vector3::new(0.5, 0.0, -9.81), config).expect("assemble");
    let x0 = system
        .start(1.2, Vector3::new(0.0, 0.0, 3.0), Vector3::new(0.2, -0.1, 0.0))
        .expect("encode");
    let dt = 0.02;

    let first = system.solver.solve(&x0, dt).expect("first solve");
    let function = system.solver.function(&x0, dt).expect("function");
    let again = find_fletcher_reeves_polak_ribiere_with_config(&function, &first.state, &config)
        .expect("re-solve");

    assert_relative_eq!(again.point, first.state, epsilon = 1e-6);
    assert!(again.value <= first.residual_energy + 1e-15);
    assert_relative_eq!(function.value(&first.state).unwrap(), first.residual_energy);
}

#[test]
fn test_powell_fixed_point() {
    let mut layout = StateLayout::new();
    let body = AxisBody::allocate(&mut layout);
    let g = -1.0;
    let config = MinimizerConfig::default()
        .with_method(MinimizerMethod::Powell)
        .with_max_iterations(2000);
    let solver = EnergySolver::new(
        layout.dimension(),
        body.terms(g, ReferenceScales::unit()),
        config,
    )
    .expect("assemble");
    let x0 = body.encode(layout.dimension(), 1.0, 0.0, 1.0, g);

    let first = solver.solve(&x0, 0.5).expect("first solve");
    let function = solver.function(&x0, 0.5).expect("function");
    let again = find_powell_with_config(&function, &first.state, &config).expect("re-solve");

    assert_relative_eq!(again.point, first.state, epsilon = 1e-6);
}
