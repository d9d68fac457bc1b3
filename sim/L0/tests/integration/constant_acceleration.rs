//! Constant-acceleration steps.
//!
//! Under a uniform field the trapezoidal relations are exact, so a single
//! solved step must land on the closed-form trajectory:
//!
//! ```text
//! x = x₀ + v₀·dt + ½·a·dt²
//! v = v₀ + a·dt
//! ```

use approx::assert_relative_eq;
use nalgebra::Vector3;
use sim_energy::{EnergySolver, EnergyTerm, StateLayout};
use sim_integration_tests::{AxisBody, FallingParticle};
use sim_types::{MinimizerConfig, MinimizerMethod, ReferenceScales};

// ============================================================================
// Conjugate gradient
// ============================================================================

#[test]
fn test_drop_from_rest_conjugate_gradient() {
    let system =
        FallingParticle::new(Vector3::new(0.0, 0.0, -2.0), MinimizerConfig::high_accuracy())
            .expect("assemble particle");
    let x0 = system
        .start(1.0, Vector3::zeros(), Vector3::zeros())
        .expect("encode start");

    let outcome = system.solver.solve(&x0, 1.0).expect("solve step");
    let next = system.decode(&outcome.state).expect("decode");

    assert_relative_eq!(next.position.z, -1.0, epsilon = 1e-4);
    assert_relative_eq!(next.velocity.z, -2.0, epsilon = 1e-4);
    assert_relative_eq!(next.position.x, 0.0, epsilon = 1e-4);
    assert_relative_eq!(next.mass, 1.0, epsilon = 1e-4);
    assert_relative_eq!(next.force.z, -2.0, epsilon = 1e-4);
    assert!(outcome.residual_energy < 1e-8);
}

#[test]
fn test_projectile_conjugate_gradient() {
    let g = Vector3::new(0.0, 0.0, -9.81);
    let system = FallingParticle::new(g, MinimizerConfig::high_accuracy()).expect("assemble");
    let position = Vector3::new(1.0, -2.0, 5.0);
    let velocity = Vector3::new(3.0, 0.5, 4.0);
    let x0 = system.start(2.0, position, velocity).expect("encode");
    let dt = 0.05;

    let outcome = system.solver.solve(&x0, dt).expect("solve");
    let next = system.decode(&outcome.state).expect("decode");

    let expected_position = position + velocity * dt + g * (0.5 * dt * dt);
    let expected_velocity = velocity + g * dt;
    for axis in 0..3 {
        assert_relative_eq!(next.position[axis], expected_position[axis], epsilon = 1e-5);
        assert_relative_eq!(next.velocity[axis], expected_velocity[axis], epsilon = 1e-5);
    }
}

#[test]
fn test_every_term_satisfied_at_solution() {
    let system =
        FallingParticle::new(Vector3::new(0.0, -1.0, 0.0), MinimizerConfig::high_accuracy())
            .expect("assemble");
    let x0 = system
        .start(1.0, Vector3::zeros(), Vector3::new(1.0, 0.0, 0.0))
        .expect("encode");
    let outcome = system.solver.solve(&x0, 0.5).expect("solve");

    let function = system.solver.function(&x0, 0.5).expect("function");
    for (name, energy) in function.term_energies(&outcome.state).expect("energies") {
        assert!(energy < 1e-8, "{name} left {energy}");
    }
    assert_eq!(function.terms().len(), 16);
    assert!(function.terms().iter().all(|t| t.is_valid_for_dimension(13)));
}

#[test]
fn test_projectile_with_matched_scales() {
    // A 2 kg body covering roughly 0.25 m per 0.05 s step.
    let scales = ReferenceScales::for_motion(2.0, 0.25, 0.05);
    let g = Vector3::new(0.0, 0.0, -9.81);
    let system = FallingParticle::scaled(g, scales, MinimizerConfig::high_accuracy())
        .expect("assemble");
    let position = Vector3::new(1.0, -2.0, 5.0);
    let velocity = Vector3::new(3.0, 0.5, 4.0);
    let x0 = system.start(2.0, position, velocity).expect("encode");
    let dt = 0.05;

    let outcome = system.solver.solve(&x0, dt).expect("solve");
    let next = system.decode(&outcome.state).expect("decode");

    let expected_position = position + velocity * dt + g * (0.5 * dt * dt);
    let expected_velocity = velocity + g * dt;
    let position_tolerance = 1e-4 * scales.length;
    let velocity_tolerance = 1e-4 * scales.velocity();
    for axis in 0..3 {
        assert_relative_eq!(
            next.position[axis],
            expected_position[axis],
            epsilon = position_tolerance
        );
        assert_relative_eq!(
            next.velocity[axis],
            expected_velocity[axis],
            epsilon = velocity_tolerance
        );
    }
    assert_relative_eq!(next.mass, 2.0, epsilon = 1e-4 * scales.mass);
    assert!(outcome.residual_energy < 1e-6 * scales.energy());
}

// ============================================================================
// Powell
// ============================================================================

#[test]
fn test_drop_from_rest_powell() {
    let mut layout = StateLayout::new();
    let body = AxisBody::allocate(&mut layout);
    let g = -2.0;
    let config = MinimizerConfig::default()
        .with_method(MinimizerMethod::Powell)
        .with_max_iterations(2000);
    let solver = EnergySolver::new(
        layout.dimension(),
        body.terms(g, ReferenceScales::unit()),
        config,
    )
    .expect("assemble");

    let x0 = body.encode(layout.dimension(), 1.0, 0.0, 0.0, g);
    let outcome = solver.solve(&x0, 1.0).expect("solve");

    assert_relative_eq!(outcome.state[body.position.index()], -1.0, epsilon = 1e-4);
    assert_relative_eq!(outcome.state[body.velocity.index()], -2.0, epsilon = 1e-4);
    assert_relative_eq!(outcome.state[body.acceleration.index()], -2.0, epsilon = 1e-4);
}

#[test]
fn test_methods_agree() {
    let mut layout = StateLayout::new();
    let body = AxisBody::allocate(&mut layout);
    let g = -9.81;
    let x0 = body.encode(layout.dimension(), 0.5, 10.0, 1.5, g);
    let dt = 0.1;

    let solve = |method| {
        let config = MinimizerConfig::default()
            .with_method(method)
            .with_max_iterations(2000);
        EnergySolver::new(
            layout.dimension(),
            body.terms(g, ReferenceScales::unit()),
            config,
        )
        .and_then(|solver| solver.solve(&x0, dt))
        .expect("solve")
    };

    let cg = solve(MinimizerMethod::ConjugateGradient);
    let powell = solve(MinimizerMethod::Powell);
    let expected_position = 10.0 + 1.5 * dt + 0.5 * g * dt * dt;
    assert_relative_eq!(cg.state[body.position.index()], expected_position, epsilon = 1e-4);
    assert_relative_eq!(powell.state[body.position.index()], expected_position, epsilon = 1e-4);
}
