//! Multi-step runs through the stepper.

use approx::assert_relative_eq;
use nalgebra::{UnitQuaternion, Vector3};
use sim_energy::{ParticleState, StateSpaceMapper, Stepper};
use sim_integration_tests::FallingParticle;
use sim_types::{IntegratorConfig, MinimizerConfig};

#[test]
fn test_free_fall_matches_closed_form() {
    let g = Vector3::new(0.0, 0.0, -9.81);
    let config = IntegratorConfig::with_timestep(0.0625).minimizer(MinimizerConfig::high_accuracy());
    let system = FallingParticle::new(g, config.minimizer).expect("assemble");
    let x0 = system
        .start(1.0, Vector3::new(0.0, 0.0, 20.0), Vector3::new(1.0, 0.0, 0.0))
        .expect("encode");

    let mut stepper = Stepper::new(system.solver.clone(), x0, config).expect("stepper");
    let trajectory = stepper.run_for(1.0).expect("run");
    assert_eq!(trajectory.len(), 16);
    assert_relative_eq!(stepper.time(), 1.0, epsilon = 1e-12);

    for (i, state) in trajectory.iter().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let t = (i + 1) as f64 * 0.0625;
        let particle = system.decode(state).expect("decode");
        assert_relative_eq!(particle.position.z, 20.0 - 0.5 * 9.81 * t * t, epsilon = 1e-4);
        assert_relative_eq!(particle.position.x, t, epsilon = 1e-4);
        assert_relative_eq!(particle.velocity.z, -9.81 * t, epsilon = 1e-4);
        assert_relative_eq!(particle.mass, 1.0, epsilon = 1e-6);
    }
}

#[test]
fn test_step_results_report_work() {
    let config = IntegratorConfig::with_timestep(0.1);
    let system = FallingParticle::new(Vector3::new(0.0, -1.0, 0.0), config.minimizer)
        .expect("assemble");
    let x0 = system
        .start(2.0, Vector3::zeros(), Vector3::zeros())
        .expect("encode");
    let mut stepper = Stepper::new(system.solver.clone(), x0, config).expect("stepper");

    let result = stepper.step().expect("step");
    assert_eq!(result.substeps, 1);
    assert!(result.iterations >= 1);
    assert!(result.residual_energy >= 0.0);
    assert_relative_eq!(result.time, 0.1);
    assert_eq!(stepper.step_count(), 1);
}

#[test]
fn test_orientation_stays_unit() {
    let config = IntegratorConfig::with_timestep(0.1);
    let system = FallingParticle::oriented(Vector3::new(0.0, 0.0, -9.81), config.minimizer)
        .expect("assemble");
    let rotation = UnitQuaternion::from_euler_angles(0.3, 0.0, 1.2);
    let start = ParticleState::in_field(
        1.0,
        Vector3::zeros(),
        Vector3::zeros(),
        &system.gravity,
    )
    .with_orientation(rotation);
    let x0 = start.encode(&system.layout).expect("encode");

    let mut stepper = Stepper::new(system.solver.clone(), x0, config).expect("stepper");
    let trajectory = stepper.run(5).expect("run");

    let orientation = system.layout.orientation.expect("oriented layout");
    for state in &trajectory {
        let q = orientation.decode(state).expect("decode quaternion");
        assert_relative_eq!(q.norm(), 1.0, epsilon = 1e-6);
    }
    let last = system.decode(&trajectory[4]).expect("decode");
    let settled = last.orientation.expect("orientation");
    assert_relative_eq!(settled.angle_to(&rotation), 0.0, epsilon = 1e-4);
}
