use cherrycore::error::Result;
use cherrycore::{SimParams, Simulation, SteeringOutcome};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn steering(strength: f64, cadence: u32) -> SimParams {
    SimParams {
        steering_strength: strength,
        steering_cadence: cadence,
        ..SimParams::default()
    }
}

/// With the bundled backend nearly every particle gets a Voronoi axis, and the
/// first kick has magnitude `strength * dt`.
#[test]
fn steering_kicks_particles_along_unit_axes() -> Result<()> {
    init_logging();
    let n = 60;
    let dt = 1.0 / 60.0;
    let mut sim = Simulation::new(SimParams {
        repulsion_strength: 0.0,
        damping: 1.0,
        ..steering(0.5, 1)
    })?;
    sim.initialize(n, 0.001, 5)?;

    let report = sim.advance(dt);
    let SteeringOutcome::Applied { steered } = report.steering else {
        panic!("expected steering to run, got {:?}", report.steering);
    };
    assert!(steered >= n / 2, "only {steered} of {n} particles steered");

    let kicked = sim
        .particles()
        .iter()
        .filter(|p| p.velocity.norm() > 0.0)
        .count();
    assert_eq!(kicked, steered);
    for p in sim.particles().iter().filter(|p| p.velocity.norm() > 0.0) {
        assert!((p.velocity.norm() - 0.5 * dt).abs() < 1e-12);
    }
    Ok(())
}

/// A second kick aligns with the existing velocity, so speed keeps growing.
#[test]
fn repeated_steering_builds_speed() -> Result<()> {
    init_logging();
    let mut sim = Simulation::new(SimParams {
        repulsion_strength: 0.0,
        damping: 1.0,
        ..steering(1.0, 1)
    })?;
    sim.initialize(40, 0.001, 21)?;
    let e0 = sim.kinetic_energy();
    sim.advance(0.05);
    let e1 = sim.kinetic_energy();
    sim.advance(0.05);
    let e2 = sim.kinetic_energy();
    assert!(e0 == 0.0 && e1 > 0.0 && e2 > e1, "{e0} {e1} {e2}");
    Ok(())
}

/// Below four particles steering never runs; the result matches a run with
/// steering disabled exactly.
#[test]
fn three_particles_are_never_steered() -> Result<()> {
    init_logging();
    let mut steered = Simulation::new(steering(2.0, 1))?;
    let mut plain = Simulation::new(SimParams::default())?;
    steered.initialize(3, 0.2, 8)?;
    plain.initialize(3, 0.2, 8)?;
    for _ in 0..20 {
        let report = steered.advance(1.0 / 60.0);
        assert_eq!(report.steering, SteeringOutcome::TooFewParticles);
        plain.advance(1.0 / 60.0);
    }
    assert_eq!(steered.particles(), plain.particles());
    Ok(())
}

/// Steering is deterministic given the seed.
#[test]
fn steered_runs_are_identical() -> Result<()> {
    init_logging();
    let run = || -> Result<Vec<f32>> {
        let mut sim = Simulation::new(steering(0.3, 2))?;
        sim.initialize(32, 0.02, 99)?;
        for _ in 0..6 {
            sim.advance(1.0 / 60.0);
        }
        let positions = sim.position_buffer().unwrap_or(&[]).to_vec();
        Ok(positions)
    };
    assert_eq!(run()?, run()?);
    Ok(())
}

/// Steering on a cadence plus repulsion keeps the population inside the cube.
#[test]
fn steered_population_stays_in_cube() -> Result<()> {
    init_logging();
    let mut sim = Simulation::new(steering(0.2, 5))?;
    sim.initialize(50, 0.02, 42)?;
    for _ in 0..30 {
        sim.advance(1.0 / 60.0);
    }
    assert!(sim
        .position_buffer()
        .unwrap_or(&[])
        .iter()
        .all(|&c| (0.0..1.0).contains(&c)));
    assert!(sim.max_speed() < 1.0);
    Ok(())
}
