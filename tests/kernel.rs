use approx::assert_relative_eq;
use spheresim::core::DIM;
use spheresim::{Ball, Container, Simulation};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn dist(a: &[f64; DIM], b: &[f64; DIM]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// Known analytic scenario: two equal-mass unit balls approach head-on and
/// meet at t = 1 (gap 2, closing speed 2). Advancing just past the meeting
/// instant must have exchanged their velocities exactly once.
#[test]
fn head_on_collision_is_processed_exactly_once() -> spheresim::Result<()> {
    init_logging();
    let balls = vec![
        Ball::new([-2.0, 0.0, 0.0], [1.0, 0.0, 0.0], 1.0, 1.0)?,
        Ball::new([2.0, 0.0, 0.0], [-1.0, 0.0, 0.0], 1.0, 1.0)?,
    ];
    let mut sim = Simulation::new(balls, Container::new(10.0)?)?;

    sim.advance_to(1.1)?;
    let v = sim.velocities();
    assert_relative_eq!(v[0][0], -1.0, max_relative = 1e-9);
    assert_relative_eq!(v[1][0], 1.0, max_relative = 1e-9);

    // A second advance must not re-resolve the same contact: the balls keep
    // separating at the swapped velocities.
    sim.advance_to(2.0)?;
    let v = sim.velocities();
    assert_relative_eq!(v[0][0], -1.0, max_relative = 1e-9);
    assert_relative_eq!(v[1][0], 1.0, max_relative = 1e-9);
    Ok(())
}

/// A ball aimed radially outward reflects with its radial component negated,
/// tangential unchanged, and the wall books an impulse of 2·m·v_radial.
#[test]
fn container_reflection_books_impulse() -> spheresim::Result<()> {
    init_logging();
    let balls = vec![Ball::new([0.0, 3.0, 0.0], [0.0, 2.0, 0.0], 0.5, 2.0)?];
    let mut sim = Simulation::new(balls, Container::new(6.0)?)?;

    // Contact when y = 6 - 0.5 = 5.5, i.e. t = 1.25
    sim.advance_to(2.0)?;
    let v = sim.velocities();
    assert_relative_eq!(v[0][1], -2.0, max_relative = 1e-9);
    assert_relative_eq!(v[0][0], 0.0, epsilon = 1e-12);

    let p = sim.container().accumulated_momentum();
    assert_relative_eq!(p[1], 2.0 * 2.0 * 2.0, max_relative = 1e-9);
    Ok(())
}

/// Sampled after arbitrary advances, no two balls interpenetrate and no
/// ball pokes through the wall.
#[test]
fn no_interpenetration_under_sampling() -> spheresim::Result<()> {
    init_logging();
    let wall = 8.0;
    let radius = 0.5;
    let mut sim = Simulation::with_random_balls(24, wall, radius, 1.0, Some(42))?;

    let steps = 100;
    let t_end = 20.0;
    for s in 1..=steps {
        let t = t_end * (s as f64) / (steps as f64);
        sim.advance_to(t)?;
        let rs = sim.positions();
        for (i, ri) in rs.iter().enumerate() {
            let centre_dist = dist(ri, &[0.0; DIM]);
            assert!(
                centre_dist <= wall - radius + 1e-6,
                "ball {i} through the wall at t={t}: |r| = {centre_dist}"
            );
            for (j, rj) in rs.iter().enumerate().skip(i + 1) {
                assert!(
                    dist(ri, rj) >= 2.0 * radius - 1e-6,
                    "balls {i} and {j} interpenetrate at t={t}"
                );
            }
        }
    }
    Ok(())
}

/// Successive advances never decrease the clock and always land exactly on
/// the requested target; a backwards target is a validation error.
#[test]
fn clock_is_monotonic_and_exact() -> spheresim::Result<()> {
    init_logging();
    let mut sim = Simulation::with_random_balls(8, 5.0, 0.3, 1.0, Some(7))?;
    let mut last = 0.0;
    for s in 1..=50 {
        let t = 0.37 * (s as f64);
        sim.advance_to(t)?;
        assert_eq!(sim.time(), t);
        assert!(sim.time() >= last);
        last = sim.time();
    }
    assert!(sim.advance_to(last - 1.0).is_err());
    Ok(())
}

/// The frame driver walks the caller's discrete grid without skipping or
/// re-processing collisions.
#[test]
fn frame_driver_matches_direct_advance() -> spheresim::Result<()> {
    init_logging();
    let make = || -> spheresim::Result<Simulation> {
        let balls = vec![
            Ball::new([-2.0, 0.0, 0.0], [1.0, 0.0, 0.0], 1.0, 1.0)?,
            Ball::new([2.0, 0.0, 0.0], [-1.0, 0.0, 0.0], 1.0, 1.0)?,
        ];
        Simulation::new(balls, Container::new(10.0)?)
    };

    let framerate = 25.0;
    let mut by_frames = make()?;
    for _ in 0..50 {
        by_frames.next_frame(framerate)?;
    }
    let mut direct = make()?;
    direct.advance_to(2.0)?;

    assert_eq!(by_frames.time(), direct.time());
    let (a, b) = (by_frames.positions(), direct.positions());
    for (ra, rb) in a.iter().zip(b.iter()) {
        for k in 0..DIM {
            assert_relative_eq!(ra[k], rb[k], epsilon = 1e-9);
        }
    }
    Ok(())
}
