// Integration tests for the profile solver, evaluator and sampler

use approx::assert_relative_eq;
use scurve_calc::motion::{DEFAULT_POINT_COUNT, Trajectory, sample_profile};
use scurve_calc::{
    KinematicLimits, MoveRequest, Phase, PhysicsInputs, SCurveError, evaluate, sample, solve,
};

fn limit_grid() -> Vec<KinematicLimits> {
    let mut grid = Vec::new();
    for distance in [1.0, 100.0, 100_000.0, 1_000_000.0, 1_800_000_000.0] {
        for velocity in [1_000.0, 1_000_000.0, 1_000_000_000.0] {
            for acceleration in [100_000.0, 10_000_000.0, 1_000_000_000.0] {
                for jerk in [0.0, 1e6, 1e8, 1e11, 1e15] {
                    grid.push(KinematicLimits::new(distance, velocity, acceleration, jerk));
                }
            }
        }
    }
    grid
}

#[test]
fn test_scenario_short_move() {
    let limits = KinematicLimits::new(100_000.0, 1_000_000.0, 10_000_000.0, 100_000_000.0);
    let solution = solve(&limits).unwrap();
    assert!(!solution.trapezoidal);
    assert!(solution.peak_velocity < 1_000_000.0);
}

#[test]
fn test_scenario_one_micrometre_without_jerk() {
    let limits = KinematicLimits::new(1.0, 1_000_000_000.0, 10_000_000.0, 0.0);
    let solution = solve(&limits).unwrap();
    assert!(solution.trapezoidal);
    assert_eq!(solution.t_jerk, 0.0);
    let end = evaluate(solution.total_time, &solution);
    assert_relative_eq!(end.position, 1.0, max_relative = 1e-9);
}

#[test]
fn test_scenario_zero_distance_rejected() {
    let limits = KinematicLimits::new(0.0, 1_000_000.0, 10_000_000.0, 100_000_000.0);
    assert!(matches!(solve(&limits), Err(SCurveError::InvalidInput(_))));
}

#[test]
fn test_scenario_derived_acceleration_feeds_solver() {
    let physics = PhysicsInputs::new(500.0, 0.0, 10.0);
    assert_eq!(physics.max_acceleration(), 20.0);

    let request = physics.apply_to(MoveRequest::default());
    assert_eq!(request.max_accel_m_s2, 20.0);
    let solution = solve(&request.to_limits()).unwrap();
    assert_eq!(solution.peak_acceleration, 20_000_000.0);
    assert!(solution.total_time > 0.0);
}

#[test]
fn test_solutions_are_consistent_across_limits() {
    for limits in limit_grid() {
        let solution = solve(&limits).unwrap_or_else(|e| panic!("{:?}: {}", limits, e));
        let durations = solution.phase_durations();

        assert!(solution.total_time.is_finite() && solution.total_time > 0.0, "{:?}", limits);
        assert!(durations.iter().all(|d| *d >= 0.0), "{:?}: {:?}", limits, durations);
        assert_relative_eq!(
            durations.iter().sum::<f64>(),
            solution.total_time,
            max_relative = 1e-9
        );
        assert!(
            solution.peak_velocity <= limits.max_velocity * (1.0 + 1e-12),
            "{:?}: peak {}",
            limits,
            solution.peak_velocity
        );
        // Jerk is only ever raised.
        assert!(solution.jerk >= limits.max_jerk, "{:?}", limits);
        assert_eq!(solution.t_jerk == 0.0, solution.trapezoidal, "{:?}", limits);
    }
}

#[test]
fn test_profiles_start_and_end_at_rest() {
    for limits in limit_grid() {
        let solution = solve(&limits).unwrap();
        let start = evaluate(0.0, &solution);
        assert_eq!(start.position, 0.0);
        assert_eq!(start.velocity, 0.0);

        let end = evaluate(solution.total_time, &solution);
        assert_relative_eq!(end.position, limits.distance, max_relative = 1e-6);
        assert!(end.velocity <= solution.peak_velocity * 1e-6, "{:?}: {:?}", limits, end);
        if !solution.trapezoidal {
            assert!(
                end.acceleration.abs() <= solution.peak_acceleration * 1e-9,
                "{:?}: {:?}",
                limits,
                end
            );
        }
        assert_ne!(end.phase, Phase::Arrived);

        let after = evaluate(solution.total_time * 1.5, &solution);
        assert_eq!(after.phase, Phase::Arrived);
        assert_eq!(after.position, limits.distance);
    }
}

#[test]
fn test_sampled_positions_never_decrease() {
    for limits in limit_grid() {
        let solution = solve(&limits).unwrap();
        let samples = sample(&solution, 300);
        assert_eq!(samples.len(), 301);
        let slack = limits.distance * 1e-9;
        for pair in samples.windows(2) {
            assert!(pair[1].time >= pair[0].time);
            assert!(
                pair[1].position >= pair[0].position - slack,
                "{:?}: {:?} then {:?}",
                limits,
                pair[0],
                pair[1]
            );
            assert!(pair[1].velocity >= 0.0 && pair[1].velocity <= solution.peak_velocity);
            assert!(pair[1].acceleration.abs() <= solution.peak_acceleration);
        }
    }
}

#[test]
fn test_phases_follow_boundaries() {
    let solution = solve(&KinematicLimits::new(1_000_000.0, 2_000_000.0, 1e7, 1e8)).unwrap();
    let trajectory = Trajectory::new(&solution);
    let boundaries = trajectory.boundaries();
    let mut start = 0.0;
    for (phase, end) in Phase::SEQUENCE.iter().zip(boundaries) {
        let mid = 0.5 * (start + end);
        assert_eq!(trajectory.evaluate(mid).phase, *phase);
        start = end;
    }
    assert_relative_eq!(boundaries[6], solution.total_time, max_relative = 1e-12);
}

#[test]
fn test_velocity_continuous_across_boundaries() {
    let solution = solve(&KinematicLimits::new(1_000_000.0, 2_000_000.0, 1e7, 1e8)).unwrap();
    let trajectory = Trajectory::new(&solution);
    let eps = solution.total_time * 1e-9;
    for boundary in &trajectory.boundaries()[..6] {
        let before = trajectory.evaluate(boundary - eps);
        let after = trajectory.evaluate(boundary + eps);
        assert!((after.velocity - before.velocity).abs() <= solution.peak_velocity * 1e-6);
        assert!((after.position - before.position).abs() <= solution.distance * 1e-6);
    }
}

#[test]
fn test_sample_profile_summary_matches_solution() {
    let request = MoveRequest {
        distance_mm: 500.0,
        max_speed_mm_s: 800.0,
        max_accel_m_s2: 15.0,
        max_jerk_m_s3: 1500.0,
    };
    let solution = solve(&request.to_limits()).unwrap();
    assert!(solution.velocity_limited);
    let profile = sample_profile(&solution, DEFAULT_POINT_COUNT);
    assert_eq!(profile.samples.len(), DEFAULT_POINT_COUNT + 1);
    // The cruise phase is sampled, so the cap is hit exactly.
    assert_relative_eq!(profile.summary.max_velocity_reached, 800_000.0, max_relative = 1e-9);
    assert_relative_eq!(profile.summary.final_position, 500_000.0, max_relative = 1e-9);
}
