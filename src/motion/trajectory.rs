// src/motion/trajectory.rs
//! Seven-phase state evaluator for a solved S-curve profile.
//!
//! The profile is split into an ordered table of [`PhaseSegment`]s. Each
//! segment carries its start time, duration, constant jerk and entry state.
//! Entry position and velocity are the integrated exit state of the previous
//! segment, so the curve is continuous across every boundary. Entry
//! acceleration follows the phase law, which only differs from the previous
//! exit when the jerk ramps have collapsed (trapezoidal profile).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::motion::s_curve::ProfileSolution;

/// Phase of a point-to-point move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    #[serde(rename = "Accel Jerk Up")]
    AccelJerkUp,
    #[serde(rename = "Constant Accel")]
    ConstantAccel,
    #[serde(rename = "Accel Jerk Down")]
    AccelJerkDown,
    #[serde(rename = "Constant Velocity")]
    ConstantVelocity,
    #[serde(rename = "Decel Jerk Up")]
    DecelJerkUp,
    #[serde(rename = "Constant Decel")]
    ConstantDecel,
    #[serde(rename = "Decel Jerk Down")]
    DecelJerkDown,
    /// Past the end of the move
    Arrived,
}

impl Phase {
    /// The seven motion phases in execution order.
    pub const SEQUENCE: [Phase; 7] = [
        Phase::AccelJerkUp,
        Phase::ConstantAccel,
        Phase::AccelJerkDown,
        Phase::ConstantVelocity,
        Phase::DecelJerkUp,
        Phase::ConstantDecel,
        Phase::DecelJerkDown,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Phase::AccelJerkUp => "Accel Jerk Up",
            Phase::ConstantAccel => "Constant Accel",
            Phase::AccelJerkDown => "Accel Jerk Down",
            Phase::ConstantVelocity => "Constant Velocity",
            Phase::DecelJerkUp => "Decel Jerk Up",
            Phase::ConstantDecel => "Constant Decel",
            Phase::DecelJerkDown => "Decel Jerk Down",
            Phase::Arrived => "Arrived",
        }
    }

    /// Sign of the jerk applied during this phase.
    fn jerk_sign(&self) -> f64 {
        match self {
            Phase::AccelJerkUp | Phase::DecelJerkDown => 1.0,
            Phase::AccelJerkDown | Phase::DecelJerkUp => -1.0,
            _ => 0.0,
        }
    }

    /// Acceleration at phase entry as a multiple of the peak acceleration.
    fn entry_accel_factor(&self) -> f64 {
        match self {
            Phase::ConstantAccel | Phase::AccelJerkDown => 1.0,
            Phase::ConstantDecel | Phase::DecelJerkDown => -1.0,
            _ => 0.0,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Kinematic state at a given instant.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MotionState {
    pub position: f64,
    pub velocity: f64,
    pub acceleration: f64,
}

impl MotionState {
    /// Integrates the state forward by `dt` under constant `jerk`.
    pub fn advance(&self, jerk: f64, dt: f64) -> MotionState {
        MotionState {
            position: self.position
                + self.velocity * dt
                + 0.5 * self.acceleration * dt * dt
                + jerk * dt * dt * dt / 6.0,
            velocity: self.velocity + self.acceleration * dt + 0.5 * jerk * dt * dt,
            acceleration: self.acceleration + jerk * dt,
        }
    }
}

/// One phase of the profile with its integration constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseSegment {
    pub phase: Phase,
    pub start: f64,
    pub duration: f64,
    pub jerk: f64,
    pub entry: MotionState,
}

impl PhaseSegment {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    pub fn is_empty(&self) -> bool {
        !(self.duration > 0.0)
    }

    /// State at the end of the segment.
    pub fn exit(&self) -> MotionState {
        self.entry.advance(self.jerk, self.duration)
    }

    fn state_at(&self, t: f64) -> MotionState {
        let dt = (t - self.start).clamp(0.0, self.duration);
        self.entry.advance(self.jerk, dt)
    }
}

/// Instantaneous kinematics along a profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub time: f64,
    pub position: f64,
    pub velocity: f64,
    pub acceleration: f64,
    pub jerk: f64,
    pub phase: Phase,
}

/// Precomputed phase table for a solved profile.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    segments: [PhaseSegment; 7],
    distance: f64,
    peak_velocity: f64,
    peak_acceleration: f64,
    total_time: f64,
}

impl Trajectory {
    pub fn new(solution: &ProfileSolution) -> Self {
        let jerk = if solution.trapezoidal { 0.0 } else { solution.jerk };
        let durations = solution.phase_durations();

        let mut start = 0.0;
        let mut previous = MotionState::default();
        let segments = std::array::from_fn(|i| {
            let phase = Phase::SEQUENCE[i];
            let segment = PhaseSegment {
                phase,
                start,
                duration: durations[i].max(0.0),
                jerk: phase.jerk_sign() * jerk,
                entry: MotionState {
                    acceleration: phase.entry_accel_factor() * solution.peak_acceleration,
                    ..previous
                },
            };
            start = segment.end();
            previous = segment.exit();
            segment
        });

        Self {
            segments,
            distance: solution.distance,
            peak_velocity: solution.peak_velocity,
            peak_acceleration: solution.peak_acceleration,
            total_time: solution.total_time,
        }
    }

    pub fn segments(&self) -> &[PhaseSegment; 7] {
        &self.segments
    }

    /// Cumulative phase end times `t1..t7`.
    pub fn boundaries(&self) -> [f64; 7] {
        std::array::from_fn(|i| self.segments[i].end())
    }

    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    fn active_segments(&self) -> impl Iterator<Item = &PhaseSegment> {
        self.segments.iter().filter(|s| !s.is_empty())
    }

    /// Kinematics at time `t` since the start of the move.
    pub fn evaluate(&self, t: f64) -> Sample {
        if t.is_nan() || t <= 0.0 {
            return self.at_rest(t);
        }
        if t > self.total_time {
            return self.arrived(t);
        }

        let Some(last) = self.active_segments().last() else {
            return self.arrived(t);
        };
        // Boundaries are running sums and may drift a few ulps from
        // `total_time`; the terminal instant always takes the exact exit.
        let (segment, state) = match self.active_segments().find(|s| t < s.end()) {
            Some(segment) if t < self.total_time => (segment, segment.state_at(t)),
            _ => (last, last.exit()),
        };

        Sample {
            time: t,
            position: state.position.clamp(0.0, self.distance),
            velocity: state.velocity.clamp(0.0, self.peak_velocity),
            acceleration: state
                .acceleration
                .clamp(-self.peak_acceleration, self.peak_acceleration),
            jerk: segment.jerk,
            phase: segment.phase,
        }
    }

    fn at_rest(&self, t: f64) -> Sample {
        let first = self.active_segments().next();
        Sample {
            time: t,
            position: 0.0,
            velocity: 0.0,
            acceleration: 0.0,
            jerk: first
                .filter(|s| s.phase == Phase::AccelJerkUp)
                .map_or(0.0, |s| s.jerk),
            phase: first.map_or(Phase::AccelJerkUp, |s| s.phase),
        }
    }

    fn arrived(&self, t: f64) -> Sample {
        Sample {
            time: t,
            position: self.distance,
            velocity: 0.0,
            acceleration: 0.0,
            jerk: 0.0,
            phase: Phase::Arrived,
        }
    }
}

/// Evaluates a solved profile at time `t`.
pub fn evaluate(t: f64, solution: &ProfileSolution) -> Sample {
    Trajectory::new(solution).evaluate(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::s_curve::{KinematicLimits, solve};
    use approx::assert_relative_eq;

    fn scurve() -> ProfileSolution {
        solve(&KinematicLimits::new(1_000_000.0, 2_000_000.0, 1e7, 1e8)).unwrap()
    }

    fn trapezoid() -> ProfileSolution {
        solve(&KinematicLimits::new(50_000.0, 100_000.0, 1e7, 0.0)).unwrap()
    }

    #[test]
    fn test_segments_are_continuous() {
        for solution in [scurve(), trapezoid()] {
            let trajectory = Trajectory::new(&solution);
            for pair in trajectory.segments().windows(2) {
                let exit = pair[0].exit();
                assert_eq!(pair[1].start, pair[0].end());
                assert_eq!(pair[1].entry.position, exit.position);
                assert_eq!(pair[1].entry.velocity, exit.velocity);
            }
        }
    }

    #[test]
    fn test_jerk_phase_ends_at_peak_acceleration() {
        let trajectory = Trajectory::new(&scurve());
        let first = trajectory.segments()[0];
        assert_eq!(first.phase, Phase::AccelJerkUp);
        assert_relative_eq!(first.exit().acceleration, 1e7, max_relative = 1e-12);
        let third = trajectory.segments()[2];
        assert!(third.exit().acceleration.abs() < 1e-3);
        assert_relative_eq!(third.exit().velocity, 2_000_000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_start_and_end_states() {
        for solution in [scurve(), trapezoid()] {
            let start = evaluate(0.0, &solution);
            assert_eq!(start.position, 0.0);
            assert_eq!(start.velocity, 0.0);
            assert_eq!(start.acceleration, 0.0);

            let end = evaluate(solution.total_time, &solution);
            assert_relative_eq!(end.position, solution.distance, max_relative = 1e-9);
            assert!(end.velocity < solution.peak_velocity * 1e-9);
        }
    }

    #[test]
    fn test_phase_dispatch() {
        let solution = scurve();
        let trajectory = Trajectory::new(&solution);
        let bounds = trajectory.boundaries();
        let mut previous_end = 0.0;
        for (i, end) in bounds.iter().enumerate() {
            let mid = 0.5 * (previous_end + end);
            assert_eq!(trajectory.evaluate(mid).phase, Phase::SEQUENCE[i]);
            previous_end = *end;
        }
        let cruise = trajectory.evaluate(0.5 * solution.total_time);
        assert_eq!(cruise.phase, Phase::ConstantVelocity);
        assert_eq!(cruise.acceleration, 0.0);
        assert_eq!(cruise.jerk, 0.0);
        assert_relative_eq!(cruise.velocity, solution.peak_velocity, max_relative = 1e-12);
    }

    #[test]
    fn test_trapezoid_skips_jerk_phases() {
        let solution = trapezoid();
        let trajectory = Trajectory::new(&solution);
        for i in 0..200 {
            let t = solution.total_time * i as f64 / 199.0;
            let sample = trajectory.evaluate(t);
            assert_ne!(sample.phase, Phase::AccelJerkUp);
            assert_ne!(sample.phase, Phase::AccelJerkDown);
            assert_ne!(sample.phase, Phase::DecelJerkUp);
            assert_ne!(sample.phase, Phase::DecelJerkDown);
            assert_eq!(sample.jerk, 0.0);
        }
        assert_eq!(trajectory.evaluate(0.001).acceleration, 1e7);
    }

    #[test]
    fn test_terminal_state_is_last_exit() {
        // Long cruises push the summed boundaries past `total_time`.
        for limits in [
            KinematicLimits::new(1.8e9, 1_000.0, 1e7, 0.0),
            KinematicLimits::new(1e12, 1e5, 1e7, 1e8),
        ] {
            let solution = solve(&limits).unwrap();
            let trajectory = Trajectory::new(&solution);
            let last = trajectory.segments().iter().rev().find(|s| !s.is_empty()).unwrap();
            let end = trajectory.evaluate(solution.total_time);
            assert_eq!(end.phase, last.phase);
            assert_eq!(end.velocity, last.exit().velocity.clamp(0.0, solution.peak_velocity));
            assert!(end.velocity <= solution.peak_velocity * 1e-9, "{:?}", end);
            if !solution.trapezoidal {
                assert!(end.acceleration.abs() <= solution.peak_acceleration * 1e-9, "{:?}", end);
            }
            assert_relative_eq!(end.position, solution.distance, max_relative = 1e-9);
        }
    }

    #[test]
    fn test_arrived_after_end() {
        let solution = scurve();
        let sample = evaluate(solution.total_time + 1.0, &solution);
        assert_eq!(sample.phase, Phase::Arrived);
        assert_eq!(sample.position, solution.distance);
        assert_eq!(sample.velocity, 0.0);
        assert_eq!(sample.acceleration, 0.0);
        assert_eq!(sample.jerk, 0.0);
    }

    #[test]
    fn test_phase_labels() {
        assert_eq!(Phase::AccelJerkUp.to_string(), "Accel Jerk Up");
        assert_eq!(Phase::Arrived.label(), "Arrived");
        assert_eq!(
            serde_json::to_string(&Phase::ConstantDecel).unwrap(),
            "\"Constant Decel\""
        );
    }
}
