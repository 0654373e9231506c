// src/motion/s_curve.rs
/// S-curve motion profile solver
///
/// Computes the closed-form parameters of a symmetric, jerk-limited
/// point-to-point move that starts and ends at rest. A jerk of zero (or
/// anything at or above [`JERK_TRAPEZOIDAL`]) collapses the jerk ramps and
/// yields a classic trapezoidal profile.
///
/// All quantities are in consistent units; the calculator uses µm, µm/s,
/// µm/s² and µm/s³.
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Jerk treated as infinite. Requests with a non-positive jerk use this value.
pub const JERK_TRAPEZOIDAL: f64 = 2_100_000_000.0 * 1000.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SCurveError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Input to a single solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KinematicLimits {
    /// Travel distance
    pub distance: f64,

    /// Velocity cap
    pub max_velocity: f64,

    /// Acceleration cap, always reached by the solved profile
    pub max_acceleration: f64,

    /// Jerk cap, 0 meaning unconstrained
    #[serde(default)]
    pub max_jerk: f64,
}

impl KinematicLimits {
    pub fn new(distance: f64, max_velocity: f64, max_acceleration: f64, max_jerk: f64) -> Self {
        Self {
            distance,
            max_velocity,
            max_acceleration,
            max_jerk,
        }
    }

    pub fn validate(&self) -> Result<(), SCurveError> {
        require_positive("distance", self.distance)?;
        require_positive("max_velocity", self.max_velocity)?;
        require_positive("max_acceleration", self.max_acceleration)?;
        Ok(())
    }

    /// Jerk the solver starts from, with the trapezoidal sentinel substituted.
    pub fn effective_jerk(&self) -> f64 {
        if self.max_jerk > 0.0 && self.max_jerk.is_finite() {
            self.max_jerk
        } else {
            JERK_TRAPEZOIDAL
        }
    }

    pub fn solve(&self) -> Result<ProfileSolution, SCurveError> {
        solve(self)
    }
}

fn require_positive(name: &str, value: f64) -> Result<(), SCurveError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(SCurveError::InvalidInput(format!(
            "{} must be a positive finite number, got {}",
            name, value
        )))
    }
}

/// Solved profile parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileSolution {
    /// Duration of each jerk ramp
    pub t_jerk: f64,

    /// Duration of the constant acceleration plateau
    pub t_const_accel: f64,

    /// Time from rest to peak velocity
    pub t_half: f64,

    /// Duration of the cruise phase
    pub t_const_velocity: f64,

    /// Duration of the whole move
    pub total_time: f64,

    pub peak_velocity: f64,
    pub peak_acceleration: f64,

    /// Jerk actually used, may be above the requested value
    pub jerk: f64,

    /// Constant acceleration reaching peak velocity in `t_half`
    pub average_acceleration: f64,

    pub distance: f64,

    /// Peak velocity capped by the requested maximum velocity
    pub velocity_limited: bool,

    /// Requested jerk was raised to reach peak velocity
    pub jerk_min_limited: bool,

    /// Jerk ramps collapsed, velocity follows a trapezoid
    pub trapezoidal: bool,
}

impl ProfileSolution {
    /// Durations of the seven phases in order. Zero-length phases included.
    pub fn phase_durations(&self) -> [f64; 7] {
        [
            self.t_jerk,
            self.t_const_accel,
            self.t_jerk,
            self.t_const_velocity,
            self.t_jerk,
            self.t_const_accel,
            self.t_jerk,
        ]
    }

    /// Distance covered while accelerating to peak velocity.
    pub fn accel_distance(&self) -> f64 {
        accel_distance(self.peak_velocity, self.average_acceleration)
    }
}

/// Solves a point-to-point move.
///
/// Fails only when distance, velocity or acceleration is not positive.
pub fn solve(limits: &KinematicLimits) -> Result<ProfileSolution, SCurveError> {
    limits.validate()?;

    let distance = limits.distance;
    let a = limits.max_acceleration;
    let requested_jerk = limits.effective_jerk();

    let candidate = peak_velocity_candidate(distance, a, requested_jerk);
    let mut velocity_limited = candidate > limits.max_velocity;
    let mut peak_velocity = if velocity_limited {
        limits.max_velocity
    } else {
        candidate
    };

    // A jerk below a²/v cannot reach full acceleration before peak velocity.
    let jerk_required = a * a / peak_velocity;
    let jerk_min_limited = requested_jerk < jerk_required;
    let jerk = if jerk_min_limited {
        jerk_required
    } else {
        requested_jerk
    };
    let trapezoidal = jerk >= JERK_TRAPEZOIDAL;
    let t_jerk = if trapezoidal { 0.0 } else { a / jerk };

    let (mut t_const_accel, mut t_half) = accel_times(peak_velocity, a, t_jerk);
    let mut average_acceleration = peak_velocity / t_half;
    let mut t_const_velocity =
        (distance - 2.0 * accel_distance(peak_velocity, average_acceleration)) / peak_velocity;

    if t_const_velocity < 0.0 {
        // Acceleration and deceleration alone overshoot the distance. Fit the
        // peak so that both together cover it exactly and drop the cruise.
        let overshoot = -t_const_velocity * peak_velocity;
        let refit = 0.5 * a * (-t_jerk + (t_jerk * t_jerk + 4.0 * distance / a).sqrt());
        peak_velocity = refit;
        if overshoot > distance * 1e-9 {
            tracing::warn!(
                "Profile overshoots distance {} by {:.6}, peak velocity refit to {:.3}",
                distance,
                overshoot,
                peak_velocity
            );
        }
        velocity_limited = velocity_limited && peak_velocity >= limits.max_velocity;
        (t_const_accel, t_half) = accel_times(peak_velocity, a, t_jerk);
        average_acceleration = peak_velocity / t_half;
        t_const_velocity = 0.0;
    }

    let total_time = 2.0 * t_half + t_const_velocity;

    tracing::debug!(
        "Solved move: d={} v={:.3} j={:.3} t={:.6} (velocity_limited={}, jerk_min_limited={}, trapezoidal={})",
        distance,
        peak_velocity,
        jerk,
        total_time,
        velocity_limited,
        jerk_min_limited,
        trapezoidal
    );

    Ok(ProfileSolution {
        t_jerk,
        t_const_accel,
        t_half,
        t_const_velocity,
        total_time,
        peak_velocity,
        peak_acceleration: a,
        jerk,
        average_acceleration,
        distance,
        velocity_limited,
        jerk_min_limited,
        trapezoidal,
    })
}

/// Peak velocity reachable over `distance` before the velocity cap applies.
fn peak_velocity_candidate(distance: f64, a: f64, jerk: f64) -> f64 {
    // Below this distance the acceleration plateau is never reached.
    let d_threshold = 2.0 * a.powi(3) / (jerk * jerk);
    if distance <= d_threshold {
        return (jerk * distance * distance / 4.0).cbrt();
    }

    let qa = a;
    let qb = a * a / jerk;
    let qc = d_threshold - distance;
    let discriminant = qb * qb - 4.0 * qa * qc;
    let t_plateau = if discriminant >= 0.0 {
        (-qb + discriminant.sqrt()) / (2.0 * qa)
    } else {
        0.0
    };
    a * t_plateau + a * a / jerk
}

/// Plateau time and time to peak velocity for one acceleration half.
fn accel_times(peak_velocity: f64, a: f64, t_jerk: f64) -> (f64, f64) {
    let v_plateau = (peak_velocity - a * t_jerk).max(0.0);
    let t_const_accel = v_plateau / a;
    (t_const_accel, t_const_accel + 2.0 * t_jerk)
}

fn accel_distance(peak_velocity: f64, average_acceleration: f64) -> f64 {
    0.5 * peak_velocity * peak_velocity / average_acceleration
}
