// src/motion/physics.rs
//! Peak acceleration derived from drive force and moving mass.
//!
//! Masses are in grams, force in newtons, acceleration in m/s². The
//! calculator works in these user units; conversion to the solver's
//! micrometre units happens in [`crate::units`].

use serde::{Deserialize, Serialize};

use crate::units::{MoveRequest, round_tenth};

/// Ratio between suggested jerk (m/s³) and derived acceleration (m/s²).
pub const SUGGESTED_JERK_FACTOR: f64 = 100.0;

/// Force and mass inputs of a drive plus payload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsInputs {
    /// Moving mass of the drive itself (g)
    pub motor_mass_g: f64,
    /// Additional payload carried by the drive (g)
    #[serde(default)]
    pub payload_mass_g: f64,
    /// Peak force the drive can deliver (N)
    pub max_force_n: f64,
}

impl Default for PhysicsInputs {
    fn default() -> Self {
        Self {
            motor_mass_g: 500.0,
            payload_mass_g: 0.0,
            max_force_n: 10.0,
        }
    }
}

impl PhysicsInputs {
    pub fn new(motor_mass_g: f64, payload_mass_g: f64, max_force_n: f64) -> Self {
        Self {
            motor_mass_g,
            payload_mass_g,
            max_force_n,
        }
    }

    /// Total moving mass in kilograms.
    pub fn total_mass_kg(&self) -> f64 {
        (self.motor_mass_g + self.payload_mass_g) / 1000.0
    }

    /// Peak achievable acceleration (m/s²), `f64::INFINITY` when unbounded.
    pub fn max_acceleration(&self) -> f64 {
        derive_max_acceleration(self.motor_mass_g, self.payload_mass_g, self.max_force_n)
    }

    /// Force needed to push the total mass at `acceleration_m_s2` (F = m·a).
    pub fn required_force(&self, acceleration_m_s2: f64) -> f64 {
        self.total_mass_kg() * acceleration_m_s2
    }

    /// Replaces the request's acceleration and jerk with the derived values.
    ///
    /// Acceleration is rounded to 0.1 m/s² and the jerk is set to
    /// [`suggested_jerk`] of that rounded value, again rounded to 0.1 m/s³.
    /// An unbounded derived acceleration leaves the request untouched.
    pub fn apply_to(&self, request: MoveRequest) -> MoveRequest {
        let accel = self.max_acceleration();
        if !accel.is_finite() {
            tracing::debug!("Derived acceleration is unbounded, keeping requested limits");
            return request;
        }
        let max_accel_m_s2 = round_tenth(accel);
        let max_jerk_m_s3 = round_tenth(suggested_jerk(max_accel_m_s2));
        tracing::debug!(
            "Applying derived limits: {:.1} m/s², {:.1} m/s³",
            max_accel_m_s2,
            max_jerk_m_s3
        );
        MoveRequest {
            max_accel_m_s2,
            max_jerk_m_s3,
            ..request
        }
    }
}

/// Derives the peak acceleration from masses (g) and force (N).
///
/// Returns `f64::INFINITY` if the total mass or the force is not positive,
/// meaning acceleration is not the binding constraint.
pub fn derive_max_acceleration(motor_mass_g: f64, payload_mass_g: f64, max_force_n: f64) -> f64 {
    let total_mass_kg = (motor_mass_g + payload_mass_g) / 1000.0;
    if !(total_mass_kg > 0.0) || !(max_force_n > 0.0) {
        return f64::INFINITY;
    }
    max_force_n / total_mass_kg
}

/// Advisory default jerk for an auto-derived acceleration.
pub fn suggested_jerk(acceleration: f64) -> f64 {
    SUGGESTED_JERK_FACTOR * acceleration
}
