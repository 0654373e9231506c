// src/units.rs
//! User-facing move requests and unit conversion.
//!
//! Requests are entered in mm, mm/s, m/s² and m/s³. The solver works in
//! micrometres (µm, µm/s, µm/s², µm/s³) to keep small moves away from
//! floating-point trouble.

use serde::{Deserialize, Serialize};

use crate::motion::s_curve::KinematicLimits;

pub const UM_PER_MM: f64 = 1_000.0;
pub const UM_PER_M: f64 = 1_000_000.0;

/// A single point-to-point move as entered by the user.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoveRequest {
    /// Travel distance (mm)
    pub distance_mm: f64,
    /// Maximum speed (mm/s)
    pub max_speed_mm_s: f64,
    /// Maximum acceleration (m/s²)
    pub max_accel_m_s2: f64,
    /// Maximum jerk (m/s³), 0 for a trapezoidal profile
    #[serde(default)]
    pub max_jerk_m_s3: f64,
}

impl Default for MoveRequest {
    fn default() -> Self {
        Self {
            distance_mm: 100.0,
            max_speed_mm_s: 1000.0,
            max_accel_m_s2: 10.0,
            max_jerk_m_s3: 100.0,
        }
    }
}

impl MoveRequest {
    /// Converts to solver limits in micrometre units.
    pub fn to_limits(&self) -> KinematicLimits {
        KinematicLimits {
            distance: mm_to_um(self.distance_mm),
            max_velocity: mm_to_um(self.max_speed_mm_s),
            max_acceleration: m_to_um(self.max_accel_m_s2),
            max_jerk: m_to_um(self.max_jerk_m_s3),
        }
    }
}

pub fn mm_to_um(value: f64) -> f64 {
    value * UM_PER_MM
}

pub fn um_to_mm(value: f64) -> f64 {
    value / UM_PER_MM
}

pub fn m_to_um(value: f64) -> f64 {
    value * UM_PER_M
}

pub fn um_to_m(value: f64) -> f64 {
    value / UM_PER_M
}

/// Rounds to one decimal place.
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
