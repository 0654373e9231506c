// src/validation.rs
//! Checks a move request against the declared limits of a drive.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::motion::physics::PhysicsInputs;
use crate::units::MoveRequest;

/// Relative slack on the force limit so that a request sitting exactly on
/// the limit is not rejected by rounding.
pub const FORCE_TOLERANCE: f64 = 0.001;

/// Declared limits of a linear drive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriveLimits {
    pub name: String,
    /// Usable stroke (mm)
    pub max_stroke_mm: f64,
    /// Speed limit (mm/s)
    pub max_speed_mm_s: f64,
    /// Peak force (N)
    pub max_force_n: f64,
    /// Mass of the moving part of the drive (g)
    pub moving_mass_g: f64,
}

impl DriveLimits {
    /// Physics inputs of this drive carrying `payload_mass_g`.
    pub fn physics(&self, payload_mass_g: f64) -> PhysicsInputs {
        PhysicsInputs::new(self.moving_mass_g, payload_mass_g, self.max_force_n)
    }

    /// Pulls distance and speed back inside the drive's stroke and speed.
    pub fn clamp_request(&self, request: MoveRequest) -> MoveRequest {
        let mut clamped = request;
        if request.distance_mm > self.max_stroke_mm {
            tracing::info!(
                "Distance {}mm exceeds stroke of {}, clamped to {}mm",
                request.distance_mm,
                self.name,
                self.max_stroke_mm
            );
            clamped.distance_mm = self.max_stroke_mm;
        }
        if request.max_speed_mm_s > self.max_speed_mm_s {
            tracing::info!(
                "Speed {}mm/s exceeds limit of {}, clamped to {}mm/s",
                request.max_speed_mm_s,
                self.name,
                self.max_speed_mm_s
            );
            clamped.max_speed_mm_s = self.max_speed_mm_s;
        }
        clamped
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckParameter {
    Distance,
    Speed,
    Force,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Fail,
}

/// Outcome of one limit check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Check {
    pub parameter: CheckParameter,
    pub status: CheckStatus,
    pub message: String,
    /// Force usage in percent, only reported by a passing force check
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utilization: Option<f64>,
}

impl Check {
    fn pass(parameter: CheckParameter, message: impl Into<String>) -> Self {
        Self {
            parameter,
            status: CheckStatus::Pass,
            message: message.into(),
            utilization: None,
        }
    }

    fn fail(parameter: CheckParameter, message: impl Into<String>) -> Self {
        Self {
            parameter,
            status: CheckStatus::Fail,
            message: message.into(),
            utilization: None,
        }
    }

    pub fn passed(&self) -> bool {
        self.status == CheckStatus::Pass
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "FAIL",
        };
        write!(f, "[{}] {}", status, self.message)
    }
}

/// Runs the stroke, speed and force checks for `request` on `drive`.
///
/// The force check uses the total mass from `physics` and the requested
/// acceleration (F = m·a).
pub fn validate(drive: &DriveLimits, request: &MoveRequest, physics: &PhysicsInputs) -> Vec<Check> {
    let mut checks = Vec::with_capacity(3);

    if request.distance_mm > drive.max_stroke_mm {
        checks.push(Check::fail(
            CheckParameter::Distance,
            format!(
                "stroke exceeds drive limit ({}mm > {}mm)",
                request.distance_mm, drive.max_stroke_mm
            ),
        ));
    } else {
        checks.push(Check::pass(CheckParameter::Distance, "stroke within drive limit"));
    }

    if request.max_speed_mm_s > drive.max_speed_mm_s {
        checks.push(Check::fail(
            CheckParameter::Speed,
            format!(
                "speed exceeds drive limit ({}mm/s > {}mm/s)",
                request.max_speed_mm_s, drive.max_speed_mm_s
            ),
        ));
    } else {
        checks.push(Check::pass(CheckParameter::Speed, "speed within drive limit"));
    }

    let required_force = physics.required_force(request.max_accel_m_s2);
    if required_force > drive.max_force_n * (1.0 + FORCE_TOLERANCE) {
        checks.push(Check::fail(
            CheckParameter::Force,
            format!(
                "force exceeds drive limit ({:.1}N > {}N)",
                required_force, drive.max_force_n
            ),
        ));
    } else {
        let utilization = (required_force / drive.max_force_n * 100.0).round();
        let mut check = Check::pass(CheckParameter::Force, format!("force usage {}%", utilization));
        check.utilization = Some(utilization);
        checks.push(check);
    }

    let failures = checks.iter().filter(|c| !c.passed()).count();
    if failures > 0 {
        tracing::warn!("{} of {} limit checks failed for {}", failures, checks.len(), drive.name);
    }
    checks
}

pub fn has_failures(checks: &[Check]) -> bool {
    checks.iter().any(|c| !c.passed())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn short_drive() -> DriveLimits {
        DriveLimits {
            name: "short".to_string(),
            max_stroke_mm: 46.0,
            max_force_n: 9.0,
            max_speed_mm_s: 1800.0,
            moving_mass_g: 450.0,
        }
    }

    fn request(distance_mm: f64, speed: f64, accel: f64) -> MoveRequest {
        MoveRequest {
            distance_mm,
            max_speed_mm_s: speed,
            max_accel_m_s2: accel,
            max_jerk_m_s3: 100.0 * accel,
        }
    }

    #[test]
    fn test_all_checks_pass() {
        let drive = short_drive();
        let checks = validate(&drive, &request(40.0, 1000.0, 10.0), &drive.physics(0.0));
        assert_eq!(checks.len(), 3);
        assert!(!has_failures(&checks));
        // 0.45 kg at 10 m/s² is 4.5 N of 9 N
        assert_eq!(checks[2].utilization, Some(50.0));
        assert_eq!(checks[2].message, "force usage 50%");
    }

    #[test]
    fn test_stroke_and_speed_failures() {
        let drive = short_drive();
        let checks = validate(&drive, &request(100.0, 2000.0, 1.0), &drive.physics(0.0));
        assert_eq!(checks[0].parameter, CheckParameter::Distance);
        assert_eq!(checks[0].status, CheckStatus::Fail);
        assert_eq!(checks[0].message, "stroke exceeds drive limit (100mm > 46mm)");
        assert_eq!(checks[1].status, CheckStatus::Fail);
        assert!(checks[2].passed());
    }

    #[test]
    fn test_force_failure() {
        let drive = short_drive();
        let checks = validate(&drive, &request(10.0, 100.0, 30.0), &drive.physics(100.0));
        let force = &checks[2];
        assert_eq!(force.parameter, CheckParameter::Force);
        assert!(!force.passed());
        assert_eq!(force.utilization, None);
        assert_eq!(force.message, "force exceeds drive limit (16.5N > 9N)");
    }

    #[test]
    fn test_force_tolerance_at_limit() {
        let drive = short_drive();
        // 0.45 kg at 20 m/s² is exactly 9 N; 20.01 m/s² is within 0.1%
        let at_limit = validate(&drive, &request(10.0, 100.0, 20.0), &drive.physics(0.0));
        assert!(at_limit[2].passed());
        let within = validate(&drive, &request(10.0, 100.0, 20.01), &drive.physics(0.0));
        assert!(within[2].passed());
        let over = validate(&drive, &request(10.0, 100.0, 20.1), &drive.physics(0.0));
        assert!(!over[2].passed());
    }

    #[test]
    fn test_clamp_request() {
        let drive = short_drive();
        let clamped = drive.clamp_request(request(100.0, 5000.0, 10.0));
        assert_eq!(clamped.distance_mm, 46.0);
        assert_eq!(clamped.max_speed_mm_s, 1800.0);
        assert_eq!(clamped.max_accel_m_s2, 10.0);

        let untouched = request(10.0, 100.0, 10.0);
        assert_eq!(drive.clamp_request(untouched), untouched);
    }
}
