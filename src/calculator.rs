// src/calculator.rs
//! One complete calculation for a single move.
//!
//! Order of operations:
//! 1. a selected drive supplies moving mass and force and, if asked to,
//!    clamps distance and speed to its stroke and speed limit;
//! 2. optionally, acceleration and jerk are replaced by the values derived
//!    from force and mass;
//! 3. the request is converted to µm units and solved;
//! 4. the solution is sampled and, with a drive, checked against its limits.

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::CalcError;
use crate::motion::physics::PhysicsInputs;
use crate::motion::s_curve::{ProfileSolution, SCurveError, solve};
use crate::motion::sampler::{ProfileSummary, sample_profile};
use crate::motion::trajectory::Sample;
use crate::units::{MoveRequest, um_to_m, um_to_mm};
use crate::validation::{Check, DriveLimits, validate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationInput {
    pub request: MoveRequest,
    pub physics: PhysicsInputs,
    pub derive_acceleration: bool,
    pub drive: Option<DriveLimits>,
    /// Pull distance and speed inside the drive limits before solving
    pub clamp_to_drive: bool,
    pub point_count: usize,
}

impl CalculationInput {
    /// Input built from the `[defaults]` and `[sampling]` sections.
    pub fn from_config(config: &Config) -> Self {
        Self {
            request: config.defaults.request(),
            physics: config.defaults.physics(),
            derive_acceleration: config.defaults.derive_acceleration,
            drive: None,
            clamp_to_drive: false,
            point_count: config.sampling.point_count,
        }
    }
}

/// Caller-supplied values layered over the configured defaults.
///
/// Shared by the command line and the HTTP API; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestOverrides {
    pub distance_mm: Option<f64>,
    pub max_speed_mm_s: Option<f64>,
    pub max_accel_m_s2: Option<f64>,
    pub max_jerk_m_s3: Option<f64>,
    pub motor_mass_g: Option<f64>,
    pub payload_mass_g: Option<f64>,
    pub max_force_n: Option<f64>,
    pub derive_acceleration: Option<bool>,
    pub drive: Option<String>,
    pub clamp_to_drive: Option<bool>,
    pub point_count: Option<usize>,
}

impl RequestOverrides {
    /// Resolves the overrides against `config`.
    ///
    /// Fails with [`CalcError::UnknownDrive`] if the named drive is not
    /// configured. The point count is capped at `sampling.max_point_count`.
    pub fn resolve(&self, config: &Config) -> Result<CalculationInput, CalcError> {
        let mut input = CalculationInput::from_config(config);
        let request = &mut input.request;
        request.distance_mm = self.distance_mm.unwrap_or(request.distance_mm);
        request.max_speed_mm_s = self.max_speed_mm_s.unwrap_or(request.max_speed_mm_s);
        request.max_accel_m_s2 = self.max_accel_m_s2.unwrap_or(request.max_accel_m_s2);
        request.max_jerk_m_s3 = self.max_jerk_m_s3.unwrap_or(request.max_jerk_m_s3);

        let physics = &mut input.physics;
        physics.motor_mass_g = self.motor_mass_g.unwrap_or(physics.motor_mass_g);
        physics.payload_mass_g = self.payload_mass_g.unwrap_or(physics.payload_mass_g);
        physics.max_force_n = self.max_force_n.unwrap_or(physics.max_force_n);

        // Explicit acceleration or jerk means the caller does not want them derived.
        let manual = self.max_accel_m_s2.is_some() || self.max_jerk_m_s3.is_some();
        input.derive_acceleration = self
            .derive_acceleration
            .unwrap_or(input.derive_acceleration && !manual);

        if let Some(name) = &self.drive {
            let drive = config
                .drive(name)
                .ok_or_else(|| CalcError::UnknownDrive(name.clone()))?;
            input.drive = Some(drive.clone());
            input.clamp_to_drive = self.clamp_to_drive.unwrap_or(true);
        }

        input.point_count = self
            .point_count
            .unwrap_or(input.point_count)
            .min(config.sampling.max_point_count);
        Ok(input)
    }
}

/// How the solved profile differs from what was asked for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Adjustments {
    pub velocity_limited: bool,
    pub jerk_min_limited: bool,
    pub trapezoidal: bool,
    pub requested_speed_mm_s: f64,
    pub actual_speed_mm_s: f64,
    pub requested_jerk_m_s3: f64,
    pub actual_jerk_m_s3: f64,
}

impl Adjustments {
    fn new(request: &MoveRequest, solution: &ProfileSolution) -> Self {
        Self {
            velocity_limited: solution.velocity_limited,
            jerk_min_limited: solution.jerk_min_limited,
            trapezoidal: solution.trapezoidal,
            requested_speed_mm_s: request.max_speed_mm_s,
            actual_speed_mm_s: um_to_mm(solution.peak_velocity),
            requested_jerk_m_s3: request.max_jerk_m_s3,
            actual_jerk_m_s3: um_to_m(solution.jerk),
        }
    }

    pub fn any(&self) -> bool {
        self.velocity_limited || self.jerk_min_limited || self.trapezoidal
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationReport {
    /// Request after drive clamping and acceleration derivation
    pub request: MoveRequest,
    pub physics: PhysicsInputs,
    /// Acceleration the drive can deliver (m/s²), absent when unbounded
    pub derived_acceleration_m_s2: Option<f64>,
    pub drive: Option<String>,
    pub solution: ProfileSolution,
    pub adjustments: Adjustments,
    pub summary: ProfileSummary,
    pub samples: Vec<Sample>,
    #[serde(default)]
    pub checks: Vec<Check>,
}

impl CalculationReport {
    pub fn has_failures(&self) -> bool {
        crate::validation::has_failures(&self.checks)
    }
}

pub fn calculate(input: &CalculationInput) -> Result<CalculationReport, SCurveError> {
    let mut request = input.request;
    let mut physics = input.physics;

    if let Some(drive) = &input.drive {
        physics = drive.physics(input.physics.payload_mass_g);
        if input.clamp_to_drive {
            request = drive.clamp_request(request);
        }
    }

    let derived = physics.max_acceleration();
    if input.derive_acceleration {
        request = physics.apply_to(request);
    }

    tracing::debug!("Calculating profile for {:?}", request);
    let solution = solve(&request.to_limits())?;
    let sampled = sample_profile(&solution, input.point_count);
    let checks = input
        .drive
        .as_ref()
        .map(|drive| validate(drive, &request, &physics))
        .unwrap_or_default();

    Ok(CalculationReport {
        request,
        physics,
        derived_acceleration_m_s2: derived.is_finite().then_some(derived),
        drive: input.drive.as_ref().map(|d| d.name.clone()),
        solution,
        adjustments: Adjustments::new(&request, &solution),
        summary: sampled.summary,
        samples: sampled.samples,
        checks,
    })
}
