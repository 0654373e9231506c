//! # Calculator Configuration
//!
//! Defaults for the move request, sampling resolution, the HTTP bind address
//! and the list of known drives.
//!
//! ## Example: TOML Configuration
//!
//! ```toml
//! [defaults]
//! distance_mm = 100.0
//! max_speed_mm_s = 1000.0
//! max_accel_m_s2 = 10.0
//! max_jerk_m_s3 = 100.0
//! motor_mass_g = 500.0
//! max_force_n = 10.0
//! derive_acceleration = true
//!
//! [sampling]
//! point_count = 200
//!
//! [server]
//! bind = "127.0.0.1:3000"
//!
//! [[drives]]
//! name = "flatTRACK"
//! max_stroke_mm = 1800.0
//! max_force_n = 100.0
//! max_speed_mm_s = 2000.0
//! moving_mass_g = 600.0
//! ```
//!
//! Every section is optional; missing values fall back to the defaults below.

// src/config.rs - Single configuration file
use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::motion::physics::PhysicsInputs;
use crate::units::MoveRequest;
use crate::validation::DriveLimits;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub sampling: SamplingConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub drives: Vec<DriveLimits>,
}

/// Request values used when the caller leaves them out.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_distance_mm")]
    pub distance_mm: f64,
    #[serde(default = "default_max_speed_mm_s")]
    pub max_speed_mm_s: f64,
    #[serde(default = "default_max_accel_m_s2")]
    pub max_accel_m_s2: f64,
    #[serde(default = "default_max_jerk_m_s3")]
    pub max_jerk_m_s3: f64,
    #[serde(default = "default_motor_mass_g")]
    pub motor_mass_g: f64,
    #[serde(default)]
    pub payload_mass_g: f64,
    #[serde(default = "default_max_force_n")]
    pub max_force_n: f64,
    /// Replace acceleration and jerk with values derived from force and mass
    #[serde(default = "default_derive_acceleration")]
    pub derive_acceleration: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            distance_mm: default_distance_mm(),
            max_speed_mm_s: default_max_speed_mm_s(),
            max_accel_m_s2: default_max_accel_m_s2(),
            max_jerk_m_s3: default_max_jerk_m_s3(),
            motor_mass_g: default_motor_mass_g(),
            payload_mass_g: 0.0,
            max_force_n: default_max_force_n(),
            derive_acceleration: default_derive_acceleration(),
        }
    }
}

impl DefaultsConfig {
    pub fn request(&self) -> MoveRequest {
        MoveRequest {
            distance_mm: self.distance_mm,
            max_speed_mm_s: self.max_speed_mm_s,
            max_accel_m_s2: self.max_accel_m_s2,
            max_jerk_m_s3: self.max_jerk_m_s3,
        }
    }

    pub fn physics(&self) -> PhysicsInputs {
        PhysicsInputs::new(self.motor_mass_g, self.payload_mass_g, self.max_force_n)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SamplingConfig {
    #[serde(default = "default_point_count")]
    pub point_count: usize,
    /// Upper bound for point counts requested over HTTP
    #[serde(default = "default_max_point_count")]
    pub max_point_count: usize,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            point_count: default_point_count(),
            max_point_count: default_max_point_count(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

impl Config {
    /// Looks up a drive by name, ignoring case.
    pub fn drive(&self, name: &str) -> Option<&DriveLimits> {
        self.drives.iter().find(|d| d.name.eq_ignore_ascii_case(name))
    }

    /// Validate value ranges and drive names.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sampling.point_count < 2 {
            return Err(ConfigError::Invalid(
                "sampling.point_count must be at least 2".to_string(),
            ));
        }
        if self.sampling.max_point_count < self.sampling.point_count {
            return Err(ConfigError::Invalid(
                "sampling.max_point_count must not be below sampling.point_count".to_string(),
            ));
        }
        let mut names = HashSet::new();
        for drive in &self.drives {
            if drive.name.trim().is_empty() {
                return Err(ConfigError::Invalid("Drive name must not be empty".to_string()));
            }
            if !names.insert(drive.name.to_ascii_lowercase()) {
                return Err(ConfigError::Invalid(format!(
                    "Duplicate drive '{}'",
                    drive.name
                )));
            }
            for (field, value) in [
                ("max_stroke_mm", drive.max_stroke_mm),
                ("max_speed_mm_s", drive.max_speed_mm_s),
                ("max_force_n", drive.max_force_n),
                ("moving_mass_g", drive.moving_mass_g),
            ] {
                if !(value > 0.0) {
                    return Err(ConfigError::Invalid(format!(
                        "Drive '{}': {} must be > 0",
                        drive.name, field
                    )));
                }
            }
        }
        Ok(())
    }
}

// Default value functions
fn default_distance_mm() -> f64 { 100.0 }
fn default_max_speed_mm_s() -> f64 { 1000.0 }
fn default_max_accel_m_s2() -> f64 { 10.0 }
fn default_max_jerk_m_s3() -> f64 { 100.0 }
fn default_motor_mass_g() -> f64 { 500.0 }
fn default_max_force_n() -> f64 { 10.0 }
fn default_derive_acceleration() -> bool { true }
fn default_point_count() -> usize { crate::motion::sampler::DEFAULT_POINT_COUNT }
fn default_max_point_count() -> usize { 10_000 }
fn default_bind() -> String { "127.0.0.1:3000".to_string() }

/// Load configuration from a TOML file at the given path.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|e| {
        tracing::error!("Failed to read config file '{}': {}", path.display(), e);
        ConfigError::Io(e)
    })?;
    let config: Config = toml::from_str(&contents).map_err(|e| {
        tracing::error!("Failed to parse config TOML: {}", e);
        ConfigError::Toml(e)
    })?;
    config.validate()?;
    tracing::debug!("Loaded {} drive(s) from '{}'", config.drives.len(), path.display());
    Ok(config)
}
