// scurve-calc: jerk-limited motion profile calculator for linear drives

pub mod calculator;
pub mod config;
pub mod error;
pub mod export;
pub mod motion;
pub mod units;
pub mod validation;
pub mod web;

pub use calculator::{CalculationInput, CalculationReport, RequestOverrides, calculate};
pub use config::{Config, ConfigError, load_config};
pub use error::CalcError;
pub use motion::{
    KinematicLimits, Phase, PhysicsInputs, ProfileSolution, Sample, SCurveError, evaluate, sample,
    solve,
};
pub use units::MoveRequest;
pub use validation::{Check, CheckParameter, CheckStatus, DriveLimits, validate};
