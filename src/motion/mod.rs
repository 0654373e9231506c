// src/motion/mod.rs - Single-axis point-to-point motion profiles

pub mod physics;
pub mod s_curve;
pub mod trajectory;
pub mod sampler;

pub use physics::{PhysicsInputs, derive_max_acceleration, suggested_jerk};
pub use s_curve::{JERK_TRAPEZOIDAL, KinematicLimits, ProfileSolution, SCurveError, solve};
pub use sampler::{DEFAULT_POINT_COUNT, ProfileSummary, SampledProfile, sample, sample_profile};
pub use trajectory::{MotionState, Phase, PhaseSegment, Sample, Trajectory, evaluate};
