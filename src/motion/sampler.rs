// src/motion/sampler.rs
//! Discretises a solved profile into evenly spaced samples.

use serde::{Deserialize, Serialize};

use crate::motion::s_curve::ProfileSolution;
use crate::motion::trajectory::{Sample, Trajectory};

/// Number of points used when the caller does not ask for a specific count.
pub const DEFAULT_POINT_COUNT: usize = 200;

/// Aggregate values over a sample set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub total_time: f64,
    /// Out-and-back time, twice the one-way move
    pub cycle_time: f64,
    pub max_velocity_reached: f64,
    pub max_acceleration_reached: f64,
    pub final_position: f64,
}

impl ProfileSummary {
    pub fn from_samples(total_time: f64, samples: &[Sample]) -> Self {
        let mut summary = ProfileSummary {
            total_time,
            cycle_time: 2.0 * total_time,
            ..Default::default()
        };
        for sample in samples {
            summary.max_velocity_reached = summary.max_velocity_reached.max(sample.velocity);
            summary.max_acceleration_reached =
                summary.max_acceleration_reached.max(sample.acceleration.abs());
        }
        summary.final_position = samples.last().map_or(0.0, |s| s.position);
        summary
    }
}

/// Samples plus their summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampledProfile {
    pub samples: Vec<Sample>,
    pub summary: ProfileSummary,
}

/// Evaluates `point_count` evenly spaced instants over `[0, total_time]`,
/// then one more at exactly `total_time`.
///
/// A profile without duration yields no samples.
pub fn sample(solution: &ProfileSolution, point_count: usize) -> Vec<Sample> {
    let total_time = solution.total_time;
    if !(total_time > 0.0) || !total_time.is_finite() {
        tracing::debug!("Profile has no duration, nothing to sample");
        return Vec::new();
    }

    let trajectory = Trajectory::new(solution);
    let steps = point_count.saturating_sub(1).max(1);
    let dt = total_time / steps as f64;

    let mut samples = Vec::with_capacity(point_count + 1);
    // Accumulated steps may overshoot the end by an ulp.
    samples.extend((0..point_count).map(|i| trajectory.evaluate((i as f64 * dt).min(total_time))));
    samples.push(trajectory.evaluate(total_time));

    tracing::debug!("Sampled {} points over {:.6}s", samples.len(), total_time);
    samples
}

/// Like [`sample`], paired with a [`ProfileSummary`]. Zeroed summary when
/// there is nothing to sample.
pub fn sample_profile(solution: &ProfileSolution, point_count: usize) -> SampledProfile {
    let samples = sample(solution, point_count);
    if samples.is_empty() {
        return SampledProfile::default();
    }
    let summary = ProfileSummary::from_samples(solution.total_time, &samples);
    SampledProfile { samples, summary }
}
