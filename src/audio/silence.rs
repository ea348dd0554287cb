//! Silence generation: zero-sample buffers for gap and substitution clips.

use std::time::Duration;

use crate::types::samples_for_duration;

/// Generate `duration` worth of silence at `sample_rate`.
pub fn silence(duration: Duration, sample_rate: u32) -> Vec<f32> {
    vec![0.0; samples_for_duration(duration, sample_rate)]
}
