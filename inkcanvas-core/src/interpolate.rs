//! # Pressure interpolation
//!
//! Smooth pressure along a stroke, for renderers that place stamps between recorded samples.
//! Parametrization is uniform in sample index, not in arc length.

use crate::error::{ParameterError, Result};
use crate::stroke::StrokeSample;

/// Pressure at normalized position `t` along the stroke.
///
/// `t` is clamped into `[0, 1]`. Interior segments use a uniform Catmull-Rom cubic through the two samples on
/// either side. The first and last segments lack an outer neighbor and blend linearly instead. Either way
/// a segment passes exactly through its end samples, so the result is continuous in `t`.
///
/// The cubic may overshoot the range of its samples slightly, and is not clamped.
///
/// # Errors
/// [`ParameterError::EmptySamples`] for an empty stroke, [`ParameterError::NonFinite`] for a NaN `t` on a stroke
/// of two or more samples. A single sample is returned whatever `t` is.
pub fn interpolate(samples: &[StrokeSample], t: f32) -> Result<f32> {
    match samples {
        [] => Err(ParameterError::EmptySamples.into()),
        [only] => Ok(only.pressure),
        _ if t.is_nan() => Err(ParameterError::NonFinite("t").into()),
        _ => Ok(interpolate_segments(samples, t.clamp(0.0, 1.0))),
    }
}

/// Interpolate `count` evenly spaced pressures from the first sample to the last.
///
/// # Errors
/// [`ParameterError::EmptySamples`] for an empty stroke.
pub fn resample(samples: &[StrokeSample], count: usize) -> Result<Vec<f32>> {
    match count {
        0 => Ok(Vec::new()),
        1 => interpolate(samples, 0.0).map(|p| vec![p]),
        _ => {
            let last = (count - 1) as f32;
            (0..count)
                .map(|idx| interpolate(samples, idx as f32 / last))
                .collect()
        }
    }
}

/// Requires `samples.len() >= 2` and `t` in `[0, 1]`.
fn interpolate_segments(samples: &[StrokeSample], t: f32) -> f32 {
    let last_segment = samples.len() - 2;
    let position = t * (samples.len() - 1) as f32;
    // Truncating is flooring, `position` is non-negative. The final sample belongs to the last segment.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let segment = (position as usize).min(last_segment);
    let frac = position - segment as f32;

    let p1 = samples[segment].pressure;
    let p2 = samples[segment + 1].pressure;
    let before = segment.checked_sub(1).map(|idx| samples[idx].pressure);
    let after = samples.get(segment + 2).map(|s| s.pressure);

    match (before, after) {
        (Some(p0), Some(p3)) => catmull_rom(p0, p1, p2, p3, frac),
        _ => p1 + (p2 - p1) * frac,
    }
}

/// Uniform Catmull-Rom between `p1` and `p2`.
fn catmull_rom(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let t2 = t * t;
    let t3 = t2 * t;
    0.5 * ((2.0 * p1)
        + (p2 - p0) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (3.0 * p1 - p0 - 3.0 * p2 + p3) * t3)
}
