//! # Strokes
//!
//! A stroke is one continuous freehand gesture: an ordered sequence of pressure-tagged samples.

mod bounds;
pub use bounds::BoundingBox;

use crate::error::{ParameterError, Result};
use crate::util::FiniteF32;

/// Pressure assumed for input devices which don't report any, such as a mouse.
pub const DEFAULT_PRESSURE: f32 = 1.0;

/// Namespace for [`StrokeId`]s. Never constructed.
pub struct StrokeMarker;
pub type StrokeId = crate::id::Id<StrokeMarker>;

/// A single recorded input sample. Immutable once recorded.
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct StrokeSample {
    pub x: f32,
    pub y: f32,
    /// Normalized pressure, `[0, 1]`.
    pub pressure: f32,
}
impl StrokeSample {
    #[must_use]
    pub const fn new(x: f32, y: f32, pressure: f32) -> Self {
        Self { x, y, pressure }
    }
    /// Create a sample, rejecting NaN or infinite fields.
    pub fn try_new(x: f32, y: f32, pressure: f32) -> Result<Self> {
        let check = |value: f32, name: &'static str| {
            FiniteF32::new(value).map_err(|_| ParameterError::NonFinite(name))
        };
        Ok(Self {
            x: check(x, "x")?.get(),
            y: check(y, "y")?.get(),
            pressure: check(pressure, "pressure")?.get(),
        })
    }
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.pressure.is_finite()
    }
}

/// Collects samples of an in-progress stroke between pen-down and pen-up.
///
/// Non-finite samples are dropped (with a log) rather than poisoning the stroke, and pressure is
/// clamped into `[0, 1]`, since tablet drivers are known to overshoot.
#[derive(Clone, Debug, Default)]
pub struct StrokeBuilder {
    samples: Vec<StrokeSample>,
    dropped: usize,
}
impl StrokeBuilder {
    /// Pen-down at the given position.
    #[must_use]
    pub fn begin(x: f32, y: f32, pressure: f32) -> Self {
        let mut this = Self::default();
        this.add_point(x, y, pressure);
        this
    }
    pub fn add_point(&mut self, x: f32, y: f32, pressure: f32) {
        match StrokeSample::try_new(x, y, pressure) {
            Ok(mut sample) => {
                sample.pressure = sample.pressure.clamp(0.0, 1.0);
                self.samples.push(sample);
            }
            Err(e) => {
                self.dropped += 1;
                log::debug!("dropping stroke sample: {e}");
            }
        }
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
    /// How many samples were rejected so far.
    #[must_use]
    pub fn dropped(&self) -> usize {
        self.dropped
    }
    /// Pen-up. Yields the finished sample sequence.
    #[must_use]
    pub fn end(self) -> Vec<StrokeSample> {
        self.samples
    }
}
