//! # Erasers
//!
//! Raster erasure clears a circle of pixels in a caller-owned RGBA8 buffer. Vector erasure removes whole
//! strokes from an active set - a stroke touched by the eraser is removed entirely, never split.
//!
//! Neither eraser owns anything. The buffer, the set and the index are all borrowed for the call only.

use crate::error::{ParameterError, Result};
use crate::spatial::QueryResult;
use crate::stroke::{BoundingBox, StrokeId, StrokeSample};

/// Fully transparent RGBA8.
pub const TRANSPARENT: [u8; 4] = [0; 4];

/// A collection of strokes that can have members erased.
pub trait StrokeSet {
    /// Remove `id` if present. Returns whether it was.
    fn remove_stroke(&mut self, id: StrokeId) -> bool;
}
impl StrokeSet for Vec<StrokeId> {
    fn remove_stroke(&mut self, id: StrokeId) -> bool {
        let before = self.len();
        self.retain(|&held| held != id);
        self.len() != before
    }
}
impl StrokeSet for hashbrown::HashSet<StrokeId> {
    fn remove_stroke(&mut self, id: StrokeId) -> bool {
        self.remove(&id)
    }
}
impl StrokeSet for std::collections::BTreeSet<StrokeId> {
    fn remove_stroke(&mut self, id: StrokeId) -> bool {
        self.remove(&id)
    }
}

/// Clear to transparent every pixel `(px, py)` with `(px - cx)² + (py - cy)² <= radius²`.
///
/// `image` is tightly packed RGBA8 rows, at least `width * height * 4` bytes. The circle is clipped to the
/// image - pixels outside are ignored. Returns the number of pixels cleared.
pub fn erase_pixels(
    image: &mut [u8],
    width: u32,
    height: u32,
    cx: f32,
    cy: f32,
    radius: f32,
) -> Result<usize> {
    erase_pixels_to(image, width, height, cx, cy, radius, TRANSPARENT)
}

/// As [`erase_pixels`], but clearing to an arbitrary `background` color.
pub fn erase_pixels_to(
    image: &mut [u8],
    width: u32,
    height: u32,
    cx: f32,
    cy: f32,
    radius: f32,
    background: [u8; 4],
) -> Result<usize> {
    if radius.is_nan() {
        return Err(ParameterError::NonFinite("radius").into());
    }
    if radius <= 0.0 {
        return Err(ParameterError::NonPositiveRadius.into());
    }
    if !cx.is_finite() || !cy.is_finite() {
        return Err(ParameterError::NonFinite("eraser center").into());
    }
    let required = (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(4))
        .unwrap_or(usize::MAX);
    if image.len() < required {
        return Err(ParameterError::BufferTooSmall {
            expected: required,
            actual: image.len(),
        }
        .into());
    }
    if width == 0 || height == 0 {
        return Ok(0);
    }

    let pixels: &mut [[u8; 4]] = bytemuck::cast_slice_mut(&mut image[..required]);
    let (cx, cy, radius) = (f64::from(cx), f64::from(cy), f64::from(radius));
    let radius_sq = radius * radius;

    // Inclusive pixel range touched by the circle's bounding square, clipped to the image.
    let clip = |center: f64, len: u32| -> Option<(u32, u32)> {
        let min = (center - radius).ceil().max(0.0);
        let max = (center + radius).floor().min(f64::from(len) - 1.0);
        // Both clamped into [0, len), so the casts are exact.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let range = (min <= max).then(|| (min as u32, max as u32));
        range
    };
    let (Some((x0, x1)), Some((y0, y1))) = (clip(cx, width), clip(cy, height)) else {
        return Ok(0);
    };

    let mut cleared = 0;
    for py in y0..=y1 {
        let dy = f64::from(py) - cy;
        let row = &mut pixels[py as usize * width as usize..][..width as usize];
        for px in x0..=x1 {
            let dx = f64::from(px) - cx;
            if dx * dx + dy * dy <= radius_sq {
                row[px as usize] = background;
                cleared += 1;
            }
        }
    }
    Ok(cleared)
}

/// Remove `target` from the active set. Returns `false`, without error, if it wasn't there.
pub fn erase_stroke<Set: StrokeSet + ?Sized>(active: &mut Set, target: StrokeId) -> bool {
    active.remove_stroke(target)
}

/// Does the polyline through `samples` pass within `radius` of `(x, y)`?
#[must_use]
pub fn stroke_hit(samples: &[StrokeSample], x: f32, y: f32, radius: f32) -> bool {
    let radius_sq = radius * radius;
    match samples {
        [] => false,
        [only] => {
            let (dx, dy) = (only.x - x, only.y - y);
            dx * dx + dy * dy <= radius_sq
        }
        _ => samples
            .windows(2)
            .any(|pair| segment_distance_sq(&pair[0], &pair[1], x, y) <= radius_sq),
    }
}

fn segment_distance_sq(a: &StrokeSample, b: &StrokeSample, x: f32, y: f32) -> f32 {
    let (abx, aby) = (b.x - a.x, b.y - a.y);
    let (apx, apy) = (x - a.x, y - a.y);
    let len_sq = abx * abx + aby * aby;
    let t = if len_sq > 0.0 {
        ((apx * abx + apy * aby) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let (dx, dy) = (apx - abx * t, apy - aby * t);
    dx * dx + dy * dy
}

/// Vector-erase at a point: find strokes whose path passes within `radius` of `(x, y)`, and erase each
/// from `active`.
///
/// `candidates` answers a range query for the probe square around the point, typically a
/// [`SpatialIndex::query`](crate::spatial::SpatialIndex::query). `samples_of` fetches a candidate's samples
/// from the set. Candidates it can't find are skipped. Returns the erased ids, ascending.
pub fn erase_at<Set, Query, Fetch>(
    active: &mut Set,
    x: f32,
    y: f32,
    radius: f32,
    candidates: Query,
    mut samples_of: Fetch,
) -> Result<Vec<StrokeId>>
where
    Set: StrokeSet + ?Sized,
    Query: FnOnce(&BoundingBox) -> QueryResult,
    Fetch: FnMut(&Set, StrokeId) -> Option<Vec<StrokeSample>>,
{
    if radius.is_nan() || !x.is_finite() || !y.is_finite() {
        return Err(ParameterError::NonFinite("eraser position").into());
    }
    if radius <= 0.0 {
        return Err(ParameterError::NonPositiveRadius.into());
    }
    let Some(probe) = BoundingBox::around_point(x, y, radius) else {
        return Ok(Vec::new());
    };
    let touched: Vec<StrokeId> = candidates(&probe)
        .ids
        .into_iter()
        .filter(|&id| {
            samples_of(&*active, id).is_some_and(|samples| stroke_hit(&samples, x, y, radius))
        })
        .collect();
    Ok(touched
        .into_iter()
        .filter(|&id| erase_stroke(active, id))
        .collect())
}
