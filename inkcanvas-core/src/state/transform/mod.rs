use crate::error::{ParameterError, Result};
use crate::stroke::BoundingBox;

/// A view transform consisting of uniform scale, then translation.
///
/// A canvas point `p` lands on screen at `p * scale + translation`.
/// Invariant: `scale` is finite and greater than zero, so the transform is always invertible.
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable, PartialEq)]
#[repr(C)]
pub struct ViewTransform {
    scale: f32,
    translation: [f32; 2],
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translation: [0.0; 2],
        }
    }
}

impl ViewTransform {
    /// # Errors
    /// [`ParameterError::NonPositiveZoom`] if `scale` is not a positive finite number.
    pub fn new(scale: f32, translation: [f32; 2]) -> Result<Self> {
        if !(scale > 0.0 && scale.is_finite()) {
            return Err(ParameterError::NonPositiveZoom.into());
        }
        if !translation.iter().all(|t| t.is_finite()) {
            return Err(ParameterError::NonFinite("translation").into());
        }
        Ok(Self { scale, translation })
    }
    #[must_use]
    pub fn scale(&self) -> f32 {
        self.scale
    }
    #[must_use]
    pub fn translation(&self) -> [f32; 2] {
        self.translation
    }
    /// Translate by `(dx, dy)`. Non-finite deltas are ignored, as they would leave the view unusable.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        if !(dx.is_finite() && dy.is_finite()) {
            log::debug!("ignoring non-finite pan ({dx}, {dy})");
            return;
        }
        self.translation[0] += dx;
        self.translation[1] += dy;
    }
    /// Multiply scale by `factor`, adjusting translation as `t' = c - (c - t) * factor` per axis so the anchor
    /// `(cx, cy)` stays put on screen.
    ///
    /// # Errors
    /// [`ParameterError::NonPositiveZoom`] if `factor` is not a positive finite number.
    pub fn zoom_about(&mut self, factor: f32, cx: f32, cy: f32) -> Result<()> {
        self.zoom_about_clamped(factor, cx, cy, f32::MIN_POSITIVE, f32::MAX)
            .map(|_| ())
    }
    /// As [`Self::zoom_about`], but the resulting scale is limited to `[min_scale, max_scale]`. When limited,
    /// the anchor is honored using the effective factor.
    ///
    /// Returns the effective factor.
    pub fn zoom_about_clamped(
        &mut self,
        factor: f32,
        cx: f32,
        cy: f32,
        min_scale: f32,
        max_scale: f32,
    ) -> Result<f32> {
        if !(factor > 0.0 && factor.is_finite()) {
            return Err(ParameterError::NonPositiveZoom.into());
        }
        if !(cx.is_finite() && cy.is_finite()) {
            return Err(ParameterError::NonFinite("zoom anchor").into());
        }
        let scale = (self.scale * factor).clamp(min_scale, max_scale);
        if !(scale > 0.0 && scale.is_finite()) {
            return Err(ParameterError::NonPositiveZoom.into());
        }
        // Exactly `factor` unless clamped.
        let factor = if scale == self.scale * factor {
            factor
        } else {
            scale / self.scale
        };

        self.scale = scale;
        self.translation = [
            cx - (cx - self.translation[0]) * factor,
            cy - (cy - self.translation[1]) * factor,
        ];
        Ok(factor)
    }
    /// Convert this point in canvas space to screen space.
    #[must_use]
    pub fn project(&self, [x, y]: [f32; 2]) -> [f32; 2] {
        [
            x * self.scale + self.translation[0],
            y * self.scale + self.translation[1],
        ]
    }
    /// Convert this point in screen space to canvas space.
    #[must_use]
    pub fn unproject(&self, [x, y]: [f32; 2]) -> [f32; 2] {
        [
            (x - self.translation[0]) / self.scale,
            (y - self.translation[1]) / self.scale,
        ]
    }
    /// The canvas-space area shown by a screen of the given size, with its top-left at the screen origin.
    #[must_use]
    pub fn visible_region(&self, width: f32, height: f32) -> BoundingBox {
        let [min_x, min_y] = self.unproject([0.0, 0.0]);
        let [max_x, max_y] = self.unproject([width.max(0.0), height.max(0.0)]);
        BoundingBox {
            min_x,
            min_y,
            max_x: max_x.max(min_x),
            max_y: max_y.max(min_y),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::Error;

    #[test]
    fn zoom_keeps_anchor() {
        let mut view = ViewTransform::default();
        let before = view.project([100.0, 50.0]);
        view.zoom_about(2.0, 100.0, 50.0).unwrap();
        assert_eq!(view.project([100.0, 50.0]), before);
        assert_eq!(view.scale(), 2.0);
        assert_eq!(view.translation(), [-100.0, -50.0]);
    }
    #[test]
    fn zoom_formula_after_pan() {
        let mut view = ViewTransform::default();
        view.pan(10.0, -4.0);
        view.zoom_about(3.0, 7.0, 2.0).unwrap();
        assert_eq!(view.translation(), [7.0 - (7.0 - 10.0) * 3.0, 2.0 - (2.0 + 4.0) * 3.0]);
    }
    #[test]
    fn rejects_bad_factor() {
        let mut view = ViewTransform::default();
        for factor in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            assert_eq!(
                view.zoom_about(factor, 0.0, 0.0),
                Err(Error::InvalidParameter(ParameterError::NonPositiveZoom))
            );
        }
        assert_eq!(view, ViewTransform::default());
    }
    #[test]
    fn clamped_zoom_stays_anchored() {
        let mut view = ViewTransform::default();
        let effective = view
            .zoom_about_clamped(100.0, 20.0, 30.0, 0.5, 8.0)
            .unwrap();
        assert_eq!(effective, 8.0);
        assert_eq!(view.scale(), 8.0);
        assert_eq!(view.project([20.0, 30.0]), [20.0, 30.0]);
    }
    #[test]
    fn project_unproject() {
        let mut view = ViewTransform::default();
        view.pan(5.0, 5.0);
        view.zoom_about(4.0, 1.0, 1.0).unwrap();
        let point = [12.5, -3.0];
        let back = view.unproject(view.project(point));
        assert!((back[0] - point[0]).abs() < 1e-4 && (back[1] - point[1]).abs() < 1e-4);
    }
    #[test]
    fn visible_region_scales() {
        let mut view = ViewTransform::default();
        view.zoom_about(2.0, 0.0, 0.0).unwrap();
        let region = view.visible_region(100.0, 50.0);
        assert_eq!(region, BoundingBox::new(0.0, 0.0, 50.0, 25.0).unwrap());
    }
    #[test]
    fn non_finite_pan_ignored() {
        let mut view = ViewTransform::default();
        view.pan(f32::NAN, 1.0);
        assert_eq!(view, ViewTransform::default());
    }
}
