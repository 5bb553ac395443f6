use super::StrokeSample;

/// Axis-aligned rectangle, in canvas units.
///
/// Invariant: `min_x <= max_x` and `min_y <= max_y`. Constructors which cannot uphold this return `None`.
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct BoundingBox {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}
impl BoundingBox {
    /// Create from two corners. `None` if the corners are inverted or NaN.
    #[must_use]
    pub fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Option<Self> {
        // Written so that NaN fails the check.
        (min_x <= max_x && min_y <= max_y).then_some(Self {
            min_x,
            min_y,
            max_x,
            max_y,
        })
    }
    /// The square of half-size `radius` centered on a point.
    #[must_use]
    pub fn around_point(x: f32, y: f32, radius: f32) -> Option<Self> {
        Self::new(x - radius, y - radius, x + radius, y + radius)
    }
    /// Tightest box enclosing every sample. `None` for zero samples.
    #[must_use]
    pub fn from_samples(samples: &[StrokeSample]) -> Option<Self> {
        let (first, rest) = samples.split_first()?;
        let mut bounds = Self {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        for sample in rest {
            bounds.expand_to_include(sample.x, sample.y);
        }
        Some(bounds)
    }
    pub fn expand_to_include(&mut self, x: f32, y: f32) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }
    #[must_use]
    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }
    #[must_use]
    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }
    /// The larger of width and height.
    #[must_use]
    pub fn extent(&self) -> f32 {
        self.width().max(self.height())
    }
    /// Inclusive point containment - points on the edge are inside.
    #[must_use]
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
    /// True bounding-box intersection. Boxes which merely touch along an edge overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }
    /// Smallest box enclosing both.
    #[must_use = "returns a new box without modifying `self`"]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }
    /// Grow each side outward by `amount`. Negative amounts shrink, but never past the center.
    #[must_use = "returns a new box without modifying `self`"]
    pub fn inflate(&self, amount: f32) -> Self {
        let center_x = (self.min_x + self.max_x) / 2.0;
        let center_y = (self.min_y + self.max_y) / 2.0;
        Self {
            min_x: (self.min_x - amount).min(center_x),
            min_y: (self.min_y - amount).min(center_y),
            max_x: (self.max_x + amount).max(center_x),
            max_y: (self.max_y + amount).max(center_y),
        }
    }
}
