//! Tunables for an [`InfiniteCanvas`](crate::canvas::InfiniteCanvas).

/// Every field has a default, so a partial config file is valid.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Pending edits (draws plus erases) after which a fresh index snapshot is published.
    pub rebuild_threshold: usize,
    pub min_scale: f32,
    pub max_scale: f32,
    /// Half-size of the bounds reported for a canvas with nothing on it.
    pub initial_extent: f32,
    /// Vector eraser radius, in canvas units.
    pub hit_radius: f32,
}
impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            rebuild_threshold: 100,
            min_scale: 1.0 / 64.0,
            max_scale: 64.0,
            initial_extent: 1024.0,
            hit_radius: 4.0,
        }
    }
}
impl CanvasConfig {
    /// Replace nonsensical values with defaults, logging each.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        let positive = |value: f32| value.is_finite() && value > 0.0;

        if self.rebuild_threshold == 0 {
            log::warn!("rebuild_threshold must be at least 1");
            self.rebuild_threshold = defaults.rebuild_threshold;
        }
        if !(positive(self.min_scale) && positive(self.max_scale) && self.min_scale <= self.max_scale) {
            log::warn!(
                "scale range [{}, {}] is invalid, using defaults",
                self.min_scale,
                self.max_scale
            );
            self.min_scale = defaults.min_scale;
            self.max_scale = defaults.max_scale;
        }
        if !positive(self.initial_extent) {
            log::warn!("initial_extent must be positive");
            self.initial_extent = defaults.initial_extent;
        }
        if !positive(self.hit_radius) {
            log::warn!("hit_radius must be positive");
            self.hit_radius = defaults.hit_radius;
        }
        self
    }
}
