//! # Strokes
//!
//! The strokes owned by one canvas, stored encoded, along with their erasure state.

use crate::eraser::StrokeSet;
use crate::io::StrokeChunk;
use crate::stroke::{BoundingBox, StrokeId, StrokeSample};

#[derive(Clone, Debug)]
pub struct StoredStroke {
    pub id: StrokeId,
    /// `None` for a stroke with no samples, which can never be hit or seen.
    pub bounds: Option<BoundingBox>,
    /// Samples are kept encoded - they are only needed in full for rendering and precise hit-tests.
    pub chunk: StrokeChunk,
}
impl StoredStroke {
    /// Decode the samples. A chunk we encoded ourselves failing to decode is an implementation bug,
    /// reported as `None`.
    #[must_use]
    pub fn samples(&self) -> Option<Vec<StrokeSample>> {
        match self.chunk.decode() {
            Ok(samples) => Some(samples),
            Err(e) => {
                log::warn!("{} has a corrupt chunk: {e}", self.id);
                None
            }
        }
    }
}

#[derive(Clone, Default, Debug)]
pub struct StrokeCollection {
    /// Ordered by id, ascending.
    strokes: Vec<StoredStroke>,
    /// Flags to determine which strokes have not been erased.
    strokes_active: bitvec::vec::BitVec,
}
// Public methods for client
impl StrokeCollection {
    pub fn iter_active(&self) -> impl Iterator<Item = &StoredStroke> + '_ {
        self.strokes_active
            .iter_ones()
            // Short circuit iteration if we reach out-of-bounds (that'd be weird)
            .map_while(|index| self.strokes.get(index))
    }
    /// `(bounds, id)` of every active stroke with samples, ready for indexing.
    pub fn active_boxes(&self) -> impl Iterator<Item = (BoundingBox, StrokeId)> + '_ {
        self.iter_active()
            .filter_map(|stroke| Some((stroke.bounds?, stroke.id)))
    }
    /// Get a stroke by the given ID. Returns None if it is not found, or has been erased.
    #[must_use]
    pub fn get(&self, id: StrokeId) -> Option<&StoredStroke> {
        let idx = self.index_of(id)?;
        // Return the stroke, if it's not erased.
        self.strokes_active
            .get(idx)?
            .then(|| self.strokes.get(idx))
            .flatten()
    }
    #[must_use]
    pub fn is_active(&self, id: StrokeId) -> bool {
        self.get(id).is_some()
    }
    /// Decoded samples of an active stroke.
    #[must_use]
    pub fn samples_of(&self, id: StrokeId) -> Option<Vec<StrokeSample>> {
        self.get(id)?.samples()
    }
    /// Number of active strokes.
    #[must_use]
    pub fn len_active(&self) -> usize {
        self.strokes_active.count_ones()
    }
    /// Union of the bounds of every active stroke. `None` if nothing is visible.
    #[must_use]
    pub fn bounds(&self) -> Option<BoundingBox> {
        self.active_boxes()
            .map(|(bounds, _)| bounds)
            .reduce(|a, b| a.union(&b))
    }
    fn index_of(&self, id: StrokeId) -> Option<usize> {
        self.strokes.binary_search_by_key(&id, |stroke| stroke.id).ok()
    }
}
// Methods for the owning canvas
impl StrokeCollection {
    /// Insert a new stroke at the end, defaulting to active.
    /// Ids must be pushed in ascending order.
    pub(crate) fn push_back(&mut self, stroke: StoredStroke) {
        debug_assert!(self.strokes.last().map_or(true, |last| last.id < stroke.id));
        self.strokes.push(stroke);
        // Initially active.
        self.strokes_active.push(true);
    }
    /// Drop storage of erased strokes.
    pub(crate) fn compact(&mut self) -> usize {
        let before = self.strokes.len();
        let mut flags = self.strokes_active.iter().by_vals();
        self.strokes.retain(|_| flags.next().unwrap_or(false));
        self.strokes_active = bitvec::vec::BitVec::repeat(true, self.strokes.len());
        before - self.strokes.len()
    }
}
impl StrokeSet for StrokeCollection {
    fn remove_stroke(&mut self, id: StrokeId) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        match self.strokes_active.get_mut(idx) {
            Some(mut active) if *active => {
                *active = false;
                true
            }
            _ => false,
        }
    }
}
