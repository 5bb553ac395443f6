//! # Spatial index
//!
//! An immutable uniform grid over stroke bounding boxes, answering "which strokes overlap this rectangle?"
//! for viewport culling and hit-testing.
//!
//! An index is built once from a batch of boxes and never updated. Edits are handled by building a new one
//! and swapping it in, so readers holding an old index keep seeing consistent data. Snapshots are usually
//! owned through an [`IndexArena`], which hands out checked [`IndexHandle`]s.

mod arena;
pub use arena::{IndexArena, IndexHandle, ScopedIndex};

use smallvec::SmallVec;

use crate::stroke::{BoundingBox, StrokeId};

/// Cell side is derived from the mean box extent times this.
const CELL_EXTENT_FACTOR: f32 = 2.0;
/// Upper bound on cells along one axis of the populated area, so a few tiny boxes spread far apart
/// don't produce a huge number of cells.
const MAX_CELLS_PER_AXIS: f32 = 1024.0;
/// Boxes spanning more cells than this are not registered in cells at all, and are tested on every query instead.
const MAX_CELLS_PER_BOX: u64 = 256;

type CellCoord = (i32, i32);

/// The outcome of a range query.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryResult {
    /// Distinct matching ids, ascending.
    pub ids: Vec<StrokeId>,
    /// More matches existed than were returned.
    pub truncated: bool,
}
impl QueryResult {
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
    /// Keep at most `max` ids, noting whether any were dropped.
    pub(crate) fn from_sorted(mut ids: Vec<StrokeId>, max: usize) -> Self {
        ids.dedup();
        let truncated = ids.len() > max;
        ids.truncate(max);
        if truncated {
            log::debug!("query truncated to {max} results");
        }
        Self { ids, truncated }
    }
}

/// Immutable grid index. See the [module docs](self).
pub struct SpatialIndex {
    entries: Vec<(BoundingBox, StrokeId)>,
    cell_size: f32,
    /// Entry indices registered in each populated cell.
    cells: hashbrown::HashMap<CellCoord, SmallVec<[usize; 4]>>,
    /// Entry indices too large to register cell-by-cell.
    oversize: Vec<usize>,
}
impl SpatialIndex {
    /// Build from `(box, id)` pairs. An empty batch makes a valid, empty index.
    ///
    /// Ids need not be unique - a query reports each id at most once.
    pub fn build(boxes: impl IntoIterator<Item = (BoundingBox, StrokeId)>) -> Self {
        let entries: Vec<_> = boxes.into_iter().collect();
        let cell_size = Self::cell_size_for(&entries);

        let mut cells = hashbrown::HashMap::<CellCoord, SmallVec<[usize; 4]>>::new();
        let mut oversize = Vec::new();
        for (idx, (bounds, _)) in entries.iter().enumerate() {
            let range = CellRange::covering(bounds, cell_size);
            if range.count() > MAX_CELLS_PER_BOX {
                oversize.push(idx);
                continue;
            }
            for coord in range.iter() {
                cells.entry(coord).or_default().push(idx);
            }
        }

        log::trace!(
            "built spatial index: {} entries, {} cells of side {cell_size}, {} oversize",
            entries.len(),
            cells.len(),
            oversize.len()
        );

        Self {
            entries,
            cell_size,
            cells,
            oversize,
        }
    }
    /// Twice the mean box extent, bounded below so the populated area spans a sane number of cells.
    fn cell_size_for(entries: &[(BoundingBox, StrokeId)]) -> f32 {
        let finite = entries
            .iter()
            .map(|(bounds, _)| bounds)
            .filter(|bounds| bounds.extent().is_finite());
        let mut count = 0usize;
        let mut extent_sum = 0.0f64;
        let mut total: Option<BoundingBox> = None;
        for bounds in finite {
            count += 1;
            extent_sum += f64::from(bounds.extent());
            total = Some(total.map_or(*bounds, |total| total.union(bounds)));
        }
        let Some(total) = total else {
            return 1.0;
        };

        #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
        let mean = (extent_sum / count as f64) as f32;
        let size = (mean * CELL_EXTENT_FACTOR).max(total.extent() / MAX_CELLS_PER_AXIS);
        if size.is_finite() && size > 0.0 {
            size
        } else {
            // Every box is a point, and every point is the same point.
            1.0
        }
    }
    /// Ids of every entry whose box overlaps `query`, ascending, at most `max_results` of them.
    #[must_use]
    pub fn query(&self, query: &BoundingBox, max_results: usize) -> QueryResult {
        let overlapping = |&idx: &usize| {
            let (bounds, id) = &self.entries[idx];
            bounds.overlaps(query).then_some(*id)
        };

        let range = CellRange::covering(query, self.cell_size);
        let mut ids: Vec<StrokeId> = if range.count() > self.cells.len() as u64 {
            // Visiting every cell in range would be slower than just checking everything.
            (0..self.entries.len())
                .filter_map(|idx| overlapping(&idx))
                .collect()
        } else {
            let mut candidates: Vec<usize> = range
                .iter()
                .filter_map(|coord| self.cells.get(&coord))
                .flatten()
                .chain(&self.oversize)
                .copied()
                .collect();
            candidates.sort_unstable();
            candidates.dedup();
            candidates.iter().filter_map(overlapping).collect()
        };
        ids.sort_unstable();
        QueryResult::from_sorted(ids, max_results)
    }
    /// Number of registered boxes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    #[must_use]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }
    /// Every registered `(box, id)`, in build order.
    pub fn iter(&self) -> impl Iterator<Item = &(BoundingBox, StrokeId)> + '_ {
        self.entries.iter()
    }
}
impl std::fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialIndex")
            .field("entries", &self.entries.len())
            .field("cell_size", &self.cell_size)
            .field("cells", &self.cells.len())
            .field("oversize", &self.oversize.len())
            .finish()
    }
}

/// Inclusive rectangle of cell coordinates.
#[derive(Copy, Clone, Debug)]
struct CellRange {
    min: CellCoord,
    max: CellCoord,
}
impl CellRange {
    fn covering(bounds: &BoundingBox, cell_size: f32) -> Self {
        // `as` saturates, so far away or infinite coordinates clamp to the outermost cells.
        #[allow(clippy::cast_possible_truncation)]
        let cell = |v: f32| (v / cell_size).floor() as i32;
        Self {
            min: (cell(bounds.min_x), cell(bounds.min_y)),
            max: (cell(bounds.max_x), cell(bounds.max_y)),
        }
    }
    /// Number of cells covered. Zero if inverted.
    fn count(&self) -> u64 {
        let span = |min: i32, max: i32| u64::try_from(i64::from(max) - i64::from(min) + 1).unwrap_or(0);
        span(self.min.0, self.max.0).saturating_mul(span(self.min.1, self.max.1))
    }
    fn iter(self) -> impl Iterator<Item = CellCoord> {
        (self.min.1..=self.max.1).flat_map(move |y| (self.min.0..=self.max.0).map(move |x| (x, y)))
    }
}
