//! # Infinite canvas
//!
//! Owns the view transform, the strokes, and the spatial index snapshot used to find them.
//!
//! Edits never touch a published snapshot. A draw appends to a pending list, an erase adds to an erased set,
//! and queries merge both over the snapshot so results are always current. Once enough edits pile up, a
//! new snapshot is built without holding any lock readers need, then swapped in. Queries already running
//! against the old snapshot finish against it undisturbed.
//!
//! Readers lock only long enough to clone a few `Arc`s, and run the query itself unlocked. Editors copy the
//! pending edits on write if a reader still holds the previous ones.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::config::CanvasConfig;
use crate::eraser;
use crate::error::{ParameterError, Result};
use crate::id::IdServer;
use crate::io::{self, StrokeChunk};
use crate::spatial::{IndexArena, IndexHandle, QueryResult, SpatialIndex};
use crate::state::stroke_collection::{StoredStroke, StrokeCollection};
use crate::state::transform::ViewTransform;
use crate::stroke::{BoundingBox, StrokeBuilder, StrokeId, StrokeMarker, StrokeSample};

/// The snapshot readers query, plus every edit made since it was built.
struct Published {
    handle: IndexHandle,
    live: LiveView,
}

/// An owned, immutable view of the canvas contents at one instant. Holds no lock.
#[derive(Clone)]
struct LiveView {
    index: Arc<SpatialIndex>,
    /// Drawn since `index` was built, in draw order.
    pending: Arc<Vec<(BoundingBox, StrokeId)>>,
    /// Erased since `index` was built. May name pending strokes too.
    erased: Arc<hashbrown::HashSet<StrokeId>>,
}
impl LiveView {
    fn edits(&self) -> usize {
        self.pending.len() + self.erased.len()
    }
    fn query(&self, query: &BoundingBox, max_results: usize) -> QueryResult {
        let mut ids = self.index.query(query, usize::MAX).ids;
        ids.extend(
            self.pending
                .iter()
                .filter(|(bounds, _)| bounds.overlaps(query))
                .map(|(_, id)| *id),
        );
        if !self.erased.is_empty() {
            ids.retain(|id| !self.erased.contains(id));
        }
        ids.sort_unstable();
        QueryResult::from_sorted(ids, max_results)
    }
}

/// A pannable, zoomable drawing surface of unbounded size.
///
/// All methods take `&self`, and the canvas may be shared between threads. Locks are always taken in the order
/// strokes, then published.
pub struct InfiniteCanvas {
    config: CanvasConfig,
    view: RwLock<ViewTransform>,
    stroke_ids: IdServer<StrokeMarker>,
    strokes: RwLock<StrokeCollection>,
    indices: IndexArena,
    published: RwLock<Published>,
    /// Serializes snapshot builds. Not held by readers or editors.
    publishing: Mutex<()>,
}

impl InfiniteCanvas {
    pub fn new(config: CanvasConfig) -> Result<Self> {
        let config = config.sanitized();
        let indices = IndexArena::new();
        let handle = indices.build(std::iter::empty())?;
        let index = indices.acquire(handle)?;
        Ok(Self {
            config,
            view: RwLock::new(ViewTransform::default()),
            stroke_ids: IdServer::new(),
            strokes: RwLock::new(StrokeCollection::default()),
            indices,
            published: RwLock::new(Published {
                handle,
                live: LiveView {
                    index,
                    pending: Arc::default(),
                    erased: Arc::default(),
                },
            }),
            publishing: Mutex::new(()),
        })
    }
    #[must_use]
    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    // ================ View ================

    #[must_use]
    pub fn view(&self) -> ViewTransform {
        *self.view.read()
    }
    /// Translate the view. Never fails.
    pub fn pan(&self, dx: f32, dy: f32) {
        self.view.write().pan(dx, dy);
    }
    /// Rescale the view by `factor` such that the anchor `(cx, cy)` does not move on screen.
    ///
    /// The resulting scale is limited to the configured range, in which case the anchor is kept using the
    /// effective factor. Returns that effective factor.
    pub fn zoom(&self, factor: f32, cx: f32, cy: f32) -> Result<f32> {
        self.view.write().zoom_about_clamped(
            factor,
            cx,
            cy,
            self.config.min_scale,
            self.config.max_scale,
        )
    }
    #[must_use]
    pub fn project(&self, point: [f32; 2]) -> [f32; 2] {
        self.view.read().project(point)
    }
    #[must_use]
    pub fn unproject(&self, point: [f32; 2]) -> [f32; 2] {
        self.view.read().unproject(point)
    }
    /// Canvas-space area covered by a screen of the given size.
    #[must_use]
    pub fn visible_region(&self, width: f32, height: f32) -> BoundingBox {
        self.view.read().visible_region(width, height)
    }

    // ================ Queries ================

    /// Ids of every live stroke overlapping `query`, ascending, at most `max_results` of them.
    #[must_use]
    pub fn query(&self, query: &BoundingBox, max_results: usize) -> QueryResult {
        self.live_view().query(query, max_results)
    }
    fn live_view(&self) -> LiveView {
        self.published.read().live.clone()
    }
    /// Strokes overlapping what a screen of the given size currently shows.
    #[must_use]
    pub fn visible_strokes(&self, width: f32, height: f32, max_results: usize) -> QueryResult {
        self.query(&self.visible_region(width, height), max_results)
    }
    /// The most recently published snapshot. Does not reflect edits made since.
    #[must_use]
    pub fn snapshot(&self) -> Arc<SpatialIndex> {
        self.published.read().live.index.clone()
    }
    #[must_use]
    pub fn samples_of(&self, id: StrokeId) -> Option<Vec<StrokeSample>> {
        self.strokes.read().samples_of(id)
    }
    /// Encoded form of a live stroke, for export.
    #[must_use]
    pub fn chunk_of(&self, id: StrokeId) -> Option<StrokeChunk> {
        self.strokes.read().get(id).map(|stroke| stroke.chunk.clone())
    }
    /// Pressure at normalized position `t` along a stroke. `None` if the stroke doesn't exist.
    ///
    /// # Errors
    /// As [`crate::interpolate::interpolate`], including for a stroke with no samples.
    pub fn pressure_at(&self, id: StrokeId, t: f32) -> Result<Option<f32>> {
        let Some(samples) = self.samples_of(id) else {
            return Ok(None);
        };
        crate::interpolate::interpolate(&samples, t).map(Some)
    }
    /// Union of all live stroke bounds. An empty canvas reports a square of the configured initial extent
    /// about the origin.
    #[must_use]
    pub fn content_bounds(&self) -> BoundingBox {
        self.strokes.read().bounds().unwrap_or_else(|| {
            let extent = self.config.initial_extent;
            BoundingBox {
                min_x: -extent,
                min_y: -extent,
                max_x: extent,
                max_y: extent,
            }
        })
    }
    /// Number of live strokes.
    #[must_use]
    pub fn stroke_count(&self) -> usize {
        self.strokes.read().len_active()
    }
    /// Total encoded size of live strokes, in bytes.
    #[must_use]
    pub fn encoded_size(&self) -> usize {
        self.strokes
            .read()
            .iter_active()
            .map(|stroke| stroke.chunk.len())
            .sum()
    }
    /// Draws and erases not yet reflected in [`Self::snapshot`].
    #[must_use]
    pub fn pending_edits(&self) -> usize {
        self.published.read().live.edits()
    }

    // ================ Edits ================

    /// Pen-down. Feed the returned builder points, then hand it to [`Self::end_stroke`].
    #[must_use]
    pub fn begin_stroke(&self, x: f32, y: f32, pressure: f32) -> StrokeBuilder {
        StrokeBuilder::begin(x, y, pressure)
    }
    pub fn end_stroke(&self, builder: StrokeBuilder) -> Result<StrokeId> {
        if builder.dropped() != 0 {
            log::debug!("stroke ended with {} invalid samples dropped", builder.dropped());
        }
        self.draw_stroke(&builder.end())
    }
    /// Add a finished stroke, returning its fresh id.
    ///
    /// # Errors
    /// [`ParameterError::NonFinite`] if any sample has a NaN or infinite field. Nothing is added.
    pub fn draw_stroke(&self, samples: &[StrokeSample]) -> Result<StrokeId> {
        if !samples.iter().all(StrokeSample::is_finite) {
            return Err(ParameterError::NonFinite("sample").into());
        }
        let bounds = BoundingBox::from_samples(samples);
        let chunk = io::try_encode(samples, io::ChunkFlags::PRESSURE)?;

        let id = {
            let mut strokes = self.strokes.write();
            // Allocated under the lock, so the collection sees ids in ascending order.
            let id = self.stroke_ids.next()?;
            strokes.push_back(StoredStroke { id, bounds, chunk });
            if let Some(bounds) = bounds {
                Arc::make_mut(&mut self.published.write().live.pending).push((bounds, id));
            }
            id
        };
        log::trace!("drew {id} with {} samples", samples.len());

        self.maybe_publish()?;
        Ok(id)
    }
    /// Decode a stored chunk and add it as a new stroke.
    ///
    /// # Errors
    /// [`crate::Error::MalformedChunk`] if `bytes` does not decode. Nothing is added.
    pub fn load_chunk(&self, bytes: &[u8]) -> Result<StrokeId> {
        let samples = io::decode(bytes)?;
        self.draw_stroke(&samples)
    }
    /// Erase a whole stroke. `false` if it didn't exist or was already erased.
    pub fn erase_stroke(&self, id: StrokeId) -> bool {
        let erased = {
            let mut strokes = self.strokes.write();
            let erased = eraser::erase_stroke(&mut *strokes, id);
            if erased {
                Arc::make_mut(&mut self.published.write().live.erased).insert(id);
            }
            erased
        };
        if erased {
            log::trace!("erased {id}");
            if let Err(e) = self.maybe_publish() {
                // The erase itself succeeded, and remains visible through the pending edits.
                log::warn!("failed to publish after erase: {e}");
            }
        }
        erased
    }
    /// Vector-erase every stroke whose path passes within the configured hit radius of `(x, y)`.
    pub fn erase_at(&self, x: f32, y: f32) -> Result<Vec<StrokeId>> {
        self.erase_at_radius(x, y, self.config.hit_radius)
    }
    /// Vector-erase every stroke whose path passes within `radius` of `(x, y)`. Returns the erased ids, ascending.
    pub fn erase_at_radius(&self, x: f32, y: f32, radius: f32) -> Result<Vec<StrokeId>> {
        let hits = {
            let mut strokes = self.strokes.write();
            // Queried under the strokes lock, so candidates agree with what's stored.
            let hits = eraser::erase_at(
                &mut *strokes,
                x,
                y,
                radius,
                |probe| self.query(probe, usize::MAX),
                StrokeCollection::samples_of,
            )?;
            if !hits.is_empty() {
                Arc::make_mut(&mut self.published.write().live.erased).extend(hits.iter().copied());
            }
            hits
        };
        if !hits.is_empty() {
            log::trace!("erased {} strokes at ({x}, {y})", hits.len());
            self.maybe_publish()?;
        }
        Ok(hits)
    }

    // ================ Publishing ================

    /// Publish a new snapshot now, if there are any edits to publish.
    pub fn flush(&self) -> Result<()> {
        self.publish(1)
    }
    fn maybe_publish(&self) -> Result<()> {
        self.publish(self.config.rebuild_threshold)
    }
    /// Build and swap in a new snapshot if at least `threshold` edits are pending.
    fn publish(&self, threshold: usize) -> Result<()> {
        if self.pending_edits() < threshold {
            return Ok(());
        }
        let Some(_publishing) = self.publishing.try_lock() else {
            // Someone else is already building, and will pick up most of our edits.
            // The rest stay visible as pending.
            return Ok(());
        };

        let (boxes, applied_pending, applied_erased) = {
            let mut strokes = self.strokes.write();
            // Editors hold the strokes lock while touching pending and erased, so this is a consistent cut.
            let live = self.live_view();
            if live.edits() < threshold {
                return Ok(());
            }
            let compacted = strokes.compact();
            if compacted != 0 {
                log::trace!("compacted {compacted} erased strokes");
            }
            let boxes: Vec<_> = strokes.active_boxes().collect();
            (boxes, live.pending.len(), live.erased)
        };

        let handle = self.indices.build(boxes)?;
        let index = match self.indices.acquire(handle) {
            Ok(index) => index,
            Err(e) => {
                // Just built it, nobody else knows the handle. Unreachable in practice.
                log::warn!("new snapshot vanished: {e}");
                return Err(e);
            }
        };
        let entries = index.len();

        let old = {
            let mut published = self.published.write();
            let live = &mut published.live;
            Arc::make_mut(&mut live.pending).drain(..applied_pending);
            if !applied_erased.is_empty() {
                Arc::make_mut(&mut live.erased).retain(|id| !applied_erased.contains(id));
            }
            live.index = index;
            std::mem::replace(&mut published.handle, handle)
        };
        log::trace!("published {handle} with {entries} strokes, replacing {old}");
        self.indices.release(old)
    }
}

impl Drop for InfiniteCanvas {
    fn drop(&mut self) {
        let handle = self.published.get_mut().handle;
        if let Err(e) = self.indices.release(handle) {
            log::warn!("releasing canvas snapshot: {e}");
        }
    }
}

impl std::fmt::Debug for InfiniteCanvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InfiniteCanvas")
            .field("view", &self.view())
            .field("strokes", &self.stroke_count())
            .field("pending_edits", &self.pending_edits())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::{ChunkError, Error};

    fn canvas(rebuild_threshold: usize) -> InfiniteCanvas {
        InfiniteCanvas::new(CanvasConfig {
            rebuild_threshold,
            ..Default::default()
        })
        .unwrap()
    }
    /// Horizontal line from `(x, y)` to `(x + 10, y)`.
    fn line(x: f32, y: f32) -> Vec<StrokeSample> {
        vec![
            StrokeSample::new(x, y, 0.25),
            StrokeSample::new(x + 5.0, y, 0.5),
            StrokeSample::new(x + 10.0, y, 0.75),
        ]
    }
    fn everywhere() -> BoundingBox {
        BoundingBox::new(-1e6, -1e6, 1e6, 1e6).unwrap()
    }

    #[test]
    fn canvas_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<InfiniteCanvas>();
    }
    #[test]
    fn pending_draws_are_queryable() {
        let canvas = canvas(100);
        let ids: Vec<_> = (0..3)
            .map(|i| canvas.draw_stroke(&line(i as f32 * 100.0, 0.0)).unwrap())
            .collect();
        assert_eq!(canvas.pending_edits(), 3);
        assert!(canvas.snapshot().is_empty());
        assert_eq!(canvas.query(&everywhere(), 10).ids, ids);

        let near_second = BoundingBox::new(104.0, -1.0, 106.0, 1.0).unwrap();
        assert_eq!(canvas.query(&near_second, 10).ids, vec![ids[1]]);

        canvas.flush().unwrap();
        assert_eq!(canvas.pending_edits(), 0);
        assert_eq!(canvas.snapshot().len(), 3);
        assert_eq!(canvas.query(&everywhere(), 10).ids, ids);
        assert_eq!(canvas.query(&near_second, 10).ids, vec![ids[1]]);
    }
    #[test]
    fn publishes_in_batches() {
        let canvas = canvas(4);
        for i in 0..3 {
            canvas.draw_stroke(&line(0.0, i as f32)).unwrap();
        }
        assert_eq!(canvas.pending_edits(), 3);
        assert!(canvas.snapshot().is_empty());

        canvas.draw_stroke(&line(0.0, 3.0)).unwrap();
        assert_eq!(canvas.pending_edits(), 0);
        assert_eq!(canvas.snapshot().len(), 4);
        // The previous snapshot was released.
        assert_eq!(canvas.indices.len(), 1);
    }
    #[test]
    fn query_truncates() {
        let canvas = canvas(100);
        for _ in 0..10 {
            canvas.draw_stroke(&line(0.0, 0.0)).unwrap();
        }
        let five = canvas.query(&everywhere(), 5);
        assert_eq!(five.len(), 5);
        assert!(five.truncated);
        let ten = canvas.query(&everywhere(), 10);
        assert_eq!(ten.len(), 10);
        assert!(!ten.truncated);
    }
    #[test]
    fn erased_strokes_hidden_before_and_after_publish() {
        let canvas = canvas(100);
        let a = canvas.draw_stroke(&line(0.0, 0.0)).unwrap();
        let b = canvas.draw_stroke(&line(0.0, 50.0)).unwrap();
        let c = canvas.draw_stroke(&line(0.0, 100.0)).unwrap();
        canvas.flush().unwrap();

        assert!(canvas.erase_stroke(a));
        // Erasing a stroke not yet published.
        let d = canvas.draw_stroke(&line(0.0, 150.0)).unwrap();
        assert!(canvas.erase_stroke(d));
        assert!(!canvas.erase_stroke(a));
        assert_eq!(canvas.query(&everywhere(), 10).ids, vec![b, c]);
        assert_eq!(canvas.stroke_count(), 2);
        assert!(canvas.samples_of(a).is_none());

        canvas.flush().unwrap();
        assert_eq!(canvas.pending_edits(), 0);
        assert_eq!(canvas.snapshot().len(), 2);
        assert_eq!(canvas.query(&everywhere(), 10).ids, vec![b, c]);
        // Still gone after compaction.
        assert!(!canvas.erase_stroke(a));
    }
    #[test]
    fn erase_at_hits_path_not_box() {
        let canvas = canvas(100);
        let flat = canvas.draw_stroke(&line(0.0, 0.0)).unwrap();
        let diagonal = canvas
            .draw_stroke(&[
                StrokeSample::new(0.0, 40.0, 1.0),
                StrokeSample::new(40.0, -40.0, 1.0),
            ])
            .unwrap();
        // Inside the diagonal's box, but far from its path.
        assert_eq!(canvas.erase_at(2.0, 1.0).unwrap(), vec![flat]);
        assert!(canvas.erase_at(2.0, 1.0).unwrap().is_empty());
        assert_eq!(canvas.query(&everywhere(), 10).ids, vec![diagonal]);
        // Published strokes are candidates too.
        canvas.flush().unwrap();
        assert_eq!(canvas.erase_at(20.0, 0.0).unwrap(), vec![diagonal]);
        assert!(canvas.query(&everywhere(), 10).ids.is_empty());
        assert_eq!(
            canvas.erase_at_radius(0.0, 0.0, 0.0),
            Err(Error::InvalidParameter(ParameterError::NonPositiveRadius))
        );
    }
    #[test]
    fn zoom_keeps_anchor() {
        let canvas = canvas(100);
        let before = canvas.project([100.0, 50.0]);
        assert_eq!(canvas.zoom(2.0, 100.0, 50.0).unwrap(), 2.0);
        assert_eq!(canvas.project([100.0, 50.0]), before);
        assert_eq!(canvas.view().scale(), 2.0);

        assert_eq!(
            canvas.zoom(0.0, 0.0, 0.0),
            Err(Error::InvalidParameter(ParameterError::NonPositiveZoom))
        );
        assert_eq!(canvas.view().scale(), 2.0);

        canvas.zoom(1000.0, 100.0, 50.0).unwrap();
        assert_eq!(canvas.view().scale(), 64.0);
        assert_eq!(canvas.project([100.0, 50.0]), before);
    }
    #[test]
    fn pan_moves_visible_region() {
        let canvas = canvas(100);
        let id = canvas.draw_stroke(&line(500.0, 500.0)).unwrap();
        assert!(canvas.visible_strokes(100.0, 100.0, 10).is_empty());
        canvas.pan(-450.0, -450.0);
        assert_eq!(canvas.visible_strokes(100.0, 100.0, 10).ids, vec![id]);
    }
    #[test]
    fn load_chunk() {
        let canvas = canvas(100);
        let samples = line(3.0, 4.0);
        let id = canvas.load_chunk(&io::encode(&samples)).unwrap();
        assert_eq!(canvas.samples_of(id).unwrap(), samples);
        assert_eq!(&*canvas.chunk_of(id).unwrap(), &*io::encode(&samples));

        let truncated = io::encode(&samples);
        let truncated = &truncated[..truncated.len() - 1];
        assert!(matches!(
            canvas.load_chunk(truncated),
            Err(Error::MalformedChunk(ChunkError::TooShort { .. }))
        ));
        assert_eq!(canvas.stroke_count(), 1);
    }
    #[test]
    fn rejects_non_finite_samples() {
        let canvas = canvas(100);
        let result = canvas.draw_stroke(&[StrokeSample::new(f32::NAN, 0.0, 1.0)]);
        assert_eq!(
            result,
            Err(Error::InvalidParameter(ParameterError::NonFinite("sample")))
        );
        assert_eq!(canvas.stroke_count(), 0);
    }
    #[test]
    fn builder_session() {
        let canvas = canvas(100);
        let mut builder = canvas.begin_stroke(0.0, 0.0, 0.5);
        builder.add_point(1.0, 1.0, 0.6);
        builder.add_point(f32::INFINITY, 1.0, 0.6);
        builder.add_point(2.0, 2.0, 0.7);
        let id = canvas.end_stroke(builder).unwrap();
        assert_eq!(canvas.samples_of(id).unwrap().len(), 3);
    }
    #[test]
    fn empty_strokes_exist_but_are_never_found() {
        let canvas = canvas(100);
        let id = canvas.draw_stroke(&[]).unwrap();
        assert_eq!(canvas.stroke_count(), 1);
        assert!(canvas.query(&everywhere(), 10).is_empty());
        assert_eq!(
            canvas.pressure_at(id, 0.5),
            Err(Error::InvalidParameter(ParameterError::EmptySamples))
        );
    }
    #[test]
    fn pressure_lookup() {
        let canvas = canvas(100);
        let id = canvas.draw_stroke(&line(0.0, 0.0)).unwrap();
        assert_eq!(canvas.pressure_at(id, 0.0).unwrap(), Some(0.25));
        assert_eq!(canvas.pressure_at(id, -3.0).unwrap(), Some(0.25));
        assert_eq!(canvas.pressure_at(id, 1.0).unwrap(), Some(0.75));
        canvas.erase_stroke(id);
        assert_eq!(canvas.pressure_at(id, 0.5).unwrap(), None);
    }
    #[test]
    fn content_bounds() {
        let canvas = canvas(100);
        assert_eq!(
            canvas.content_bounds(),
            BoundingBox::new(-1024.0, -1024.0, 1024.0, 1024.0).unwrap()
        );
        canvas.draw_stroke(&line(0.0, 0.0)).unwrap();
        canvas.draw_stroke(&line(20.0, 30.0)).unwrap();
        assert_eq!(
            canvas.content_bounds(),
            BoundingBox::new(0.0, 0.0, 30.0, 30.0).unwrap()
        );
    }
    #[test]
    fn held_snapshot_survives_publish() {
        let canvas = canvas(100);
        canvas.draw_stroke(&line(0.0, 0.0)).unwrap();
        canvas.flush().unwrap();
        let old = canvas.snapshot();
        canvas.draw_stroke(&line(0.0, 10.0)).unwrap();
        canvas.flush().unwrap();
        assert_eq!(old.len(), 1);
        assert_eq!(canvas.snapshot().len(), 2);
        assert_eq!(canvas.indices.len(), 1);
    }
    #[test]
    fn edits_proceed_while_a_view_is_held() {
        let canvas = canvas(2);
        let first = canvas.draw_stroke(&line(0.0, 0.0)).unwrap();
        let view = canvas.live_view();
        // Each of these would block forever if the view kept the published lock.
        let second = canvas.draw_stroke(&line(0.0, 10.0)).unwrap();
        assert!(canvas.erase_stroke(first));
        assert_eq!(canvas.erase_at(5.0, 10.0).unwrap(), vec![second]);
        assert!(canvas.query(&everywhere(), usize::MAX).ids.is_empty());
        // The held view still answers as of when it was taken.
        assert_eq!(view.query(&everywhere(), usize::MAX).ids, vec![first]);
    }
    #[test]
    fn concurrent_readers_and_writer() {
        let canvas = canvas(10);
        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    let mut last = 0;
                    for _ in 0..200 {
                        let found = canvas.query(&everywhere(), usize::MAX).len();
                        // Strokes are only ever added here.
                        assert!(found >= last);
                        last = found;
                    }
                });
            }
            scope.spawn(|| {
                for i in 0..200 {
                    canvas.draw_stroke(&line(i as f32, 0.0)).unwrap();
                }
            });
        });
        canvas.flush().unwrap();
        assert_eq!(canvas.query(&everywhere(), usize::MAX).len(), 200);
        assert_eq!(canvas.snapshot().len(), 200);
    }
}
