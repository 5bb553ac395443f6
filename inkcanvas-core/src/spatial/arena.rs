use std::sync::Arc;

use super::{QueryResult, SpatialIndex};
use crate::error::{Error, Result};
use crate::id::{Id, IdServer};
use crate::stroke::{BoundingBox, StrokeId};

/// Checked reference to a snapshot owned by an [`IndexArena`].
///
/// Handles are never reused, so once released every use of the handle fails with
/// [`Error::UseAfterRelease`] rather than reaching some other snapshot.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IndexHandle(Id<SpatialIndex>);
impl IndexHandle {
    #[must_use]
    pub fn get(&self) -> u64 {
        self.0.get()
    }
}
impl std::fmt::Display for IndexHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
impl std::fmt::Debug for IndexHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Owner of spatial index snapshots.
///
/// Snapshots are shared out as `Arc`s, so releasing a handle while a query is running against it is safe -
/// the query finishes against the data it started with, and the storage is freed when it's done.
/// Dropping the arena releases every snapshot still live.
#[derive(Default)]
pub struct IndexArena {
    ids: IdServer<SpatialIndex>,
    live: parking_lot::RwLock<hashbrown::HashMap<IndexHandle, Arc<SpatialIndex>>>,
}
impl IndexArena {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    /// Build a snapshot from `(box, id)` pairs and take ownership of it.
    #[must_use = "the snapshot lives until its handle is released"]
    pub fn build(
        &self,
        boxes: impl IntoIterator<Item = (BoundingBox, StrokeId)>,
    ) -> Result<IndexHandle> {
        self.insert(SpatialIndex::build(boxes))
    }
    /// Take ownership of an already built snapshot.
    #[must_use = "the snapshot lives until its handle is released"]
    pub fn insert(&self, index: SpatialIndex) -> Result<IndexHandle> {
        let handle = IndexHandle(self.ids.next()?);
        self.live.write().insert(handle, Arc::new(index));
        log::trace!("{handle} acquired");
        Ok(handle)
    }
    /// Borrow the snapshot for as long as the caller likes, independent of the handle's lifetime.
    pub fn acquire(&self, handle: IndexHandle) -> Result<Arc<SpatialIndex>> {
        self.live
            .read()
            .get(&handle)
            .cloned()
            .ok_or(Error::UseAfterRelease(handle))
    }
    /// Range query against the snapshot behind `handle`.
    pub fn query(
        &self,
        handle: IndexHandle,
        query: &BoundingBox,
        max_results: usize,
    ) -> Result<QueryResult> {
        // Lock only long enough to grab the snapshot.
        let index = self.acquire(handle)?;
        Ok(index.query(query, max_results))
    }
    /// Free the snapshot. Releasing twice is an error, not a no-op.
    pub fn release(&self, handle: IndexHandle) -> Result<()> {
        match self.live.write().remove(&handle) {
            Some(_) => {
                log::trace!("{handle} released");
                Ok(())
            }
            None => Err(Error::UseAfterRelease(handle)),
        }
    }
    /// Build a snapshot that is released when the returned guard drops.
    pub fn scoped(
        &self,
        boxes: impl IntoIterator<Item = (BoundingBox, StrokeId)>,
    ) -> Result<ScopedIndex<'_>> {
        Ok(ScopedIndex {
            handle: self.build(boxes)?,
            arena: self,
        })
    }
    /// Number of live snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.read().len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
impl Drop for IndexArena {
    fn drop(&mut self) {
        let live = self.live.get_mut();
        if !live.is_empty() {
            log::trace!("releasing {} snapshots with their arena", live.len());
        }
    }
}
impl std::fmt::Debug for IndexArena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexArena")
            .field("live", &self.len())
            .finish_non_exhaustive()
    }
}

/// A snapshot released exactly once, when this guard goes out of scope.
pub struct ScopedIndex<'arena> {
    arena: &'arena IndexArena,
    handle: IndexHandle,
}
impl ScopedIndex<'_> {
    #[must_use]
    pub fn handle(&self) -> IndexHandle {
        self.handle
    }
    pub fn query(&self, query: &BoundingBox, max_results: usize) -> Result<QueryResult> {
        self.arena.query(self.handle, query, max_results)
    }
}
impl Drop for ScopedIndex<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.arena.release(self.handle) {
            // Someone released our handle out from under us through the arena.
            log::warn!("scoped index: {e}");
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn boxes() -> Vec<(BoundingBox, StrokeId)> {
        (1..=3)
            .map(|raw| {
                let x = raw as f32 * 10.0;
                (
                    BoundingBox::new(x, 0.0, x + 5.0, 5.0).unwrap(),
                    StrokeId::from_raw(raw).unwrap(),
                )
            })
            .collect()
    }

    #[test]
    fn build_query_release() {
        let arena = IndexArena::new();
        let handle = arena.build(boxes()).unwrap();
        assert_eq!(arena.len(), 1);

        let query = BoundingBox::new(0.0, 0.0, 100.0, 100.0).unwrap();
        assert_eq!(arena.query(handle, &query, 10).unwrap().len(), 3);

        arena.release(handle).unwrap();
        assert!(arena.is_empty());
        assert_eq!(
            arena.query(handle, &query, 10),
            Err(Error::UseAfterRelease(handle))
        );
        assert_eq!(arena.release(handle), Err(Error::UseAfterRelease(handle)));
        assert!(arena.acquire(handle).is_err());
    }
    #[test]
    fn empty_build_is_valid() {
        let arena = IndexArena::new();
        let handle = arena.build(std::iter::empty()).unwrap();
        let query = BoundingBox::new(0.0, 0.0, 1.0, 1.0).unwrap();
        let result = arena.query(handle, &query, 10).unwrap();
        assert!(result.is_empty() && !result.truncated);
    }
    #[test]
    fn handles_never_reused() {
        let arena = IndexArena::new();
        let first = arena.build(boxes()).unwrap();
        arena.release(first).unwrap();
        let second = arena.build(boxes()).unwrap();
        assert_ne!(first, second);
        assert!(arena.acquire(first).is_err());
    }
    #[test]
    fn acquired_snapshot_outlives_release() {
        let arena = IndexArena::new();
        let handle = arena.build(boxes()).unwrap();
        let snapshot = arena.acquire(handle).unwrap();
        arena.release(handle).unwrap();
        let query = BoundingBox::new(10.0, 0.0, 12.0, 1.0).unwrap();
        assert_eq!(snapshot.query(&query, 10).len(), 1);
    }
    #[test]
    fn scoped_releases_on_drop() {
        let arena = IndexArena::new();
        let handle = {
            let scoped = arena.scoped(boxes()).unwrap();
            assert_eq!(arena.len(), 1);
            scoped.handle()
        };
        assert!(arena.is_empty());
        assert!(arena.acquire(handle).is_err());
    }
}
