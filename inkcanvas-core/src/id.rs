//! # IDs
//! Strokes and index snapshots need identifiers that are unique within their owner. This is implemented
//! via the `Id<T>` type, namespaced by the marker type `T` so ids of different kinds can never be mixed up.
//!
//! Ids are handed out by an [`IdServer`], owned by whatever owns the identified things (a canvas owns
//! the server for its strokes, an index arena owns the server for its handles). There is no process-wide
//! server. Within one server, ids are strictly increasing in allocation order.

use std::sync::atomic::{AtomicU64, Ordering};

/// Id that is unique within the [`IdServer`] that produced it.
/// Ids with different types may share a value but should not be considered equal.
pub struct Id<T> {
    id: std::num::NonZeroU64,
    // Namespace marker
    _phantom: std::marker::PhantomData<fn() -> T>,
}
impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for Id<T> {}
impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl<T> Eq for Id<T> {}
impl<T> PartialOrd for Id<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl<T> Ord for Id<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}
impl<T> std::hash::Hash for Id<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> Id<T> {
    /// Rebuild an id from a raw value, e.g. one read back from storage.
    /// `None` if `raw` is zero, which is never a valid id.
    #[must_use]
    pub fn from_raw(raw: u64) -> Option<Self> {
        std::num::NonZeroU64::new(raw).map(|id| Self {
            id,
            _phantom: std::marker::PhantomData,
        })
    }
    /// Get the raw numeric value of this ID.
    /// IDs from differing namespaces may share the same numeric ID!
    #[must_use]
    pub fn get(&self) -> u64 {
        self.id.get()
    }
}
impl<T> std::fmt::Display for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = std::any::type_name::<T>();
        // Strip the module path.
        write!(f, "{}#{}", name.rsplit("::").next().unwrap_or(name), self.id)
    }
}
impl<T> std::fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <Id<T> as std::fmt::Display>::fmt(self, f)
    }
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdError {
    #[error("{0} id space exhausted")]
    Exhausted(&'static str),
}

/// Source of fresh ids for one namespace.
pub struct IdServer<T> {
    /// The next id to hand out. Zero is never handed out.
    next: AtomicU64,
    _phantom: std::marker::PhantomData<fn() -> T>,
}
impl<T> Default for IdServer<T> {
    fn default() -> Self {
        Self {
            next: AtomicU64::new(1),
            _phantom: std::marker::PhantomData,
        }
    }
}
impl<T> std::fmt::Debug for IdServer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdServer")
            .field("next", &self.next.load(Ordering::Relaxed))
            .finish()
    }
}
impl<T> IdServer<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    /// Make sure every id handed out in the future compares greater than `seen`.
    /// Used when adopting ids that were allocated elsewhere.
    pub fn reserve_through(&self, seen: Id<T>) {
        self.next
            .fetch_max(seen.get().saturating_add(1), Ordering::Relaxed);
    }
    /// Allocate a single id.
    pub fn next(&self) -> Result<Id<T>, IdError> {
        self.many(1)?.next().ok_or(IdError::Exhausted(std::any::type_name::<T>()))
    }
    /// Allocate many IDs at once. Much faster than doing them one at a time for bulk operations and doesn't allocate.
    ///
    /// IDs are assigned eagerly - dropping the returned iterator early does *not* recycle the unused IDs.
    /// On exhaustion no ids are handed out and the server stays exhausted.
    pub fn many(&self, count: usize) -> Result<impl ExactSizeIterator<Item = Id<T>>, IdError> {
        // Count of 0 is not a logic error. it is handled gracefully :3
        let count_u64 = count as u64;
        let start = self
            .next
            // The past-the-end value must itself be representable, so `u64::MAX` is never handed out.
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |next| {
                next.checked_add(count_u64)
            })
            .map_err(|_| {
                log::error!("{} ID overflow!", std::any::type_name::<T>());
                IdError::Exhausted(std::any::type_name::<T>())
            })?;

        // Must use `usize` indices for ExactSizeIterator, as absolute values of the IDs would
        // overflow a 32-bit system's usize
        Ok((0..count).map(move |idx| Id {
            // Non-zero-ness: start is at least one and we checked for overflow above.
            id: std::num::NonZeroU64::new(start + idx as u64).unwrap(),
            _phantom: std::marker::PhantomData,
        }))
    }
}
