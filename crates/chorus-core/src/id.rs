//! Strongly-typed identifiers for synchronized objects and map entries.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies a synchronized object within one context.
///
/// IDs are issued by the owning context from a monotonic counter and are
/// never reused for the lifetime of that context. An ID is meaningful
/// only to the context that issued it; resolving it elsewhere is a
/// dispatch error, not a lookup miss.
///
/// `ObjectId(0)` is reserved and never issued. It appears only in
/// diagnostics as "no object".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u64);

impl ObjectId {
    /// The reserved null ID. Never issued by an allocator.
    pub const NULL: ObjectId = ObjectId(0);
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ObjectId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Monotonic allocator for [`ObjectId`]s.
///
/// Each context owns one allocator. The first issued ID is `ObjectId(1)`;
/// every call returns an ID never returned before by this allocator.
/// Thread-safe.
#[derive(Debug)]
pub struct IdAllocator {
    next: AtomicU64,
}

impl IdAllocator {
    /// Create an allocator whose first issued ID is `ObjectId(1)`.
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Issue a fresh ID, unique within this allocator.
    pub fn next(&self) -> ObjectId {
        ObjectId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Integer key of an entry in a keyed object collection.
///
/// Keys are either chosen explicitly by the caller or assigned by the
/// collection's backing store. Assigned keys are never reused within a
/// collection's lifetime, even after the entry at that key is erased.
///
/// # Examples
///
/// ```
/// use chorus_core::MapKey;
///
/// let k = MapKey(2);
/// assert_eq!(k.successor(), MapKey(3));
/// assert_eq!(MapKey(u32::MAX).successor(), MapKey(u32::MAX));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MapKey(pub u32);

impl MapKey {
    /// The key one past `self`. Saturates at `u32::MAX` instead of wrapping.
    pub fn successor(self) -> MapKey {
        MapKey(self.0.saturating_add(1))
    }
}

impl fmt::Display for MapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for MapKey {
    fn from(v: u32) -> Self {
        Self(v)
    }
}
