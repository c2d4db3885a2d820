//! The seam between a keyed collection and its backing store.

use std::error::Error;
use std::fmt;

use chorus_core::MapKey;
use chorus_object::ObjectRef;

/// A backing store could not apply a mirrored change.
///
/// The store may have half-applied it, so the caller must treat the
/// mirror as desynchronized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoreError {
    /// What the store could not do.
    pub detail: String,
}

impl CoreError {
    /// A new error from anything stringly descriptive.
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.detail)
    }
}

impl Error for CoreError {}

/// Mirrors every change of an [`ObjectMap`](crate::ObjectMap) into a
/// backing store.
///
/// The map calls a hook before updating its own entries, so the store
/// always hears about a change first. The hooks are a contract, not a
/// runtime-checked interface: an implementation that does not keep them
/// faithful to its store silently breaks the mirror invariant.
///
/// # Contract
///
/// - Keys assigned by [`CoreMirror::insert_in_core`] are unoccupied at
///   the time of assignment and never reassigned within the store's
///   lifetime, even after the entry is erased.
/// - [`CoreMirror::insert_at_in_core`] advances the store's key
///   assignment past `key`, so a later assigned key never collides
///   with an explicitly chosen one.
/// - Key assignment is a deterministic function of the operations
///   applied so far. Replicated stores rely on this: every replica
///   applies the same operation stream and must end up assigning the
///   same keys.
pub trait CoreMirror {
    /// Store `element` under a store-chosen key and return that key.
    fn insert_in_core(&mut self, element: &ObjectRef) -> Result<MapKey, CoreError>;

    /// Store `element` under the caller-chosen `key`.
    fn insert_at_in_core(&mut self, key: MapKey, element: &ObjectRef) -> Result<(), CoreError>;

    /// Remove the entry at `key` from the store.
    fn erase_in_core(&mut self, key: MapKey) -> Result<(), CoreError>;

    /// Number of entries the store currently holds.
    fn len_in_core(&self) -> usize;
}
