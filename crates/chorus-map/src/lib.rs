//! Keyed object collection mirrored into an opaque backing store.
//!
//! [`ObjectMap`] keeps synchronized handles under `u32` keys and calls
//! a [`CoreMirror`] hook before touching its own entries, so the store
//! and the map never disagree about membership. Key assignment belongs
//! to the store: plain inserts return the store's choice, and the map
//! only shadows the counter to answer queries locally.
//!
//! The map is itself a [`SyncObject`](chorus_object::SyncObject): its
//! `insert`, `erase`, and `clear` methods replicate through whatever
//! context owns it, and its internal state carries every entry (with
//! keys) plus the next assignable key, so a restored map reproduces
//! the key space exactly.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod core;
pub mod map;

pub use crate::core::{CoreError, CoreMirror};
pub use map::ObjectMap;
