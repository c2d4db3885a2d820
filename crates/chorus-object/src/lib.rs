//! Synchronized object handles, factory, and contexts.
//!
//! One object graph, many replicas: every object lives behind an
//! [`ObjectHandle`] owned by a [`Context`]. Mutations go through the
//! handle, which applies them to the local instance and then hands them
//! to the context for replication. The [`LocalContext`] here replicates
//! to nobody; the group context in `chorus-group` broadcasts every call
//! and blocks until all replicas applied it.
//!
//! # Architecture
//!
//! - [`SyncObject`] is the trait synchronized types implement: named
//!   parameters, named methods, optional opaque internal state
//! - [`Factory`] maps registered type names to constructors and back
//! - [`ObjectHandle`] pairs an instance with its identity and context
//! - [`Value`] is the live parameter type; packing swaps live object
//!   references for IDs before anything crosses a boundary
//! - [`serial`] captures whole graphs into self-describing payloads
//!   and restores them in any context with the same types registered
//!
//! Identities are context-issued and never reused. A restored graph
//! gets fresh identities; it matches the captured one observationally,
//! parameter by parameter, not by ID.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod context;
pub mod error;
pub mod factory;
pub mod object;
pub mod serial;
pub mod value;

pub use context::{build_object, Context, LocalContext};
pub use error::{DeserializeError, HandleError, MakeError, SerializeError};
pub use factory::Factory;
pub use object::{ObjectHandle, ObjectRef, SyncObject};
pub use value::{
    pack_params, pack_value, unpack_params, unpack_value, ParamMap, ResolveObject,
    UnresolvedObject, Value,
};
