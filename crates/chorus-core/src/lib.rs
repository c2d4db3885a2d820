//! Core types for the chorus object-synchronization layer.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental vocabulary shared by every chorus crate: object and
//! map-entry identifiers, packed parameter values, replicated call
//! payloads, and the dispatch/factory/group error types.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod call;
pub mod error;
pub mod id;
pub mod value;

pub use call::{CallOutcome, ReplicatedCall};
pub use error::{DispatchError, FactoryError, GroupError, TransportError};
pub use id::{IdAllocator, MapKey, ObjectId};
pub use value::{PackedParams, PackedValue, RealVec};
