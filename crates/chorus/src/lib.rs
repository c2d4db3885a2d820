//! Chorus: synchronized object graphs replicated across worker groups.
//!
//! This is the top-level facade crate that re-exports the public API
//! from all chorus sub-crates. For most users, adding `chorus` as a
//! single dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use chorus::prelude::*;
//!
//! // A synchronized type: one parameter, nothing else.
//! #[derive(Default)]
//! struct Dial {
//!     level: i64,
//! }
//!
//! impl SyncObject for Dial {
//!     fn parameter_names(&self) -> &'static [&'static str] {
//!         &["level"]
//!     }
//!     fn set_parameter(&mut self, name: &str, value: &Value) -> Result<(), DispatchError> {
//!         match name {
//!             "level" => {
//!                 self.level = value.as_int()?;
//!                 Ok(())
//!             }
//!             _ => Err(DispatchError::UnknownParameter { name: name.into() }),
//!         }
//!     }
//!     fn get_parameter(&self, name: &str) -> Result<Value, DispatchError> {
//!         match name {
//!             "level" => Ok(Value::Int(self.level)),
//!             _ => Err(DispatchError::UnknownParameter { name: name.into() }),
//!         }
//!     }
//! }
//!
//! let mut factory = Factory::new();
//! factory.register::<Dial>("Dial").unwrap();
//! let ctx = LocalContext::new(factory);
//!
//! let mut params = ParamMap::new();
//! params.insert("level".into(), Value::Int(3));
//! let dial = ctx.make_shared("Dial", &params).unwrap();
//! dial.set_parameter("level", &Value::Int(5)).unwrap();
//!
//! // Capture the object and rebuild an equivalent one.
//! let payload = dial.serialize().unwrap();
//! let copy = ObjectHandle::deserialize(&payload, &*ctx).unwrap();
//! assert_eq!(copy.get_parameter("level").unwrap(), Value::Int(5));
//! ```
//!
//! To replicate instead of staying local, spawn a worker group and
//! swap [`LocalContext`](prelude::LocalContext) for
//! [`group::GroupContext`]; every handle call then broadcasts to the
//! workers and blocks until all of them applied it.
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in
//! the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `chorus-core` | IDs, packed values, replicated calls, shared errors |
//! | [`codec`] | `chorus-codec` | Wire format for calls and state payloads |
//! | [`object`] | `chorus-object` | Handles, factory, contexts, graph serialization |
//! | [`map`] | `chorus-map` | Keyed collection mirrored into a backing store |
//! | [`group`] | `chorus-group` | Broadcast replication across worker threads |
//! | [`interactions`] | `chorus-interactions` | Reference bonded-interaction surface |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// IDs, packed values, replicated calls, and shared errors
/// (`chorus-core`).
///
/// The identity types [`types::ObjectId`] and [`types::MapKey`], the
/// wire-side [`types::PackedValue`], and the error taxonomy every other
/// crate builds on.
pub use chorus_core as types;

/// Wire format for replicated calls and state payloads
/// (`chorus-codec`).
///
/// Length-prefixed little-endian encoding with a magic-and-version
/// header on state payloads; see [`codec::encode_state`] and
/// [`codec::decode_state`].
pub use chorus_codec as codec;

/// Handles, factory, contexts, and graph serialization
/// (`chorus-object`).
///
/// The [`object::SyncObject`] trait is the main extension point; the
/// [`object::Context`] trait decides whether mutations stay local or
/// replicate.
pub use chorus_object as object;

/// Keyed collection mirrored into a backing store (`chorus-map`).
///
/// [`map::ObjectMap`] keeps handles on the synchronized side and pushes
/// every change through a [`map::CoreMirror`] before touching its own
/// entries.
pub use chorus_map as map;

/// Broadcast replication across worker threads (`chorus-group`).
///
/// [`group::GroupContext`] originates calls, [`group::ThreadGroup`]
/// carries them to one [`group::WorkerNode`] per thread, and every
/// broadcast blocks until all workers applied it.
pub use chorus_group as group;

/// Reference bonded-interaction surface (`chorus-interactions`).
///
/// Bond handle types, the plain-data [`interactions::BondTable`], and
/// the mirrored [`interactions::Interactions`] map.
pub use chorus_interactions as interactions;

/// Common imports for typical chorus usage.
///
/// ```rust
/// use chorus::prelude::*;
/// ```
///
/// This imports the most frequently used types: the object and context
/// traits, handles, values, the mirrored map, and the group surface.
pub mod prelude {
    // Identity and wire types
    pub use chorus_core::{CallOutcome, MapKey, ObjectId, ReplicatedCall};

    // Errors
    pub use chorus_core::{DispatchError, FactoryError, GroupError, TransportError};
    pub use chorus_object::{DeserializeError, HandleError, MakeError, SerializeError};

    // Objects and contexts
    pub use chorus_object::{
        Context, Factory, LocalContext, ObjectHandle, ObjectRef, ParamMap, SyncObject, Value,
    };

    // Mirrored collections
    pub use chorus_map::{CoreError, CoreMirror, ObjectMap};

    // Replication
    pub use chorus_group::{
        GroupConfig, GroupContext, GroupMetrics, GroupTransport, ThreadGroup,
    };
}
