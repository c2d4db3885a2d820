//! Self-describing capture and restore of object graphs.

use chorus_codec::{decode_state, encode_state, ObjectState};
use chorus_core::{ObjectId, PackedParams};
use indexmap::IndexMap;

use crate::context::Context;
use crate::error::{DeserializeError, SerializeError};
use crate::object::{ObjectHandle, ObjectRef};
use crate::value::{pack_value, unpack_params, Value};

/// Capture `handle` and every object reachable from it into one
/// payload.
///
/// Children (object-valued parameters) are recorded once per distinct
/// identity, in first-reference order, each as a complete nested
/// payload. Restoring therefore preserves sharing: a child referenced
/// through two parameters comes back as one object referenced twice.
///
/// # Contract
///
/// The reachable graph must be acyclic; serializing a cycle recurses
/// without bound.
pub fn serialize(handle: &ObjectHandle) -> Result<Vec<u8>, SerializeError> {
    let state = capture(handle)?;
    let mut payload = Vec::new();
    encode_state(&mut payload, &state)?;
    Ok(payload)
}

fn capture(handle: &ObjectHandle) -> Result<ObjectState, SerializeError> {
    let ctx = handle.context().ok_or(SerializeError::ContextGone)?;
    let name = ctx.name_of(handle).map_err(SerializeError::Factory)?;

    let mut params = PackedParams::new();
    let mut children: Vec<(ObjectId, Vec<u8>)> = Vec::new();
    for &param in handle.parameter_names() {
        let value = handle
            .get_parameter_raw(param)
            .map_err(|reason| SerializeError::Parameter {
                name: param.to_owned(),
                reason,
            })?;
        if let Value::Object(child) = &value {
            if !children.iter().any(|(id, _)| *id == child.id()) {
                let nested = serialize(child)?;
                children.push((child.id(), nested));
            }
        }
        params.push((param.to_owned(), pack_value(&value)));
    }
    let internal_state = handle.internal_state()?;

    Ok(ObjectState {
        name,
        params,
        children,
        internal_state,
    })
}

/// Rebuild an object graph from a payload.
///
/// Children are constructed before their parent through
/// [`Context::make_shared_with_state`], so on a replicating context
/// every restored object is individually addressable. Restored objects
/// get fresh identities; equality with the captured originals is
/// observational, not by ID. Any failure releases everything built so
/// far, leaving no partially restored graph behind.
pub fn deserialize(payload: &[u8], ctx: &dyn Context) -> Result<ObjectRef, DeserializeError> {
    restore(payload, ctx, false)
}

/// Rebuild a payload as an interior part of a parent object's state.
///
/// Construction routes through [`Context::make_interior`], so on a
/// replicating context nothing is broadcast; the parent's state bytes
/// already travel to every replica. For use by
/// [`SyncObject::set_internal_state`](crate::SyncObject::set_internal_state)
/// implementations.
pub fn deserialize_interior(
    payload: &[u8],
    ctx: &dyn Context,
) -> Result<ObjectRef, DeserializeError> {
    restore(payload, ctx, true)
}

fn restore(payload: &[u8], ctx: &dyn Context, interior: bool) -> Result<ObjectRef, DeserializeError> {
    let mut cursor = payload;
    let state = decode_state(&mut cursor)?;

    // Children first, keyed by the ID they carried when captured.
    let mut restored: IndexMap<ObjectId, ObjectRef> = IndexMap::new();
    for (recorded_id, nested) in &state.children {
        let child = restore(nested, ctx, interior)?;
        restored.insert(*recorded_id, child);
    }

    let params = unpack_params(&state.params, &restored)
        .map_err(|err| DeserializeError::UnknownChild { id: err.id })?;

    let made = if interior {
        ctx.make_interior(&state.name, &params, &state.internal_state)
    } else {
        ctx.make_shared_with_state(&state.name, &params, &state.internal_state)
    }?;
    Ok(made)
}
