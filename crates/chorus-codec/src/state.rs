//! The serialized form of a synchronized object.

use std::io::{Read, Write};

use chorus_core::{ObjectId, PackedParams};

use crate::codec::{
    decode_params, encode_params, read_length_prefixed_bytes, read_length_prefixed_str, read_u32_le,
    read_u64_le, read_u8, write_length_prefixed_bytes, write_length_prefixed_str, write_u32_le,
    write_u64_le, write_u8,
};
use crate::error::CodecError;
use crate::{FORMAT_VERSION, MAGIC};

/// The decoded form of a serialized object payload.
///
/// A payload records everything needed to rebuild the object in another
/// context with the same types registered: the registered type name, the
/// packed parameters, one complete nested payload per distinct child
/// object, and the opaque internal-state bytes.
///
/// Object-valued parameters reference children by ID; the `children`
/// table carries each referenced object exactly once, in first-reference
/// order, so a child shared by several parameters is encoded once and
/// restored once.
///
/// # Examples
///
/// ```
/// use chorus_codec::{decode_state, encode_state, ObjectState};
///
/// let state = ObjectState {
///     name: "HarmonicBond".into(),
///     params: vec![("k".into(), chorus_core::PackedValue::Real(2.0))],
///     children: vec![],
///     internal_state: vec![],
/// };
///
/// let mut buf = Vec::new();
/// encode_state(&mut buf, &state).unwrap();
/// let got = decode_state(&mut buf.as_slice()).unwrap();
/// assert_eq!(got.name, "HarmonicBond");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectState {
    /// Registered type name of the object.
    pub name: String,
    /// Packed parameters captured at serialization time.
    pub params: PackedParams,
    /// Nested payloads of referenced objects, one per distinct ID.
    pub children: Vec<(ObjectId, Vec<u8>)>,
    /// Opaque internal-state bytes. Empty when the type has none.
    pub internal_state: Vec<u8>,
}

/// Encode an object payload (magic/version header + state).
pub fn encode_state(w: &mut dyn Write, state: &ObjectState) -> Result<(), CodecError> {
    w.write_all(&MAGIC)?;
    write_u8(w, FORMAT_VERSION)?;

    write_length_prefixed_str(w, &state.name)?;
    encode_params(w, &state.params)?;

    write_u32_le(w, state.children.len() as u32)?;
    for (id, payload) in &state.children {
        write_u64_le(w, id.0)?;
        write_length_prefixed_bytes(w, payload)?;
    }

    write_length_prefixed_bytes(w, &state.internal_state)?;
    Ok(())
}

/// Decode and validate an object payload.
pub fn decode_state(r: &mut dyn Read) -> Result<ObjectState, CodecError> {
    let mut magic = [0u8; 4];
    r.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(CodecError::InvalidMagic);
    }

    let version = read_u8(r)?;
    if version != FORMAT_VERSION {
        return Err(CodecError::UnsupportedVersion { found: version });
    }

    let name = read_length_prefixed_str(r)?;
    let params = decode_params(r)?;

    let child_count = read_u32_le(r)? as usize;
    let mut children = Vec::with_capacity(child_count.min(1024));
    for _ in 0..child_count {
        let id = ObjectId(read_u64_le(r)?);
        let payload = read_length_prefixed_bytes(r)?;
        children.push((id, payload));
    }

    let internal_state = read_length_prefixed_bytes(r)?;

    Ok(ObjectState {
        name,
        params,
        children,
        internal_state,
    })
}
