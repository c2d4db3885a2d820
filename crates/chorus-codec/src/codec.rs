//! Binary encode/decode for values, parameter lists, and replicated calls.
//!
//! All integers are little-endian. Strings and byte arrays are length-prefixed
//! with a `u32` length. The format is intentionally simple — no compression,
//! no alignment padding, no schema beyond the tag bytes.

use std::io::{Read, Write};

use chorus_core::{ObjectId, PackedParams, PackedValue, RealVec, ReplicatedCall};

use crate::error::CodecError;

/// Value tag: [`PackedValue::None`].
pub const TAG_NONE: u8 = 0;
/// Value tag: [`PackedValue::Bool`].
pub const TAG_BOOL: u8 = 1;
/// Value tag: [`PackedValue::Int`].
pub const TAG_INT: u8 = 2;
/// Value tag: [`PackedValue::Real`].
pub const TAG_REAL: u8 = 3;
/// Value tag: [`PackedValue::Str`].
pub const TAG_STR: u8 = 4;
/// Value tag: [`PackedValue::Vector`].
pub const TAG_VECTOR: u8 = 5;
/// Value tag: [`PackedValue::Object`].
pub const TAG_OBJECT: u8 = 6;

/// Call tag: [`ReplicatedCall::MakeShared`].
pub const CALL_MAKE_SHARED: u8 = 0;
/// Call tag: [`ReplicatedCall::SetParameter`].
pub const CALL_SET_PARAMETER: u8 = 1;
/// Call tag: [`ReplicatedCall::CallMethod`].
pub const CALL_CALL_METHOD: u8 = 2;
/// Call tag: [`ReplicatedCall::Release`].
pub const CALL_RELEASE: u8 = 3;

// ── Primitive writers ───────────────────────────────────────────

/// Write a single byte.
pub fn write_u8(w: &mut dyn Write, v: u8) -> Result<(), CodecError> {
    w.write_all(&[v])?;
    Ok(())
}

/// Write a little-endian u32.
pub fn write_u32_le(w: &mut dyn Write, v: u32) -> Result<(), CodecError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian u64.
pub fn write_u64_le(w: &mut dyn Write, v: u64) -> Result<(), CodecError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian i64.
pub fn write_i64_le(w: &mut dyn Write, v: i64) -> Result<(), CodecError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian f64.
pub fn write_f64_le(w: &mut dyn Write, v: f64) -> Result<(), CodecError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a length-prefixed UTF-8 string (u32 length + bytes).
pub fn write_length_prefixed_str(w: &mut dyn Write, s: &str) -> Result<(), CodecError> {
    write_u32_le(w, s.len() as u32)?;
    w.write_all(s.as_bytes())?;
    Ok(())
}

/// Write a length-prefixed byte array (u32 length + bytes).
pub fn write_length_prefixed_bytes(w: &mut dyn Write, b: &[u8]) -> Result<(), CodecError> {
    write_u32_le(w, b.len() as u32)?;
    w.write_all(b)?;
    Ok(())
}

// ── Primitive readers ───────────────────────────────────────────

/// Read a single byte.
pub fn read_u8(r: &mut dyn Read) -> Result<u8, CodecError> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

/// Read a little-endian u32.
pub fn read_u32_le(r: &mut dyn Read) -> Result<u32, CodecError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// Read a little-endian u64.
pub fn read_u64_le(r: &mut dyn Read) -> Result<u64, CodecError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

/// Read a little-endian i64.
pub fn read_i64_le(r: &mut dyn Read) -> Result<i64, CodecError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(i64::from_le_bytes(buf))
}

/// Read a little-endian f64.
pub fn read_f64_le(r: &mut dyn Read) -> Result<f64, CodecError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(f64::from_le_bytes(buf))
}

/// Read a length-prefixed UTF-8 string.
pub fn read_length_prefixed_str(r: &mut dyn Read) -> Result<String, CodecError> {
    let len = read_u32_le(r)? as usize;
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf)?;
    String::from_utf8(buf).map_err(|e| CodecError::MalformedPayload {
        detail: format!("invalid UTF-8 string: {e}"),
    })
}

/// Read a length-prefixed byte array.
pub fn read_length_prefixed_bytes(r: &mut dyn Read) -> Result<Vec<u8>, CodecError> {
    let len = read_u32_le(r)? as usize;
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf)?;
    Ok(buf)
}

// ── Value encode/decode ─────────────────────────────────────────

/// Encode a single packed value (tag byte + variant payload).
pub fn encode_value(w: &mut dyn Write, value: &PackedValue) -> Result<(), CodecError> {
    match value {
        PackedValue::None => write_u8(w, TAG_NONE),
        PackedValue::Bool(b) => {
            write_u8(w, TAG_BOOL)?;
            write_u8(w, u8::from(*b))
        }
        PackedValue::Int(v) => {
            write_u8(w, TAG_INT)?;
            write_i64_le(w, *v)
        }
        PackedValue::Real(v) => {
            write_u8(w, TAG_REAL)?;
            write_f64_le(w, *v)
        }
        PackedValue::Str(s) => {
            write_u8(w, TAG_STR)?;
            write_length_prefixed_str(w, s)
        }
        PackedValue::Vector(v) => {
            write_u8(w, TAG_VECTOR)?;
            write_u32_le(w, v.len() as u32)?;
            for &x in v.iter() {
                write_f64_le(w, x)?;
            }
            Ok(())
        }
        PackedValue::Object(id) => {
            write_u8(w, TAG_OBJECT)?;
            write_u64_le(w, id.0)
        }
    }
}

/// Decode a single packed value.
pub fn decode_value(r: &mut dyn Read) -> Result<PackedValue, CodecError> {
    match read_u8(r)? {
        TAG_NONE => Ok(PackedValue::None),
        TAG_BOOL => match read_u8(r)? {
            0 => Ok(PackedValue::Bool(false)),
            1 => Ok(PackedValue::Bool(true)),
            flag => Err(CodecError::MalformedPayload {
                detail: format!("invalid bool flag: {flag}"),
            }),
        },
        TAG_INT => Ok(PackedValue::Int(read_i64_le(r)?)),
        TAG_REAL => Ok(PackedValue::Real(read_f64_le(r)?)),
        TAG_STR => Ok(PackedValue::Str(read_length_prefixed_str(r)?)),
        TAG_VECTOR => {
            let len = read_u32_le(r)? as usize;
            let mut v = RealVec::with_capacity(len);
            for _ in 0..len {
                v.push(read_f64_le(r)?);
            }
            Ok(PackedValue::Vector(v))
        }
        TAG_OBJECT => Ok(PackedValue::Object(ObjectId(read_u64_le(r)?))),
        tag => Err(CodecError::UnknownValueTag { tag }),
    }
}

// ── Parameter list encode/decode ────────────────────────────────

/// Encode a named parameter list (u32 count + name/value entries).
pub fn encode_params(w: &mut dyn Write, params: &PackedParams) -> Result<(), CodecError> {
    write_u32_le(w, params.len() as u32)?;
    for (name, value) in params {
        write_length_prefixed_str(w, name)?;
        encode_value(w, value)?;
    }
    Ok(())
}

/// Decode a named parameter list.
pub fn decode_params(r: &mut dyn Read) -> Result<PackedParams, CodecError> {
    let count = read_u32_le(r)? as usize;
    let mut params = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        let name = read_length_prefixed_str(r)?;
        let value = decode_value(r)?;
        params.push((name, value));
    }
    Ok(params)
}

// ── Call encode/decode ──────────────────────────────────────────

/// Encode a replicated call (tag byte + variant payload).
///
/// Calls are encoded headerless: they travel inside transport frames
/// whose framing the transport owns, not in durable payloads.
pub fn encode_call(w: &mut dyn Write, call: &ReplicatedCall) -> Result<(), CodecError> {
    match call {
        ReplicatedCall::MakeShared {
            id,
            name,
            params,
            internal_state,
        } => {
            write_u8(w, CALL_MAKE_SHARED)?;
            write_u64_le(w, id.0)?;
            write_length_prefixed_str(w, name)?;
            encode_params(w, params)?;
            write_length_prefixed_bytes(w, internal_state)
        }
        ReplicatedCall::SetParameter { id, name, value } => {
            write_u8(w, CALL_SET_PARAMETER)?;
            write_u64_le(w, id.0)?;
            write_length_prefixed_str(w, name)?;
            encode_value(w, value)
        }
        ReplicatedCall::CallMethod { id, name, args } => {
            write_u8(w, CALL_CALL_METHOD)?;
            write_u64_le(w, id.0)?;
            write_length_prefixed_str(w, name)?;
            encode_params(w, args)
        }
        ReplicatedCall::Release { id } => {
            write_u8(w, CALL_RELEASE)?;
            write_u64_le(w, id.0)
        }
    }
}

/// Decode a replicated call.
pub fn decode_call(r: &mut dyn Read) -> Result<ReplicatedCall, CodecError> {
    match read_u8(r)? {
        CALL_MAKE_SHARED => Ok(ReplicatedCall::MakeShared {
            id: ObjectId(read_u64_le(r)?),
            name: read_length_prefixed_str(r)?,
            params: decode_params(r)?,
            internal_state: read_length_prefixed_bytes(r)?,
        }),
        CALL_SET_PARAMETER => Ok(ReplicatedCall::SetParameter {
            id: ObjectId(read_u64_le(r)?),
            name: read_length_prefixed_str(r)?,
            value: decode_value(r)?,
        }),
        CALL_CALL_METHOD => Ok(ReplicatedCall::CallMethod {
            id: ObjectId(read_u64_le(r)?),
            name: read_length_prefixed_str(r)?,
            args: decode_params(r)?,
        }),
        CALL_RELEASE => Ok(ReplicatedCall::Release {
            id: ObjectId(read_u64_le(r)?),
        }),
        tag => Err(CodecError::UnknownCallTag { tag }),
    }
}
