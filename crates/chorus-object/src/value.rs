//! Live parameter values and the packing step that prepares them for
//! the wire.
//!
//! A [`Value`] can hold a live object reference, so values never cross
//! thread or process boundaries. Packing replaces references with IDs
//! ([`chorus_core::PackedValue`]); unpacking resolves IDs back to live
//! handles through a [`ResolveObject`] lookup.

use std::error::Error;
use std::fmt;
use std::rc::Rc;

use chorus_core::{DispatchError, MapKey, ObjectId, PackedParams, PackedValue, RealVec};
use indexmap::IndexMap;

use crate::object::ObjectRef;

/// Named parameters in insertion order.
///
/// Iteration order is the order entries were inserted, which keeps
/// packed payloads deterministic.
pub type ParamMap = IndexMap<String, Value>;

/// A dynamically typed parameter or argument value.
///
/// # Examples
///
/// ```
/// use chorus_object::Value;
///
/// let v = Value::from(2.5);
/// assert_eq!(v.as_real().unwrap(), 2.5);
/// assert!(v.as_bool().is_err());
///
/// // Integers widen to reals on demand.
/// assert_eq!(Value::Int(3).as_real().unwrap(), 3.0);
/// ```
#[derive(Clone, Debug)]
pub enum Value {
    /// The absence of a value.
    None,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A double-precision real.
    Real(f64),
    /// A string.
    Str(String),
    /// A vector of reals.
    Vector(RealVec),
    /// A live reference to another synchronized object.
    Object(ObjectRef),
}

impl Value {
    /// Short name of the variant, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Real(_) => "real",
            Self::Str(_) => "str",
            Self::Vector(_) => "vector",
            Self::Object(_) => "object",
        }
    }

    /// `true` if this is [`Value::None`].
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// The boolean payload, or [`DispatchError::InvalidValue`].
    pub fn as_bool(&self) -> Result<bool, DispatchError> {
        match self {
            Self::Bool(b) => Ok(*b),
            other => Err(other.mismatch("bool")),
        }
    }

    /// The integer payload, or [`DispatchError::InvalidValue`].
    pub fn as_int(&self) -> Result<i64, DispatchError> {
        match self {
            Self::Int(i) => Ok(*i),
            other => Err(other.mismatch("int")),
        }
    }

    /// The real payload, or [`DispatchError::InvalidValue`].
    ///
    /// Integers widen to reals; integers wider than the `f64` mantissa
    /// lose precision.
    pub fn as_real(&self) -> Result<f64, DispatchError> {
        match self {
            Self::Real(r) => Ok(*r),
            Self::Int(i) => Ok(*i as f64),
            other => Err(other.mismatch("real")),
        }
    }

    /// The string payload, or [`DispatchError::InvalidValue`].
    pub fn as_str(&self) -> Result<&str, DispatchError> {
        match self {
            Self::Str(s) => Ok(s),
            other => Err(other.mismatch("str")),
        }
    }

    /// The vector payload, or [`DispatchError::InvalidValue`].
    pub fn as_vector(&self) -> Result<&RealVec, DispatchError> {
        match self {
            Self::Vector(v) => Ok(v),
            other => Err(other.mismatch("vector")),
        }
    }

    /// The object payload, or [`DispatchError::InvalidValue`].
    pub fn as_object(&self) -> Result<&ObjectRef, DispatchError> {
        match self {
            Self::Object(handle) => Ok(handle),
            other => Err(other.mismatch("object")),
        }
    }

    fn mismatch(&self, expected: &'static str) -> DispatchError {
        DispatchError::InvalidValue {
            expected,
            got: self.kind_name().to_owned(),
        }
    }
}

/// Object references compare by handle identity, not by content. Two
/// handles are equal only if they are the same allocation.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::None, Self::None) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Real(a), Self::Real(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Vector(a), Self::Vector(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(r: f64) -> Self {
        Self::Real(r)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<RealVec> for Value {
    fn from(v: RealVec) -> Self {
        Self::Vector(v)
    }
}

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Self::Vector(RealVec::from_vec(v))
    }
}

impl From<ObjectRef> for Value {
    fn from(handle: ObjectRef) -> Self {
        Self::Object(handle)
    }
}

impl From<MapKey> for Value {
    fn from(key: MapKey) -> Self {
        Self::Int(i64::from(key.0))
    }
}

// ── Packing ─────────────────────────────────────────────────────────────────

/// Replace a live value with its wire form.
///
/// Object references become bare IDs; everything else is copied.
pub fn pack_value(value: &Value) -> PackedValue {
    match value {
        Value::None => PackedValue::None,
        Value::Bool(b) => PackedValue::Bool(*b),
        Value::Int(i) => PackedValue::Int(*i),
        Value::Real(r) => PackedValue::Real(*r),
        Value::Str(s) => PackedValue::Str(s.clone()),
        Value::Vector(v) => PackedValue::Vector(v.clone()),
        Value::Object(handle) => PackedValue::Object(handle.id()),
    }
}

/// Pack every entry of a parameter map, preserving order.
pub fn pack_params(params: &ParamMap) -> PackedParams {
    params
        .iter()
        .map(|(name, value)| (name.clone(), pack_value(value)))
        .collect()
}

/// Lookup from object ID to live handle, used when unpacking.
pub trait ResolveObject {
    /// The live handle for `id`, if this resolver knows it.
    fn resolve(&self, id: ObjectId) -> Option<ObjectRef>;
}

impl ResolveObject for IndexMap<ObjectId, ObjectRef> {
    fn resolve(&self, id: ObjectId) -> Option<ObjectRef> {
        self.get(&id).cloned()
    }
}

/// A packed value referenced an object ID the resolver does not know.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnresolvedObject {
    /// The unresolvable ID.
    pub id: ObjectId,
}

impl fmt::Display for UnresolvedObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "object {} is not known to this resolver", self.id)
    }
}

impl Error for UnresolvedObject {}

/// Turn a packed value back into a live one.
pub fn unpack_value(
    packed: &PackedValue,
    resolver: &dyn ResolveObject,
) -> Result<Value, UnresolvedObject> {
    Ok(match packed {
        PackedValue::None => Value::None,
        PackedValue::Bool(b) => Value::Bool(*b),
        PackedValue::Int(i) => Value::Int(*i),
        PackedValue::Real(r) => Value::Real(*r),
        PackedValue::Str(s) => Value::Str(s.clone()),
        PackedValue::Vector(v) => Value::Vector(v.clone()),
        PackedValue::Object(id) => {
            let handle = resolver.resolve(*id).ok_or(UnresolvedObject { id: *id })?;
            Value::Object(handle)
        }
    })
}

/// Unpack a parameter list into a map. Later entries win when a name
/// repeats, matching the effect of applying them in order.
pub fn unpack_params(
    packed: &PackedParams,
    resolver: &dyn ResolveObject,
) -> Result<ParamMap, UnresolvedObject> {
    let mut params = ParamMap::with_capacity(packed.len());
    for (name, value) in packed {
        params.insert(name.clone(), unpack_value(value, resolver)?);
    }
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_real_widens_integers() {
        assert_eq!(Value::Int(-7).as_real().unwrap(), -7.0);
    }

    #[test]
    fn mismatch_reports_both_kinds() {
        let err = Value::Str("x".into()).as_int().unwrap_err();
        assert_eq!(
            err,
            DispatchError::InvalidValue {
                expected: "int",
                got: "str".to_owned(),
            }
        );
    }

    #[test]
    fn unpack_is_last_wins_on_duplicate_names() {
        let packed: PackedParams = vec![
            ("k".into(), PackedValue::Int(1)),
            ("k".into(), PackedValue::Int(2)),
        ];
        let resolver: IndexMap<ObjectId, ObjectRef> = IndexMap::new();
        let params = unpack_params(&packed, &resolver).unwrap();
        assert_eq!(params.len(), 1);
        assert_eq!(params["k"], Value::Int(2));
    }

    #[test]
    fn unpack_rejects_unknown_object_ids() {
        let packed = PackedValue::Object(ObjectId(9));
        let resolver: IndexMap<ObjectId, ObjectRef> = IndexMap::new();
        let err = unpack_value(&packed, &resolver).unwrap_err();
        assert_eq!(err.id, ObjectId(9));
    }
}
