//! Packed parameter values, the transport and serialization form.

use smallvec::SmallVec;

use crate::id::ObjectId;

/// A numeric vector value.
///
/// Uses `SmallVec<[f64; 4]>` to keep short vectors (most are 3-component
/// geometry) inline without heap allocation. Longer vectors, such as
/// tabulated potentials, spill to the heap transparently.
pub type RealVec = SmallVec<[f64; 4]>;

/// An ordered list of named packed values.
///
/// Order is preserved exactly as the sender produced it so that encoding
/// the same parameters always yields the same bytes.
pub type PackedParams = Vec<(String, PackedValue)>;

/// A parameter value in packed form.
///
/// Packed values are plain data with no liveness: an object-valued
/// parameter is reduced to its [`ObjectId`], and turning the ID back
/// into a live handle requires the receiver's object table. This is the
/// only value form that crosses process boundaries or appears in
/// serialized payloads.
///
/// # Examples
///
/// ```
/// use chorus_core::{ObjectId, PackedValue, RealVec};
///
/// let v = PackedValue::Vector(RealVec::from_slice(&[1.0, 0.0, 0.0]));
/// assert_eq!(v.kind_name(), "vector");
///
/// let obj = PackedValue::Object(ObjectId(7));
/// assert_eq!(obj.kind_name(), "object");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum PackedValue {
    /// Absence of a value.
    None,
    /// Boolean flag.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Double-precision real.
    Real(f64),
    /// UTF-8 string.
    Str(String),
    /// Numeric vector.
    Vector(RealVec),
    /// Reference to another synchronized object, by ID.
    Object(ObjectId),
}

impl PackedValue {
    /// Short lowercase name of the variant, for error messages.
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
}
