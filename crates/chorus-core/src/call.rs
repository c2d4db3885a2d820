//! Replicated call payloads and application outcomes.

use crate::id::ObjectId;
use crate::value::{PackedParams, PackedValue};

/// One replicated mutation in the coordinator's call stream.
///
/// Every state change originates on the coordinator and is broadcast to
/// the worker group as exactly one `ReplicatedCall`. Workers apply calls
/// strictly in receipt order, so all participants observe the same total
/// order of mutations.
///
/// # Examples
///
/// ```
/// use chorus_core::{ObjectId, PackedValue, ReplicatedCall};
///
/// let call = ReplicatedCall::SetParameter {
///     id: ObjectId(3),
///     name: "r_cut".into(),
///     value: PackedValue::Real(1.5),
/// };
///
/// assert!(matches!(call, ReplicatedCall::SetParameter { .. }));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum ReplicatedCall {
    /// Construct a new object and register it under `id`.
    MakeShared {
        /// The ID assigned by the coordinator.
        id: ObjectId,
        /// Registered type name to construct.
        name: String,
        /// Construction parameters, packed.
        params: PackedParams,
        /// Opaque internal-state payload. Empty for plain construction.
        internal_state: Vec<u8>,
    },
    /// Set one parameter on an existing object.
    SetParameter {
        /// The target object.
        id: ObjectId,
        /// The parameter name.
        name: String,
        /// The new value, packed.
        value: PackedValue,
    },
    /// Invoke a state-changing method on an existing object.
    ///
    /// Read-only methods are never replicated; they execute on the
    /// coordinator alone.
    CallMethod {
        /// The target object.
        id: ObjectId,
        /// The method name.
        name: String,
        /// Named method arguments, packed.
        args: PackedParams,
    },
    /// Drop the registry entry for an object whose front-end handle
    /// no longer exists.
    Release {
        /// The released object.
        id: ObjectId,
    },
}

impl ReplicatedCall {
    /// The ID of the object this call targets (or creates).
    pub fn target(&self) -> ObjectId {
        match self {
            Self::MakeShared { id, .. }
            | Self::SetParameter { id, .. }
            | Self::CallMethod { id, .. }
            | Self::Release { id } => *id,
        }
    }
}

/// What applying a call produced, from one participant's view.
///
/// A dispatch rejection (unknown parameter, unknown method, bad value)
/// is itself a well-defined outcome: every participant runs the same
/// object code, so the same call is rejected everywhere or nowhere. An
/// outcome that differs between participants is divergence, which the
/// coordinator treats as fatal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallOutcome {
    /// The call was applied; the object changed state or was created.
    Applied,
    /// The object's dispatch refused the call; no state changed.
    Rejected,
}
