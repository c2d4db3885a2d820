//! Errors raised while building, mutating, and serializing handles.

use std::error::Error;
use std::fmt;

use chorus_codec::CodecError;
use chorus_core::{DispatchError, FactoryError, GroupError, ObjectId};

/// Errors from [`Context::make_shared`](crate::Context::make_shared) and
/// the other construction entry points.
#[derive(Debug)]
pub enum MakeError {
    /// The factory had no constructor for the requested name.
    Factory(FactoryError),
    /// The new object rejected its construction parameters.
    Construct(DispatchError),
    /// The new object rejected the supplied internal state.
    State(DeserializeError),
    /// Replicating the construction across the group failed.
    ///
    /// The group must be considered inconsistent afterwards.
    Group(GroupError),
}

impl fmt::Display for MakeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Factory(err) => write!(f, "factory: {err}"),
            Self::Construct(err) => write!(f, "construct rejected: {err}"),
            Self::State(err) => write!(f, "internal state restore failed: {err}"),
            Self::Group(err) => write!(f, "replication failed: {err}"),
        }
    }
}

impl Error for MakeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Factory(err) => Some(err),
            Self::Construct(err) => Some(err),
            Self::State(err) => Some(err),
            Self::Group(err) => Some(err),
        }
    }
}

impl From<FactoryError> for MakeError {
    fn from(err: FactoryError) -> Self {
        Self::Factory(err)
    }
}

impl From<GroupError> for MakeError {
    fn from(err: GroupError) -> Self {
        Self::Group(err)
    }
}

/// Errors from [`ObjectHandle::set_parameter`](crate::ObjectHandle::set_parameter)
/// and [`ObjectHandle::call_method`](crate::ObjectHandle::call_method).
#[derive(Debug)]
pub enum HandleError {
    /// The object or a pre-flight check rejected the call.
    ///
    /// Nothing was applied anywhere; the call can be retried with
    /// corrected input.
    Dispatch(DispatchError),
    /// Replicating the call across the group failed after it was
    /// applied locally.
    ///
    /// The group must be considered inconsistent afterwards.
    Group(GroupError),
    /// The owning context has been dropped.
    ContextGone,
}

impl fmt::Display for HandleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dispatch(err) => write!(f, "dispatch: {err}"),
            Self::Group(err) => write!(f, "replication failed: {err}"),
            Self::ContextGone => write!(f, "the owning context no longer exists"),
        }
    }
}

impl Error for HandleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Dispatch(err) => Some(err),
            Self::Group(err) => Some(err),
            Self::ContextGone => None,
        }
    }
}

impl From<DispatchError> for HandleError {
    fn from(err: DispatchError) -> Self {
        Self::Dispatch(err)
    }
}

impl From<GroupError> for HandleError {
    fn from(err: GroupError) -> Self {
        Self::Group(err)
    }
}

/// Errors while capturing an object graph into payload bytes.
#[derive(Debug)]
pub enum SerializeError {
    /// The handle's owning context has been dropped.
    ContextGone,
    /// The object's concrete type has no registered name to record.
    Factory(FactoryError),
    /// A parameter listed by the object could not be read back.
    Parameter {
        /// The parameter name.
        name: String,
        /// Why the read failed.
        reason: DispatchError,
    },
    /// The object failed to capture its internal state.
    State {
        /// Human-readable description of the failure.
        detail: String,
    },
    /// Encoding the captured state failed.
    Codec(CodecError),
}

impl fmt::Display for SerializeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContextGone => write!(f, "the owning context no longer exists"),
            Self::Factory(err) => write!(f, "factory: {err}"),
            Self::Parameter { name, reason } => {
                write!(f, "parameter '{name}': {reason}")
            }
            Self::State { detail } => {
                write!(f, "internal state capture failed: {detail}")
            }
            Self::Codec(err) => write!(f, "encode failed: {err}"),
        }
    }
}

impl Error for SerializeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Factory(err) => Some(err),
            Self::Parameter { reason, .. } => Some(reason),
            Self::Codec(err) => Some(err),
            Self::ContextGone | Self::State { .. } => None,
        }
    }
}

impl From<CodecError> for SerializeError {
    fn from(err: CodecError) -> Self {
        Self::Codec(err)
    }
}

/// Errors while restoring an object graph from payload bytes.
///
/// Restoration is all-or-nothing: on any error, every object built so
/// far is released and no partially restored graph is observable.
#[derive(Debug)]
pub enum DeserializeError {
    /// Decoding the payload failed.
    Codec(CodecError),
    /// Constructing an object recorded in the payload failed.
    Make(Box<MakeError>),
    /// A parameter references a child object the payload never recorded.
    UnknownChild {
        /// The unresolved object ID.
        id: ObjectId,
    },
    /// The object rejected the recorded internal state.
    State {
        /// Human-readable description of the failure.
        detail: String,
    },
}

impl fmt::Display for DeserializeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Codec(err) => write!(f, "decode failed: {err}"),
            Self::Make(err) => write!(f, "construction failed: {err}"),
            Self::UnknownChild { id } => {
                write!(f, "payload references child object {id} with no recorded state")
            }
            Self::State { detail } => {
                write!(f, "internal state restore failed: {detail}")
            }
        }
    }
}

impl Error for DeserializeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Codec(err) => Some(err),
            Self::Make(err) => Some(err.as_ref()),
            Self::UnknownChild { .. } | Self::State { .. } => None,
        }
    }
}

impl From<CodecError> for DeserializeError {
    fn from(err: CodecError) -> Self {
        Self::Codec(err)
    }
}

impl From<MakeError> for DeserializeError {
    fn from(err: MakeError) -> Self {
        Self::Make(Box::new(err))
    }
}
