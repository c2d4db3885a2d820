//! Error types shared across the synchronization layer.
//!
//! Organized by subsystem: dispatch (per-object parameter and method
//! resolution), factory (type registration and lookup), and group
//! (replication across a worker group). Errors local to one layer, such
//! as codec or map errors, live in that layer's crate.

use std::error::Error;
use std::fmt;

use crate::id::ObjectId;

/// Errors from per-object parameter and method dispatch.
///
/// All variants are recoverable: the offending call is refused, the
/// error is reported to the caller, and no object state changes.
#[derive(Clone, Debug, PartialEq)]
pub enum DispatchError {
    /// The object has no parameter with this name.
    UnknownParameter {
        /// The requested parameter name.
        name: String,
    },
    /// The object has no method with this name.
    UnknownMethod {
        /// The requested method name.
        name: String,
    },
    /// A supplied value had the wrong type or out-of-domain content.
    InvalidValue {
        /// What the object expected.
        expected: &'static str,
        /// What the caller supplied.
        got: String,
    },
    /// A required argument was missing from a method call.
    MissingArgument {
        /// The missing argument name.
        name: String,
    },
    /// An argument references an object owned by a different context.
    ///
    /// An ID only resolves within the context that issued it; this is
    /// caught before anything is broadcast.
    ForeignObject {
        /// The offending object ID.
        id: ObjectId,
    },
    /// The object is not individually addressable for replication.
    ///
    /// Objects restored as interior parts of a parent's state payload
    /// are reachable only through the parent. Caught before any local
    /// state changes.
    Unaddressable {
        /// The offending object ID.
        id: ObjectId,
    },
    /// A backing store failed to apply a mirrored change.
    ///
    /// Unlike the other variants this one is fatal: the store may have
    /// half-applied the change, so the mirror invariant can no longer
    /// be assumed and the affected object must not be used further.
    CoreDesync {
        /// Human-readable description of the store failure.
        detail: String,
    },
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownParameter { name } => write!(f, "unknown parameter '{name}'"),
            Self::UnknownMethod { name } => write!(f, "unknown method '{name}'"),
            Self::InvalidValue { expected, got } => {
                write!(f, "invalid value: expected {expected}, got {got}")
            }
            Self::MissingArgument { name } => write!(f, "missing argument '{name}'"),
            Self::ForeignObject { id } => {
                write!(f, "object {id} belongs to a different context")
            }
            Self::Unaddressable { id } => {
                write!(f, "object {id} is not individually addressable in this context")
            }
            Self::CoreDesync { detail } => {
                write!(f, "backing store desynchronized: {detail}")
            }
        }
    }
}

impl Error for DispatchError {}

/// Errors from type registration and factory lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FactoryError {
    /// No constructor is registered under this name.
    UnknownType {
        /// The requested type name.
        name: String,
    },
    /// A constructor is already registered under this name, or the same
    /// Rust type was registered under a second name.
    DuplicateType {
        /// The conflicting registration name.
        name: String,
    },
    /// The object's concrete type was never registered, so it has no
    /// name to record in payloads.
    UnregisteredType,
}

impl fmt::Display for FactoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownType { name } => write!(f, "unknown type name '{name}'"),
            Self::DuplicateType { name } => {
                write!(f, "type '{name}' is already registered")
            }
            Self::UnregisteredType => {
                write!(f, "object's concrete type is not registered with this factory")
            }
        }
    }
}

impl Error for FactoryError {}

/// Errors in the transport carrying calls to a worker group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportError {
    /// A worker stopped accepting calls or never answered.
    WorkerLost {
        /// Zero-based index of the worker within the group.
        index: usize,
    },
    /// A worker answered with a malformed or undecodable reply.
    WorkerFault {
        /// Zero-based index of the worker within the group.
        index: usize,
        /// Human-readable description of the fault.
        detail: String,
    },
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WorkerLost { index } => write!(f, "worker {index} is gone"),
            Self::WorkerFault { index, detail } => {
                write!(f, "worker {index} faulted: {detail}")
            }
        }
    }
}

impl Error for TransportError {}

/// Fatal replication failures.
///
/// Either of these means the coordinator can no longer vouch that every
/// replica holds the same object graph. Callers should stop issuing
/// calls through the affected context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GroupError {
    /// The transport to the worker group failed mid-call.
    Transport(TransportError),
    /// Replicas disagreed on the outcome of a call.
    Diverged {
        /// Human-readable description of the disagreement.
        detail: String,
    },
    /// A call could not be encoded for broadcast.
    Frame {
        /// Codec failure description.
        detail: String,
    },
}

impl fmt::Display for GroupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(err) => write!(f, "transport: {err}"),
            Self::Diverged { detail } => write!(f, "replicas diverged: {detail}"),
            Self::Frame { detail } => write!(f, "frame encoding: {detail}"),
        }
    }
}

impl Error for GroupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Transport(err) => Some(err),
            Self::Diverged { .. } | Self::Frame { .. } => None,
        }
    }
}

impl From<TransportError> for GroupError {
    fn from(err: TransportError) -> Self {
        Self::Transport(err)
    }
}
