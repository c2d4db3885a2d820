//! Replica-side application of the coordinator's call stream.

use std::error::Error;
use std::fmt;
use std::rc::{Rc, Weak};

use chorus_codec::codec::decode_call;
use chorus_codec::CodecError;
use chorus_core::{CallOutcome, ObjectId, ReplicatedCall};
use chorus_object::{
    build_object, unpack_params, unpack_value, Context, HandleError, LocalContext, MakeError,
    ObjectRef,
};
use indexmap::IndexMap;

/// Faults that stop a worker from producing a call outcome.
///
/// A dispatch-level rejection is an ordinary [`CallOutcome::Rejected`];
/// these are the structural failures underneath it. Surfaced through a
/// transport they end the group, because a worker that cannot follow
/// the call stream no longer mirrors the coordinator.
#[derive(Debug)]
pub enum WorkerError {
    /// A call targeted an object this worker never registered.
    UnknownObject {
        /// The missing target.
        id: ObjectId,
    },
    /// A packed value referenced an object this worker never registered.
    UnknownChild {
        /// The unresolvable reference.
        id: ObjectId,
    },
    /// The call frame could not be decoded.
    Decode(CodecError),
    /// The worker's own context refused a call it always accepts.
    Internal {
        /// Description of the refusal.
        detail: String,
    },
}

impl fmt::Display for WorkerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownObject { id } => write!(f, "unknown object {id}"),
            Self::UnknownChild { id } => write!(f, "unknown object {id} in packed value"),
            Self::Decode(err) => write!(f, "undecodable frame: {err}"),
            Self::Internal { detail } => write!(f, "internal: {detail}"),
        }
    }
}

impl Error for WorkerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Decode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CodecError> for WorkerError {
    fn from(err: CodecError) -> Self {
        Self::Decode(err)
    }
}

/// One replica: a local context plus the coordinator-keyed object
/// registry.
///
/// The node is transport-agnostic. [`ThreadGroup`](crate::ThreadGroup)
/// drives one per thread; tests drive them directly. Objects are
/// registered under the ID the coordinator assigned, never a locally
/// issued one, so packed object references resolve identically on
/// every participant.
pub struct WorkerNode {
    context: Rc<LocalContext>,
    registry: IndexMap<ObjectId, ObjectRef>,
}

impl WorkerNode {
    /// A fresh replica constructing from `factory`.
    ///
    /// Every participant in a group must register the same type set;
    /// [`ThreadGroup::spawn`](crate::ThreadGroup::spawn) guarantees it
    /// by cloning one factory.
    pub fn new(factory: chorus_object::Factory) -> Self {
        Self {
            context: LocalContext::new(factory),
            registry: IndexMap::new(),
        }
    }

    /// Decode one transport frame and apply it.
    pub fn apply_bytes(&mut self, frame: &[u8]) -> Result<CallOutcome, WorkerError> {
        let call = decode_call(&mut &frame[..])?;
        self.apply(&call)
    }

    /// Apply one replicated call to this replica.
    ///
    /// Outcomes mirror the coordinator's dispatch: `Rejected` when the
    /// object's own dispatch refuses the call, with nothing changed.
    /// Calls that cannot reach dispatch at all (unknown target, broken
    /// reference) are [`WorkerError`]s.
    pub fn apply(&mut self, call: &ReplicatedCall) -> Result<CallOutcome, WorkerError> {
        match call {
            ReplicatedCall::MakeShared {
                id,
                name,
                params,
                internal_state,
            } => {
                let params = unpack_params(params, &self.registry)
                    .map_err(|err| WorkerError::UnknownChild { id: err.id })?;
                let backlink: Weak<dyn Context> = Rc::<LocalContext>::downgrade(&self.context);
                match build_object(
                    self.context.factory(),
                    &*self.context,
                    backlink,
                    *id,
                    name,
                    &params,
                    internal_state,
                ) {
                    Ok(object) => {
                        self.registry.insert(*id, object);
                        Ok(CallOutcome::Applied)
                    }
                    Err(MakeError::Group(err)) => Err(WorkerError::Internal {
                        detail: err.to_string(),
                    }),
                    Err(_) => Ok(CallOutcome::Rejected),
                }
            }
            ReplicatedCall::SetParameter { id, name, value } => {
                let object = self
                    .registry
                    .get(id)
                    .ok_or(WorkerError::UnknownObject { id: *id })?;
                let value = unpack_value(value, &self.registry)
                    .map_err(|err| WorkerError::UnknownChild { id: err.id })?;
                match object.set_parameter(name, &value) {
                    Ok(()) => Ok(CallOutcome::Applied),
                    Err(HandleError::Dispatch(_)) => Ok(CallOutcome::Rejected),
                    Err(err) => Err(WorkerError::Internal {
                        detail: err.to_string(),
                    }),
                }
            }
            ReplicatedCall::CallMethod { id, name, args } => {
                let object = self
                    .registry
                    .get(id)
                    .ok_or(WorkerError::UnknownObject { id: *id })?;
                let args = unpack_params(args, &self.registry)
                    .map_err(|err| WorkerError::UnknownChild { id: err.id })?;
                // Return values stay on the coordinator; replicas only
                // apply the state change.
                match object.call_method(name, &args) {
                    Ok(_) => Ok(CallOutcome::Applied),
                    Err(HandleError::Dispatch(_)) => Ok(CallOutcome::Rejected),
                    Err(err) => Err(WorkerError::Internal {
                        detail: err.to_string(),
                    }),
                }
            }
            ReplicatedCall::Release { id } => {
                // Releases may trail constructions that never registered.
                self.registry.shift_remove(id);
                Ok(CallOutcome::Applied)
            }
        }
    }

    /// The replica of `id`, if registered.
    pub fn object(&self, id: ObjectId) -> Option<&ObjectRef> {
        self.registry.get(&id)
    }

    /// Number of registered replicas.
    pub fn object_count(&self) -> usize {
        self.registry.len()
    }
}

impl fmt::Debug for WorkerNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerNode")
            .field("objects", &self.registry.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chorus_core::{DispatchError, PackedValue};
    use chorus_object::{Factory, ParamMap, SyncObject, Value};

    #[derive(Default)]
    struct Lever {
        throw: f64,
    }

    impl SyncObject for Lever {
        fn parameter_names(&self) -> &'static [&'static str] {
            &["throw"]
        }

        fn set_parameter(&mut self, name: &str, value: &Value) -> Result<(), DispatchError> {
            match name {
                "throw" => {
                    self.throw = value.as_real()?;
                    Ok(())
                }
                _ => Err(DispatchError::UnknownParameter {
                    name: name.to_owned(),
                }),
            }
        }

        fn get_parameter(&self, name: &str) -> Result<Value, DispatchError> {
            match name {
                "throw" => Ok(Value::Real(self.throw)),
                _ => Err(DispatchError::UnknownParameter {
                    name: name.to_owned(),
                }),
            }
        }

        fn mutating_methods(&self) -> &'static [&'static str] {
            &["advance"]
        }

        fn call_method(
            &mut self,
            _ctx: &dyn Context,
            name: &str,
            args: &ParamMap,
        ) -> Result<Value, DispatchError> {
            match name {
                "advance" => {
                    let by = args
                        .get("by")
                        .ok_or_else(|| DispatchError::MissingArgument { name: "by".into() })?
                        .as_real()?;
                    self.throw += by;
                    Ok(Value::Real(self.throw))
                }
                _ => Err(DispatchError::UnknownMethod {
                    name: name.to_owned(),
                }),
            }
        }
    }

    #[derive(Default)]
    struct Link {
        other: Option<ObjectRef>,
    }

    impl SyncObject for Link {
        fn parameter_names(&self) -> &'static [&'static str] {
            &["other"]
        }

        fn set_parameter(&mut self, name: &str, value: &Value) -> Result<(), DispatchError> {
            match name {
                "other" => {
                    self.other = if value.is_none() {
                        None
                    } else {
                        Some(value.as_object()?.clone())
                    };
                    Ok(())
                }
                _ => Err(DispatchError::UnknownParameter {
                    name: name.to_owned(),
                }),
            }
        }

        fn get_parameter(&self, name: &str) -> Result<Value, DispatchError> {
            match name {
                "other" => Ok(self
                    .other
                    .as_ref()
                    .map_or(Value::None, |o| Value::Object(o.clone()))),
                _ => Err(DispatchError::UnknownParameter {
                    name: name.to_owned(),
                }),
            }
        }
    }

    fn node() -> WorkerNode {
        let mut factory = Factory::new();
        factory.register::<Lever>("Lever").unwrap();
        factory.register::<Link>("Link").unwrap();
        WorkerNode::new(factory)
    }

    fn make_lever(id: u64, throw: f64) -> ReplicatedCall {
        ReplicatedCall::MakeShared {
            id: ObjectId(id),
            name: "Lever".into(),
            params: vec![("throw".into(), PackedValue::Real(throw))],
            internal_state: Vec::new(),
        }
    }

    #[test]
    fn make_registers_under_the_coordinator_id() {
        let mut node = node();
        assert_eq!(node.apply(&make_lever(7, 0.5)).unwrap(), CallOutcome::Applied);

        let replica = node.object(ObjectId(7)).unwrap();
        assert_eq!(replica.id(), ObjectId(7));
        assert_eq!(replica.get_parameter("throw").unwrap(), Value::Real(0.5));
    }

    #[test]
    fn rejected_make_leaves_no_entry() {
        let mut node = node();
        let call = ReplicatedCall::MakeShared {
            id: ObjectId(1),
            name: "Lever".into(),
            params: vec![("throw".into(), PackedValue::Str("fast".into()))],
            internal_state: Vec::new(),
        };
        assert_eq!(node.apply(&call).unwrap(), CallOutcome::Rejected);
        assert_eq!(node.object_count(), 0);
    }

    #[test]
    fn set_parameter_resolves_the_registry() {
        let mut node = node();
        node.apply(&make_lever(1, 0.0)).unwrap();

        let call = ReplicatedCall::SetParameter {
            id: ObjectId(1),
            name: "throw".into(),
            value: PackedValue::Real(2.0),
        };
        assert_eq!(node.apply(&call).unwrap(), CallOutcome::Applied);
        let replica = node.object(ObjectId(1)).unwrap();
        assert_eq!(replica.get_parameter("throw").unwrap(), Value::Real(2.0));
    }

    #[test]
    fn method_calls_change_replica_state() {
        let mut node = node();
        node.apply(&make_lever(1, 1.0)).unwrap();

        let call = ReplicatedCall::CallMethod {
            id: ObjectId(1),
            name: "advance".into(),
            args: vec![("by".into(), PackedValue::Real(0.25))],
        };
        assert_eq!(node.apply(&call).unwrap(), CallOutcome::Applied);
        let replica = node.object(ObjectId(1)).unwrap();
        assert_eq!(replica.get_parameter("throw").unwrap(), Value::Real(1.25));
    }

    #[test]
    fn unknown_target_is_a_fault() {
        let mut node = node();
        let call = ReplicatedCall::SetParameter {
            id: ObjectId(99),
            name: "throw".into(),
            value: PackedValue::Real(1.0),
        };
        let err = node.apply(&call).unwrap_err();
        assert!(matches!(err, WorkerError::UnknownObject { id } if id == ObjectId(99)));
    }

    #[test]
    fn object_params_resolve_against_the_registry() {
        let mut node = node();
        node.apply(&make_lever(1, 0.0)).unwrap();

        let link = ReplicatedCall::MakeShared {
            id: ObjectId(2),
            name: "Link".into(),
            params: vec![("other".into(), PackedValue::Object(ObjectId(1)))],
            internal_state: Vec::new(),
        };
        assert_eq!(node.apply(&link).unwrap(), CallOutcome::Applied);

        let replica = node.object(ObjectId(2)).unwrap();
        let other = replica.get_parameter("other").unwrap();
        assert_eq!(other, Value::Object(node.object(ObjectId(1)).unwrap().clone()));
    }

    #[test]
    fn dangling_object_param_is_a_fault() {
        let mut node = node();
        let link = ReplicatedCall::MakeShared {
            id: ObjectId(2),
            name: "Link".into(),
            params: vec![("other".into(), PackedValue::Object(ObjectId(42)))],
            internal_state: Vec::new(),
        };
        let err = node.apply(&link).unwrap_err();
        assert!(matches!(err, WorkerError::UnknownChild { id } if id == ObjectId(42)));
    }

    #[test]
    fn release_is_idempotent() {
        let mut node = node();
        node.apply(&make_lever(1, 0.0)).unwrap();

        let release = ReplicatedCall::Release { id: ObjectId(1) };
        assert_eq!(node.apply(&release).unwrap(), CallOutcome::Applied);
        assert_eq!(node.object_count(), 0);
        assert_eq!(node.apply(&release).unwrap(), CallOutcome::Applied);
    }

    #[test]
    fn malformed_frames_are_decode_faults() {
        let mut node = node();
        let err = node.apply_bytes(&[0xEE, 0x01]).unwrap_err();
        assert!(matches!(err, WorkerError::Decode(_)));
    }
}
