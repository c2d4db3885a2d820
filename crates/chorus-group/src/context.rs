//! The coordinator context: every mutation becomes a broadcast.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use chorus_codec::codec::encode_call;
use chorus_core::{
    CallOutcome, DispatchError, FactoryError, GroupError, IdAllocator, ObjectId, ReplicatedCall,
};
use chorus_object::{
    build_object, pack_params, pack_value, Context, Factory, MakeError, ObjectHandle, ObjectRef,
    ParamMap, Value,
};
use indexmap::IndexSet;

use crate::metrics::GroupMetrics;
use crate::transport::GroupTransport;

/// The front-end side of a replicated object graph.
///
/// Construction and every mutating handle call are encoded, broadcast
/// through the [`GroupTransport`], and only then applied locally, so a
/// successful return means every participant holds the new state. The
/// registry of broadcast-constructed IDs decides addressability:
/// objects built through [`Context::make_interior`] (state restores)
/// are absent from it and refuse individual mutation.
pub struct GroupContext {
    factory: Factory,
    transport: Box<dyn GroupTransport>,
    ids: IdAllocator,
    registry: RefCell<IndexSet<ObjectId>>,
    metrics: Cell<GroupMetrics>,
    self_weak: Weak<GroupContext>,
}

impl GroupContext {
    /// A coordinator over `transport`, constructing from `factory`.
    ///
    /// The workers behind the transport must register the same type
    /// set as `factory`, or every construction will diverge.
    pub fn new(factory: Factory, transport: Box<dyn GroupTransport>) -> Rc<Self> {
        Rc::new_cyclic(|self_weak| Self {
            factory,
            transport,
            ids: IdAllocator::new(),
            registry: RefCell::new(IndexSet::new()),
            metrics: Cell::new(GroupMetrics::default()),
            self_weak: self_weak.clone(),
        })
    }

    /// The factory this context constructs from.
    pub fn factory(&self) -> &Factory {
        &self.factory
    }

    /// Number of workers behind the transport.
    pub fn workers(&self) -> usize {
        self.transport.workers()
    }

    /// Replication counters accumulated so far.
    pub fn metrics(&self) -> GroupMetrics {
        self.metrics.get()
    }

    /// `true` if `id` was constructed over the group and not yet
    /// released, making it a valid target for replicated calls.
    pub fn is_addressable(&self, id: ObjectId) -> bool {
        self.registry.borrow().contains(&id)
    }

    fn bump(&self, f: impl FnOnce(&mut GroupMetrics)) {
        let mut metrics = self.metrics.get();
        f(&mut metrics);
        self.metrics.set(metrics);
    }

    fn broadcast(&self, call: &ReplicatedCall) -> Result<Vec<CallOutcome>, GroupError> {
        let mut frame = Vec::new();
        encode_call(&mut frame, call).map_err(|err| GroupError::Frame {
            detail: err.to_string(),
        })?;
        let outcomes = self
            .transport
            .broadcast(&frame)
            .map_err(GroupError::Transport)?;
        self.bump(|m| m.calls_broadcast += 1);
        Ok(outcomes)
    }

    /// Refuse object values the group cannot resolve: handles from
    /// another context, and handles this context never broadcast.
    fn check_value(&self, value: &Value) -> Result<(), DispatchError> {
        if let Value::Object(object) = value {
            let self_weak: Weak<dyn Context> = self.self_weak.clone();
            if !object.created_by(&self_weak) {
                return Err(DispatchError::ForeignObject { id: object.id() });
            }
            if !self.registry.borrow().contains(&object.id()) {
                return Err(DispatchError::Unaddressable { id: object.id() });
            }
        }
        Ok(())
    }

    fn check_args(&self, args: &ParamMap) -> Result<(), DispatchError> {
        for value in args.values() {
            self.check_value(value)?;
        }
        Ok(())
    }

    /// Worker outcomes must match the coordinator's own verdict.
    fn verify_outcomes(
        &self,
        outcomes: &[CallOutcome],
        local_applied: bool,
        what: &str,
    ) -> Result<(), GroupError> {
        let mismatched: Vec<usize> = outcomes
            .iter()
            .enumerate()
            .filter(|(_, outcome)| matches!(outcome, CallOutcome::Applied) != local_applied)
            .map(|(index, _)| index)
            .collect();
        if mismatched.is_empty() {
            return Ok(());
        }
        let verdict = if local_applied { "applied" } else { "rejected" };
        Err(GroupError::Diverged {
            detail: format!("{what}: workers {mismatched:?} disagreed with the coordinator ({verdict})"),
        })
    }
}

impl Context for GroupContext {
    fn make_shared_with_state(
        &self,
        name: &str,
        params: &ParamMap,
        internal_state: &[u8],
    ) -> Result<ObjectRef, MakeError> {
        // Argument problems are caught before anything is sent.
        self.check_args(params).map_err(MakeError::Construct)?;

        let id = self.ids.next();
        let call = ReplicatedCall::MakeShared {
            id,
            name: name.to_owned(),
            params: pack_params(params),
            internal_state: internal_state.to_vec(),
        };
        let outcomes = self.broadcast(&call)?;

        let backlink: Weak<dyn Context> = self.self_weak.clone();
        match build_object(
            &self.factory,
            self,
            backlink,
            id,
            name,
            params,
            internal_state,
        ) {
            Ok(object) => {
                self.verify_outcomes(&outcomes, true, &format!("make_shared '{name}'"))
                    .map_err(MakeError::Group)?;
                self.registry.borrow_mut().insert(id);
                self.bump(|m| m.objects_created += 1);
                Ok(object)
            }
            Err(err) => {
                self.verify_outcomes(&outcomes, false, &format!("make_shared '{name}'"))
                    .map_err(MakeError::Group)?;
                // Symmetric rejection: recoverable, nothing registered
                // anywhere.
                Err(err)
            }
        }
    }

    fn make_interior(
        &self,
        name: &str,
        params: &ParamMap,
        internal_state: &[u8],
    ) -> Result<ObjectRef, MakeError> {
        // Interior objects travel inside their parent's state bytes;
        // each replica rebuilds its own copies, so nothing is broadcast
        // and nothing is registered.
        let backlink: Weak<dyn Context> = self.self_weak.clone();
        build_object(
            &self.factory,
            self,
            backlink,
            self.ids.next(),
            name,
            params,
            internal_state,
        )
    }

    fn check_set_parameter(
        &self,
        handle: &ObjectHandle,
        value: &Value,
    ) -> Result<(), DispatchError> {
        if !self.registry.borrow().contains(&handle.id()) {
            return Err(DispatchError::Unaddressable { id: handle.id() });
        }
        self.check_value(value)
    }

    fn check_call_method(&self, handle: &ObjectHandle, args: &ParamMap) -> Result<(), DispatchError> {
        if !self.registry.borrow().contains(&handle.id()) {
            return Err(DispatchError::Unaddressable { id: handle.id() });
        }
        self.check_args(args)
    }

    fn notify_set_parameter(
        &self,
        handle: &ObjectHandle,
        name: &str,
        value: &Value,
    ) -> Result<(), GroupError> {
        let call = ReplicatedCall::SetParameter {
            id: handle.id(),
            name: name.to_owned(),
            value: pack_value(value),
        };
        let outcomes = self.broadcast(&call)?;
        self.verify_outcomes(
            &outcomes,
            true,
            &format!("set_parameter '{name}' on object {}", handle.id()),
        )
    }

    fn notify_call_method(
        &self,
        handle: &ObjectHandle,
        name: &str,
        args: &ParamMap,
    ) -> Result<(), GroupError> {
        let call = ReplicatedCall::CallMethod {
            id: handle.id(),
            name: name.to_owned(),
            args: pack_params(args),
        };
        let outcomes = self.broadcast(&call)?;
        self.verify_outcomes(
            &outcomes,
            true,
            &format!("call_method '{name}' on object {}", handle.id()),
        )
    }

    fn notify_release(&self, id: ObjectId) {
        // Interior and already-released objects were never broadcast;
        // nothing to tear down.
        if !self.registry.borrow_mut().shift_remove(&id) {
            return;
        }
        let call = ReplicatedCall::Release { id };
        match self.broadcast(&call) {
            Ok(_) => self.bump(|m| m.objects_released += 1),
            Err(_) => self.bump(|m| m.release_failures += 1),
        }
    }

    fn name_of(&self, handle: &ObjectHandle) -> Result<String, FactoryError> {
        handle.registered_name(&self.factory)
    }
}

impl fmt::Debug for GroupContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupContext")
            .field("workers", &self.transport.workers())
            .field("registered", &self.registry.borrow().len())
            .field("metrics", &self.metrics.get())
            .finish_non_exhaustive()
    }
}
