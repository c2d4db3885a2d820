//! Construction and replication contexts.

use std::rc::{Rc, Weak};

use chorus_core::{DispatchError, FactoryError, GroupError, IdAllocator, ObjectId};

use crate::error::MakeError;
use crate::factory::Factory;
use crate::object::{ObjectHandle, ObjectRef};
use crate::value::{ParamMap, Value};

/// Creation and replication seam for synchronized objects.
///
/// A context issues identities, constructs objects through its
/// [`Factory`], and decides what a handle mutation means: a local
/// context applies it and stops, a replicating context broadcasts the
/// call to every replica and blocks until all have applied it.
pub trait Context {
    /// Construct a synchronized object from parameters.
    fn make_shared(&self, name: &str, params: &ParamMap) -> Result<ObjectRef, MakeError> {
        self.make_shared_with_state(name, params, &[])
    }

    /// Construct a synchronized object, then restore internal state.
    ///
    /// `internal_state` is applied after construction when non-empty.
    fn make_shared_with_state(
        &self,
        name: &str,
        params: &ParamMap,
        internal_state: &[u8],
    ) -> Result<ObjectRef, MakeError>;

    /// Construct an object that lives inside another object's state.
    ///
    /// Interior objects are reachable only through their parent. A
    /// replicating context builds them without broadcasting, because
    /// the parent's state bytes travel to every replica and each
    /// replica rebuilds its own copies. The default forwards to
    /// [`Context::make_shared_with_state`], which is right for local
    /// contexts.
    fn make_interior(
        &self,
        name: &str,
        params: &ParamMap,
        internal_state: &[u8],
    ) -> Result<ObjectRef, MakeError> {
        self.make_shared_with_state(name, params, internal_state)
    }

    /// Pre-flight check before a parameter change is applied.
    ///
    /// Runs before any local state changes, so a rejection is
    /// recoverable. The default accepts everything.
    fn check_set_parameter(
        &self,
        handle: &ObjectHandle,
        value: &Value,
    ) -> Result<(), DispatchError> {
        let _ = (handle, value);
        Ok(())
    }

    /// Pre-flight check before a state-changing method call.
    fn check_call_method(
        &self,
        handle: &ObjectHandle,
        args: &ParamMap,
    ) -> Result<(), DispatchError> {
        let _ = (handle, args);
        Ok(())
    }

    /// A parameter change was applied to `handle`'s local object.
    fn notify_set_parameter(
        &self,
        handle: &ObjectHandle,
        name: &str,
        value: &Value,
    ) -> Result<(), GroupError>;

    /// A state-changing method ran on `handle`'s local object.
    fn notify_call_method(
        &self,
        handle: &ObjectHandle,
        name: &str,
        args: &ParamMap,
    ) -> Result<(), GroupError>;

    /// The object behind `id` is gone.
    ///
    /// Release is best-effort; contexts absorb failures instead of
    /// surfacing them from destructors.
    fn notify_release(&self, id: ObjectId);

    /// The registered type name of `handle`'s object.
    fn name_of(&self, handle: &ObjectHandle) -> Result<String, FactoryError>;
}

// ── Construction helper ─────────────────────────────────────────────────────

/// Shared construction path for [`Context`] implementations.
///
/// Makes an instance of `name` from `factory`, applies `params`, then
/// restores `internal_state` when non-empty, and wraps the result in a
/// handle identified by `id`.
///
/// # Contract
///
/// `backlink` must point at `ctx`; the handle replicates through it.
pub fn build_object(
    factory: &Factory,
    ctx: &dyn Context,
    backlink: Weak<dyn Context>,
    id: ObjectId,
    name: &str,
    params: &ParamMap,
    internal_state: &[u8],
) -> Result<ObjectRef, MakeError> {
    let mut object = factory.make(name)?;
    object.construct(ctx, params).map_err(MakeError::Construct)?;
    if !internal_state.is_empty() {
        object
            .set_internal_state(ctx, internal_state)
            .map_err(MakeError::State)?;
    }
    Ok(Rc::new(ObjectHandle::new(id, backlink, object)))
}

// ── Local context ───────────────────────────────────────────────────────────

/// Single-process context: construction works, replication is a no-op.
///
/// Notifications return immediately without touching anything, so the
/// object graph built through a local context behaves exactly like the
/// coordinator's share of a replicated one.
#[derive(Debug)]
pub struct LocalContext {
    factory: Factory,
    ids: IdAllocator,
    self_weak: Weak<LocalContext>,
}

impl LocalContext {
    /// A fresh context constructing from `factory`.
    pub fn new(factory: Factory) -> Rc<Self> {
        Rc::new_cyclic(|self_weak| Self {
            factory,
            ids: IdAllocator::new(),
            self_weak: self_weak.clone(),
        })
    }

    /// The factory this context constructs from.
    pub fn factory(&self) -> &Factory {
        &self.factory
    }
}

impl Context for LocalContext {
    fn make_shared_with_state(
        &self,
        name: &str,
        params: &ParamMap,
        internal_state: &[u8],
    ) -> Result<ObjectRef, MakeError> {
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

    fn notify_set_parameter(
        &self,
        handle: &ObjectHandle,
        name: &str,
        value: &Value,
    ) -> Result<(), GroupError> {
        let _ = (handle, name, value);
        Ok(())
    }

    fn notify_call_method(
        &self,
        handle: &ObjectHandle,
        name: &str,
        args: &ParamMap,
    ) -> Result<(), GroupError> {
        let _ = (handle, name, args);
        Ok(())
    }

    fn notify_release(&self, id: ObjectId) {
        let _ = id;
    }

    fn name_of(&self, handle: &ObjectHandle) -> Result<String, FactoryError> {
        handle.registered_name(&self.factory)
    }
}
