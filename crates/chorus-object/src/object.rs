//! The synchronized-object trait and the handle that owns instances.

use std::any::Any;
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};

use chorus_core::{DispatchError, FactoryError, ObjectId};

use crate::context::Context;
use crate::error::{DeserializeError, HandleError, SerializeError};
use crate::factory::Factory;
use crate::serial;
use crate::value::{ParamMap, Value};

/// A synchronized object: dynamically inspectable parameters, named
/// methods, and optional opaque internal state.
///
/// Implementations are registered with a [`Factory`] and instantiated
/// through a [`Context`], which wraps each instance in an
/// [`ObjectHandle`]. All trait methods have defaults, so a type only
/// implements the surface it actually exposes.
///
/// # Examples
///
/// A type with one parameter and one state-changing method:
///
/// ```
/// use chorus_core::DispatchError;
/// use chorus_object::{Context, Factory, LocalContext, ParamMap, SyncObject, Value};
///
/// #[derive(Default)]
/// struct Dial {
///     level: i64,
/// }
///
/// impl SyncObject for Dial {
///     fn parameter_names(&self) -> &'static [&'static str] {
///         &["level"]
///     }
///
///     fn set_parameter(&mut self, name: &str, value: &Value) -> Result<(), DispatchError> {
///         match name {
///             "level" => {
///                 self.level = value.as_int()?;
///                 Ok(())
///             }
///             _ => Err(DispatchError::UnknownParameter { name: name.into() }),
///         }
///     }
///
///     fn get_parameter(&self, name: &str) -> Result<Value, DispatchError> {
///         match name {
///             "level" => Ok(Value::Int(self.level)),
///             _ => Err(DispatchError::UnknownParameter { name: name.into() }),
///         }
///     }
///
///     fn mutating_methods(&self) -> &'static [&'static str] {
///         &["step"]
///     }
///
///     fn call_method(
///         &mut self,
///         _ctx: &dyn Context,
///         name: &str,
///         _args: &ParamMap,
///     ) -> Result<Value, DispatchError> {
///         match name {
///             "step" => {
///                 self.level += 1;
///                 Ok(Value::Int(self.level))
///             }
///             _ => Err(DispatchError::UnknownMethod { name: name.into() }),
///         }
///     }
/// }
///
/// let mut factory = Factory::new();
/// factory.register::<Dial>("Dial").unwrap();
/// let ctx = LocalContext::new(factory);
///
/// let mut params = ParamMap::new();
/// params.insert("level".into(), Value::Int(3));
/// let dial = ctx.make_shared("Dial", &params).unwrap();
///
/// assert_eq!(dial.call_method("step", &ParamMap::new()).unwrap(), Value::Int(4));
/// assert_eq!(dial.get_parameter("level").unwrap(), Value::Int(4));
/// ```
pub trait SyncObject: Any {
    /// Apply construction parameters.
    ///
    /// The default applies each entry through
    /// [`SyncObject::set_parameter`] in map order, so constructing
    /// twice with the same parameters lands in the same state.
    fn construct(&mut self, ctx: &dyn Context, params: &ParamMap) -> Result<(), DispatchError> {
        let _ = ctx;
        for (name, value) in params {
            self.set_parameter(name, value)?;
        }
        Ok(())
    }

    /// Names of the parameters this object exposes, in payload order.
    fn parameter_names(&self) -> &'static [&'static str] {
        &[]
    }

    /// Set one parameter.
    fn set_parameter(&mut self, name: &str, value: &Value) -> Result<(), DispatchError> {
        let _ = value;
        Err(DispatchError::UnknownParameter {
            name: name.to_owned(),
        })
    }

    /// Read one parameter back.
    fn get_parameter(&self, name: &str) -> Result<Value, DispatchError> {
        Err(DispatchError::UnknownParameter {
            name: name.to_owned(),
        })
    }

    /// Names of the methods whose invocation changes observable state.
    ///
    /// Only these calls are replicated to the rest of a group. A method
    /// that mutates without being listed here silently desynchronizes
    /// replicas, so list conservatively.
    fn mutating_methods(&self) -> &'static [&'static str] {
        &[]
    }

    /// Invoke a named method with named arguments.
    fn call_method(
        &mut self,
        ctx: &dyn Context,
        name: &str,
        args: &ParamMap,
    ) -> Result<Value, DispatchError> {
        let _ = (ctx, args);
        Err(DispatchError::UnknownMethod {
            name: name.to_owned(),
        })
    }

    /// Opaque bytes capturing state not reachable through parameters.
    ///
    /// The default captures nothing. Types that override this must
    /// also override [`SyncObject::set_internal_state`] to accept the
    /// bytes they produce.
    fn internal_state(&self) -> Result<Vec<u8>, SerializeError> {
        Ok(Vec::new())
    }

    /// Restore state previously captured by
    /// [`SyncObject::internal_state`].
    ///
    /// Objects referenced inside the bytes are rebuilt through `ctx`'s
    /// interior construction path; see [`Context::make_interior`].
    fn set_internal_state(
        &mut self,
        ctx: &dyn Context,
        state: &[u8],
    ) -> Result<(), DeserializeError> {
        let _ = ctx;
        if state.is_empty() {
            Ok(())
        } else {
            Err(DeserializeError::State {
                detail: "this type carries no internal state".to_owned(),
            })
        }
    }
}

/// Shared reference to a synchronized object.
pub type ObjectRef = Rc<ObjectHandle>;

/// Pairs one object instance with its identity and owning context.
///
/// Mutations go through the handle: the local object is changed first,
/// then the owning context replicates the call. Reads never leave the
/// process. Dropping the last reference notifies the context so
/// replicas can be released too.
///
/// The object lives in an interior cell, so handle calls are not
/// reentrant: an object must not call back into its own handle, and a
/// method's arguments must not include its receiver.
pub struct ObjectHandle {
    id: ObjectId,
    context: Weak<dyn Context>,
    object: RefCell<Box<dyn SyncObject>>,
}

impl ObjectHandle {
    /// Wrap a constructed object.
    ///
    /// Used by [`Context`] implementations; front-end code obtains
    /// handles through [`Context::make_shared`].
    pub fn new(id: ObjectId, context: Weak<dyn Context>, object: Box<dyn SyncObject>) -> Self {
        Self {
            id,
            context,
            object: RefCell::new(object),
        }
    }

    /// The context-issued identity of this object.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// The owning context, unless it has been dropped.
    pub fn context(&self) -> Option<Rc<dyn Context>> {
        self.context.upgrade()
    }

    /// `true` if this handle's owning context is the one behind `ctx`.
    pub fn created_by(&self, ctx: &Weak<dyn Context>) -> bool {
        Weak::ptr_eq(&self.context, ctx)
    }

    /// `true` if both handles share an owning context.
    pub fn same_context(&self, other: &ObjectHandle) -> bool {
        Weak::ptr_eq(&self.context, &other.context)
    }

    /// Names of the parameters the object exposes.
    pub fn parameter_names(&self) -> &'static [&'static str] {
        self.object.borrow().parameter_names()
    }

    /// Read one parameter.
    pub fn get_parameter(&self, name: &str) -> Result<Value, HandleError> {
        Ok(self.get_parameter_raw(name)?)
    }

    /// Set one parameter locally, then replicate the change.
    ///
    /// A [`HandleError::Dispatch`] leaves every replica untouched. A
    /// [`HandleError::Group`] means the local object changed but
    /// replication failed; the group is inconsistent afterwards.
    pub fn set_parameter(&self, name: &str, value: &Value) -> Result<(), HandleError> {
        let ctx = self.context().ok_or(HandleError::ContextGone)?;
        ctx.check_set_parameter(self, value)?;
        self.object.borrow_mut().set_parameter(name, value)?;
        ctx.notify_set_parameter(self, name, value)?;
        Ok(())
    }

    /// Invoke a named method.
    ///
    /// Calls listed in [`SyncObject::mutating_methods`] replicate after
    /// the local invocation succeeds; other calls stay local.
    ///
    /// # Panics
    ///
    /// Panics if `args` contains the receiver itself; the interior cell
    /// is already borrowed for the dispatch.
    pub fn call_method(&self, name: &str, args: &ParamMap) -> Result<Value, HandleError> {
        let ctx = self.context().ok_or(HandleError::ContextGone)?;
        let mutating = self
            .object
            .borrow()
            .mutating_methods()
            .iter()
            .any(|m| *m == name);
        if mutating {
            ctx.check_call_method(self, args)?;
        }
        let result = self.object.borrow_mut().call_method(&*ctx, name, args)?;
        if mutating {
            ctx.notify_call_method(self, name, args)?;
        }
        Ok(result)
    }

    /// The object's internal state bytes.
    pub fn internal_state(&self) -> Result<Vec<u8>, SerializeError> {
        self.object.borrow().internal_state()
    }

    /// Capture this object and everything reachable from it into a
    /// self-describing payload.
    ///
    /// See [`serial::serialize`] for the contract.
    pub fn serialize(&self) -> Result<Vec<u8>, SerializeError> {
        serial::serialize(self)
    }

    /// Rebuild an object graph from a payload in `ctx`.
    ///
    /// See [`serial::deserialize`] for the contract.
    pub fn deserialize(payload: &[u8], ctx: &dyn Context) -> Result<ObjectRef, DeserializeError> {
        serial::deserialize(payload, ctx)
    }

    /// The name the object's concrete type was registered under in
    /// `factory`.
    pub fn registered_name(&self, factory: &Factory) -> Result<String, FactoryError> {
        let object = self.object.borrow();
        factory
            .type_name(object.as_ref())
            .map(str::to_owned)
            .ok_or(FactoryError::UnregisteredType)
    }

    /// Borrow the object as its concrete type.
    pub fn downcast_ref<T: SyncObject>(&self) -> Option<Ref<'_, T>> {
        Ref::filter_map(self.object.borrow(), |object| {
            let any: &dyn Any = object.as_ref();
            any.downcast_ref::<T>()
        })
        .ok()
    }

    /// Mutably borrow the object as its concrete type.
    ///
    /// Changes made through this borrow bypass replication; use it only
    /// for state outside the synchronized surface.
    pub fn downcast_mut<T: SyncObject>(&self) -> Option<RefMut<'_, T>> {
        RefMut::filter_map(self.object.borrow_mut(), |object| {
            let any: &mut dyn Any = object.as_mut();
            any.downcast_mut::<T>()
        })
        .ok()
    }

    pub(crate) fn get_parameter_raw(&self, name: &str) -> Result<Value, DispatchError> {
        self.object.borrow().get_parameter(name)
    }
}

impl fmt::Debug for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectHandle")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl Drop for ObjectHandle {
    fn drop(&mut self) {
        if let Some(ctx) = self.context.upgrade() {
            ctx.notify_release(self.id);
        }
    }
}
