//! Name-to-constructor registry for synchronized object types.

use std::any::{Any, TypeId};

use chorus_core::FactoryError;
use indexmap::IndexMap;

use crate::object::SyncObject;

type Constructor = fn() -> Box<dyn SyncObject>;

fn construct_default<T: SyncObject + Default>() -> Box<dyn SyncObject> {
    Box::new(T::default())
}

/// Registry mapping type names to constructors and back.
///
/// Every context in a group must be built from an identically populated
/// factory, registered in the same order, or replicated constructions
/// will fail on some replicas.
///
/// # Examples
///
/// ```
/// use chorus_object::{Factory, SyncObject};
///
/// #[derive(Default)]
/// struct Dial;
/// impl SyncObject for Dial {}
///
/// let mut factory = Factory::new();
/// factory.register::<Dial>("Dial").unwrap();
/// assert!(factory.is_registered("Dial"));
/// assert!(factory.register::<Dial>("Dial").is_err());
/// ```
#[derive(Clone, Debug, Default)]
pub struct Factory {
    constructors: IndexMap<String, Constructor>,
    names: IndexMap<TypeId, String>,
}

impl Factory {
    /// An empty factory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T` under `name`.
    ///
    /// Each name and each Rust type may be registered once; the
    /// name-to-type mapping must be a bijection so payloads can record
    /// an unambiguous name per object.
    pub fn register<T>(&mut self, name: &str) -> Result<(), FactoryError>
    where
        T: SyncObject + Default,
    {
        if self.constructors.contains_key(name) || self.names.contains_key(&TypeId::of::<T>()) {
            return Err(FactoryError::DuplicateType {
                name: name.to_owned(),
            });
        }
        self.constructors
            .insert(name.to_owned(), construct_default::<T>);
        self.names.insert(TypeId::of::<T>(), name.to_owned());
        Ok(())
    }

    /// Construct a fresh, unconfigured instance of the named type.
    pub fn make(&self, name: &str) -> Result<Box<dyn SyncObject>, FactoryError> {
        match self.constructors.get(name) {
            Some(constructor) => Ok(constructor()),
            None => Err(FactoryError::UnknownType {
                name: name.to_owned(),
            }),
        }
    }

    /// The name `object`'s concrete type was registered under.
    pub fn type_name(&self, object: &dyn SyncObject) -> Option<&str> {
        let any: &dyn Any = object;
        self.names.get(&any.type_id()).map(String::as_str)
    }

    /// `true` if a constructor is registered under `name`.
    pub fn is_registered(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }
}
