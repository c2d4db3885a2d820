//! Reusable synchronized-object and backing-store fixtures.
//!
//! Four standard fixtures for handle, map, and group testing:
//!
//! - [`InertObject`] — no parameters, no methods, no state.
//! - [`CounterObject`] — one integer parameter plus a mutating method.
//! - [`RecordingCore`] — a backing store that logs every mirrored hook.
//! - [`FailingCore`] — a backing store with a success budget, failing
//!   deterministically once it is spent.

use chorus_core::{DispatchError, MapKey, ObjectId};
use chorus_map::{CoreError, CoreMirror, ObjectMap};
use chorus_object::{Context, Factory, ObjectRef, ParamMap, SyncObject, Value};
use indexmap::IndexMap;

/// A synchronized type with no parameters, methods, or state.
///
/// Useful for testing registration, identity, and release paths where
/// the object's own surface does not matter.
#[derive(Debug, Default)]
pub struct InertObject;

impl SyncObject for InertObject {}

/// One integer parameter and one mutating method.
///
/// Exposes `count`, the mutating method `add` (named argument `amount`,
/// returns the new count), and the read-only method `value`. Useful for
/// checking that a mutation reached every replica: bump the count at
/// the coordinator, then read it back on each worker.
#[derive(Debug, Default)]
pub struct CounterObject {
    pub count: i64,
}

impl SyncObject for CounterObject {
    fn parameter_names(&self) -> &'static [&'static str] {
        &["count"]
    }

    fn set_parameter(&mut self, name: &str, value: &Value) -> Result<(), DispatchError> {
        match name {
            "count" => {
                self.count = value.as_int()?;
                Ok(())
            }
            _ => Err(DispatchError::UnknownParameter {
                name: name.to_owned(),
            }),
        }
    }

    fn get_parameter(&self, name: &str) -> Result<Value, DispatchError> {
        match name {
            "count" => Ok(Value::Int(self.count)),
            _ => Err(DispatchError::UnknownParameter {
                name: name.to_owned(),
            }),
        }
    }

    fn mutating_methods(&self) -> &'static [&'static str] {
        &["add"]
    }

    fn call_method(
        &mut self,
        _ctx: &dyn Context,
        name: &str,
        args: &ParamMap,
    ) -> Result<Value, DispatchError> {
        match name {
            "add" => {
                let amount = args
                    .get("amount")
                    .ok_or(DispatchError::MissingArgument {
                        name: "amount".to_owned(),
                    })?
                    .as_int()?;
                self.count += amount;
                Ok(Value::Int(self.count))
            }
            "value" => Ok(Value::Int(self.count)),
            _ => Err(DispatchError::UnknownMethod {
                name: name.to_owned(),
            }),
        }
    }
}

/// One mirrored hook call, as seen by a [`RecordingCore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoreOp {
    /// `insert_in_core` assigned this key.
    Insert(MapKey),
    /// `insert_at_in_core` stored under this caller-chosen key.
    InsertAt(MapKey),
    /// `erase_in_core` removed this key.
    Erase(MapKey),
}

/// A backing store that accepts everything and logs every hook call.
///
/// Key assignment is sequential and never reuses a key; explicit
/// inserts advance the next assignable key past their own. Useful for
/// asserting the exact hook stream an [`ObjectMap`] emits, and for
/// checking that replicated map operations drive every replica's store
/// through the same sequence.
#[derive(Debug)]
pub struct RecordingCore {
    entries: IndexMap<MapKey, ObjectId>,
    next: MapKey,
    ops: Vec<CoreOp>,
}

impl Default for RecordingCore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingCore {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
            next: MapKey(0),
            ops: Vec::new(),
        }
    }

    /// Every hook call so far, oldest first.
    pub fn ops(&self) -> &[CoreOp] {
        &self.ops
    }

    /// The stored identities, in store insertion order.
    pub fn stored(&self) -> Vec<(MapKey, ObjectId)> {
        self.entries.iter().map(|(key, id)| (*key, *id)).collect()
    }

    /// The key the next store-chosen insert would occupy.
    pub fn next_key(&self) -> MapKey {
        self.next
    }
}

impl CoreMirror for RecordingCore {
    fn insert_in_core(&mut self, element: &ObjectRef) -> Result<MapKey, CoreError> {
        let key = self.next;
        self.next = key.successor();
        self.entries.insert(key, element.id());
        self.ops.push(CoreOp::Insert(key));
        Ok(key)
    }

    fn insert_at_in_core(&mut self, key: MapKey, element: &ObjectRef) -> Result<(), CoreError> {
        self.next = self.next.max(key.successor());
        self.entries.insert(key, element.id());
        self.ops.push(CoreOp::InsertAt(key));
        Ok(())
    }

    fn erase_in_core(&mut self, key: MapKey) -> Result<(), CoreError> {
        self.entries.shift_remove(&key);
        self.ops.push(CoreOp::Erase(key));
        Ok(())
    }

    fn len_in_core(&self) -> usize {
        self.entries.len()
    }
}

/// A backing store with a success budget.
///
/// Delegates to an inner [`RecordingCore`] until `successes` hook calls
/// have been applied, then fails every further hook. Useful for driving
/// the desynchronization path: a map whose store rejects a change must
/// refuse the call without touching its own entries.
///
/// The [`Default`] store has no budget at all and fails its first hook,
/// which is what a factory-registered fragile table wants.
#[derive(Debug)]
pub struct FailingCore {
    inner: RecordingCore,
    successes_left: u32,
}

impl FailingCore {
    /// A core that applies `successes` hook calls and then fails.
    pub fn after(successes: u32) -> Self {
        Self {
            inner: RecordingCore::new(),
            successes_left: successes,
        }
    }

    /// Hook calls the store will still accept.
    pub fn remaining(&self) -> u32 {
        self.successes_left
    }

    fn spend(&mut self) -> Result<(), CoreError> {
        if self.successes_left == 0 {
            return Err(CoreError::new("store rejected the change"));
        }
        self.successes_left -= 1;
        Ok(())
    }
}

impl Default for FailingCore {
    fn default() -> Self {
        Self::after(0)
    }
}

impl CoreMirror for FailingCore {
    fn insert_in_core(&mut self, element: &ObjectRef) -> Result<MapKey, CoreError> {
        self.spend()?;
        self.inner.insert_in_core(element)
    }

    fn insert_at_in_core(&mut self, key: MapKey, element: &ObjectRef) -> Result<(), CoreError> {
        self.spend()?;
        self.inner.insert_at_in_core(key, element)
    }

    fn erase_in_core(&mut self, key: MapKey) -> Result<(), CoreError> {
        self.spend()?;
        self.inner.erase_in_core(key)
    }

    fn len_in_core(&self) -> usize {
        self.inner.len_in_core()
    }
}

/// A factory with every fixture registered under its conventional name.
///
/// Registers `Inert`, `Counter`, `Table` (an [`ObjectMap`] over a
/// [`RecordingCore`]), and `FragileTable` (over a budget-less
/// [`FailingCore`]). Group tests build coordinator and workers from
/// this one function so both sides hold the identical type set.
pub fn test_factory() -> Factory {
    let mut factory = Factory::new();
    // Names and types are distinct; registration cannot collide.
    factory.register::<InertObject>("Inert").unwrap();
    factory.register::<CounterObject>("Counter").unwrap();
    factory.register::<ObjectMap<RecordingCore>>("Table").unwrap();
    factory
        .register::<ObjectMap<FailingCore>>("FragileTable")
        .unwrap();
    factory
}
