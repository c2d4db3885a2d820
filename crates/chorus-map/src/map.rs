//! Keyed collection of synchronized objects, mirrored entry by entry
//! into a backing store.

use chorus_codec::codec::{
    read_length_prefixed_bytes, read_u32_le, write_length_prefixed_bytes, write_u32_le,
};
use chorus_core::{DispatchError, MapKey, RealVec};
use chorus_object::{
    serial, Context, DeserializeError, ObjectRef, ParamMap, SerializeError, SyncObject, Value,
};
use indexmap::IndexMap;

use crate::core::{CoreError, CoreMirror};

/// Keyed object collection whose every change is mirrored into a
/// [`CoreMirror`] before the collection's own entries are touched.
///
/// Keys are `u32`s assigned by the store on plain inserts, or chosen by
/// the caller on keyed inserts. Inserting at an occupied key overwrites:
/// the previous entry is erased from the store first, then the new one
/// is inserted, so the store never momentarily holds two entries for
/// one key.
///
/// The map owns its store. A hook failure ([`CoreError`]) leaves the
/// map's entries consistent with whatever the store acknowledged, but
/// the store itself may be half-changed; see
/// [`DispatchError::CoreDesync`].
#[derive(Debug)]
pub struct ObjectMap<C: CoreMirror> {
    core: C,
    elements: IndexMap<MapKey, ObjectRef>,
    next_key: MapKey,
}

impl<C: CoreMirror> ObjectMap<C> {
    /// An empty map over `core`.
    pub fn new(core: C) -> Self {
        Self {
            core,
            elements: IndexMap::new(),
            next_key: MapKey(0),
        }
    }

    /// The backing store.
    pub fn core(&self) -> &C {
        &self.core
    }

    /// Insert `element` under a store-chosen key and return that key.
    pub fn insert(&mut self, element: ObjectRef) -> Result<MapKey, CoreError> {
        let key = self.core.insert_in_core(&element)?;
        self.elements.insert(key, element);
        self.next_key = self.next_key.max(key.successor());
        Ok(key)
    }

    /// Insert `element` at `key`, overwriting any previous entry.
    ///
    /// An overwrite erases the previous entry from the store before the
    /// new one is inserted.
    pub fn insert_at(&mut self, key: MapKey, element: ObjectRef) -> Result<(), CoreError> {
        if self.elements.contains_key(&key) {
            self.core.erase_in_core(key)?;
            self.elements.shift_remove(&key);
        }
        self.core.insert_at_in_core(key, &element)?;
        self.elements.insert(key, element);
        self.next_key = self.next_key.max(key.successor());
        Ok(())
    }

    /// Remove the entry at `key`. Absent keys are a no-op.
    pub fn erase(&mut self, key: MapKey) -> Result<(), CoreError> {
        if self.elements.contains_key(&key) {
            self.core.erase_in_core(key)?;
            self.elements.shift_remove(&key);
        }
        Ok(())
    }

    /// Remove every entry.
    pub fn clear(&mut self) -> Result<(), CoreError> {
        let keys: Vec<MapKey> = self.elements.keys().copied().collect();
        for key in keys {
            self.core.erase_in_core(key)?;
            self.elements.shift_remove(&key);
        }
        Ok(())
    }

    /// The entry at `key`, if present.
    pub fn get(&self, key: MapKey) -> Option<&ObjectRef> {
        self.elements.get(&key)
    }

    /// `true` if an entry exists at `key`.
    pub fn contains(&self, key: MapKey) -> bool {
        self.elements.contains_key(&key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// `true` if the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Current keys, in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = MapKey> + '_ {
        self.elements.keys().copied()
    }

    /// Read-only view of the key → handle mapping.
    pub fn elements(&self) -> &IndexMap<MapKey, ObjectRef> {
        &self.elements
    }

    /// The next key the store would assign, tracked from the contract
    /// that assigned keys only move forward.
    pub fn next_key(&self) -> MapKey {
        self.next_key
    }
}

impl<C: CoreMirror + Default> Default for ObjectMap<C> {
    fn default() -> Self {
        Self::new(C::default())
    }
}

fn desync(err: CoreError) -> DispatchError {
    DispatchError::CoreDesync { detail: err.detail }
}

fn required<'a>(args: &'a ParamMap, name: &str) -> Result<&'a Value, DispatchError> {
    args.get(name).ok_or_else(|| DispatchError::MissingArgument {
        name: name.to_owned(),
    })
}

fn key_arg(value: &Value) -> Result<MapKey, DispatchError> {
    let raw = value.as_int()?;
    u32::try_from(raw)
        .map(MapKey)
        .map_err(|_| DispatchError::InvalidValue {
            expected: "map key in u32 range",
            got: raw.to_string(),
        })
}

/// Method surface: `insert` (args `object`, optional `key`), `erase`
/// (`key`), `clear`, `size`, `keys`, `contains` (`key`). The first
/// three mutate and replicate; the rest answer locally.
///
/// Internal state records every entry with its key plus the next
/// assignable key, so a restored map reproduces the key set exactly and
/// never hands out a restored key again.
impl<C: CoreMirror + 'static> SyncObject for ObjectMap<C> {
    fn mutating_methods(&self) -> &'static [&'static str] {
        &["insert", "erase", "clear"]
    }

    fn call_method(
        &mut self,
        _ctx: &dyn Context,
        name: &str,
        args: &ParamMap,
    ) -> Result<Value, DispatchError> {
        match name {
            "insert" => {
                let element = required(args, "object")?.as_object()?.clone();
                let key = match args.get("key") {
                    Some(value) => {
                        let key = key_arg(value)?;
                        self.insert_at(key, element).map_err(desync)?;
                        key
                    }
                    None => self.insert(element).map_err(desync)?,
                };
                Ok(Value::from(key))
            }
            "erase" => {
                let key = key_arg(required(args, "key")?)?;
                self.erase(key).map_err(desync)?;
                Ok(Value::None)
            }
            "clear" => {
                self.clear().map_err(desync)?;
                Ok(Value::None)
            }
            "size" => Ok(Value::Int(self.len() as i64)),
            "keys" => {
                let keys: RealVec = self.keys().map(|k| f64::from(k.0)).collect();
                Ok(Value::Vector(keys))
            }
            "contains" => {
                let key = key_arg(required(args, "key")?)?;
                Ok(Value::Bool(self.contains(key)))
            }
            _ => Err(DispatchError::UnknownMethod {
                name: name.to_owned(),
            }),
        }
    }

    fn internal_state(&self) -> Result<Vec<u8>, SerializeError> {
        let mut payload = Vec::new();
        write_u32_le(&mut payload, self.elements.len() as u32)?;
        for (key, element) in &self.elements {
            write_u32_le(&mut payload, key.0)?;
            let nested = serial::serialize(element).map_err(|err| SerializeError::State {
                detail: format!("element {key}: {err}"),
            })?;
            write_length_prefixed_bytes(&mut payload, &nested)?;
        }
        write_u32_le(&mut payload, self.next_key.0)?;
        Ok(payload)
    }

    fn set_internal_state(
        &mut self,
        ctx: &dyn Context,
        state: &[u8],
    ) -> Result<(), DeserializeError> {
        if !self.elements.is_empty() {
            return Err(DeserializeError::State {
                detail: "map is already populated".to_owned(),
            });
        }

        let mut cursor = state;
        let count = read_u32_le(&mut cursor)?;
        let mut entries = Vec::with_capacity(count.min(1024) as usize);
        for _ in 0..count {
            let key = MapKey(read_u32_le(&mut cursor)?);
            let nested = read_length_prefixed_bytes(&mut cursor)?;
            entries.push((key, nested));
        }
        let recorded_next = MapKey(read_u32_le(&mut cursor)?);

        // The next assignable key must clear every recorded key; a
        // payload that says otherwise is inconsistent, not restorable.
        let implied_next = entries
            .iter()
            .map(|(key, _)| key.successor())
            .max()
            .unwrap_or(MapKey(0));
        if recorded_next < implied_next {
            return Err(DeserializeError::State {
                detail: format!(
                    "recorded next key {recorded_next} precedes assigned key space {implied_next}"
                ),
            });
        }

        for (key, nested) in entries {
            let element = serial::deserialize_interior(&nested, ctx)?;
            self.insert_at(key, element)
                .map_err(|err| DeserializeError::State {
                    detail: format!("element {key}: {err}"),
                })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chorus_object::{Factory, LocalContext};
    use std::rc::Rc;

    /// Minimal store: a key table plus the original's counter
    /// discipline (`next = max(next, key + 1)` on keyed inserts).
    #[derive(Debug, Default)]
    struct TableCore {
        table: IndexMap<MapKey, chorus_core::ObjectId>,
        next: u32,
        ops: Vec<(&'static str, MapKey)>,
    }

    impl CoreMirror for TableCore {
        fn insert_in_core(&mut self, element: &ObjectRef) -> Result<MapKey, CoreError> {
            let key = MapKey(self.next);
            self.next += 1;
            self.table.insert(key, element.id());
            self.ops.push(("insert", key));
            Ok(key)
        }

        fn insert_at_in_core(&mut self, key: MapKey, element: &ObjectRef) -> Result<(), CoreError> {
            self.next = self.next.max(key.0.saturating_add(1));
            self.table.insert(key, element.id());
            self.ops.push(("insert", key));
            Ok(())
        }

        fn erase_in_core(&mut self, key: MapKey) -> Result<(), CoreError> {
            self.table.shift_remove(&key);
            self.ops.push(("erase", key));
            Ok(())
        }

        fn len_in_core(&self) -> usize {
            self.table.len()
        }
    }

    #[derive(Default)]
    struct Pebble;

    impl SyncObject for Pebble {}

    fn context() -> Rc<LocalContext> {
        let mut factory = Factory::new();
        factory.register::<Pebble>("Pebble").unwrap();
        LocalContext::new(factory)
    }

    fn pebble(ctx: &Rc<LocalContext>) -> ObjectRef {
        ctx.make_shared("Pebble", &ParamMap::new()).unwrap()
    }

    fn assert_mirrored(map: &ObjectMap<TableCore>) {
        assert_eq!(map.len(), map.core().len_in_core());
    }

    #[test]
    fn auto_keys_count_up_from_zero() {
        let ctx = context();
        let mut map = ObjectMap::new(TableCore::default());
        assert_eq!(map.insert(pebble(&ctx)).unwrap(), MapKey(0));
        assert_eq!(map.insert(pebble(&ctx)).unwrap(), MapKey(1));
        assert_mirrored(&map);
    }

    #[test]
    fn erased_keys_are_never_reassigned() {
        let ctx = context();
        let mut map = ObjectMap::new(TableCore::default());
        map.insert(pebble(&ctx)).unwrap();
        map.insert(pebble(&ctx)).unwrap();
        map.erase(MapKey(0)).unwrap();
        assert!(!map.contains(MapKey(0)));
        assert!(map.contains(MapKey(1)));
        assert_eq!(map.insert(pebble(&ctx)).unwrap(), MapKey(2));
        assert_mirrored(&map);
    }

    #[test]
    fn erasing_an_absent_key_is_a_noop() {
        let ctx = context();
        let mut map = ObjectMap::new(TableCore::default());
        map.insert(pebble(&ctx)).unwrap();
        map.erase(MapKey(7)).unwrap();
        assert_eq!(map.len(), 1);
        assert_mirrored(&map);
        // The store never heard about key 7.
        assert!(!map.core().ops.iter().any(|op| *op == ("erase", MapKey(7))));
    }

    #[test]
    fn explicit_keys_push_auto_assignment_past_them() {
        let ctx = context();
        let mut map = ObjectMap::new(TableCore::default());
        map.insert_at(MapKey(5), pebble(&ctx)).unwrap();
        assert_eq!(map.insert(pebble(&ctx)).unwrap(), MapKey(6));
        assert_eq!(map.next_key(), MapKey(7));
    }

    #[test]
    fn overwrite_erases_the_previous_entry_first() {
        let ctx = context();
        let mut map = ObjectMap::new(TableCore::default());
        map.insert_at(MapKey(3), pebble(&ctx)).unwrap();
        map.insert_at(MapKey(3), pebble(&ctx)).unwrap();
        assert_eq!(map.len(), 1);
        assert_mirrored(&map);
        assert_eq!(
            map.core().ops,
            vec![
                ("insert", MapKey(3)),
                ("erase", MapKey(3)),
                ("insert", MapKey(3)),
            ]
        );
    }

    #[test]
    fn clear_empties_map_and_store() {
        let ctx = context();
        let mut map = ObjectMap::new(TableCore::default());
        for _ in 0..3 {
            map.insert(pebble(&ctx)).unwrap();
        }
        map.clear().unwrap();
        assert!(map.is_empty());
        assert_eq!(map.core().len_in_core(), 0);
    }

    // ── Dispatch surface ────────────────────────────────────────

    #[test]
    fn insert_method_requires_an_object_argument() {
        let ctx = context();
        let mut map = ObjectMap::new(TableCore::default());
        let err = map
            .call_method(&*ctx, "insert", &ParamMap::new())
            .unwrap_err();
        assert!(matches!(err, DispatchError::MissingArgument { .. }));
    }

    #[test]
    fn keys_outside_u32_range_are_rejected() {
        let ctx = context();
        let mut map = ObjectMap::new(TableCore::default());
        let mut args = ParamMap::new();
        args.insert("key".into(), Value::Int(-1));
        let err = map.call_method(&*ctx, "erase", &args).unwrap_err();
        assert!(matches!(err, DispatchError::InvalidValue { .. }));
    }

    #[test]
    fn method_surface_round_trips() {
        let ctx = context();
        let mut map = ObjectMap::new(TableCore::default());

        let mut args = ParamMap::new();
        args.insert("object".into(), Value::Object(pebble(&ctx)));
        assert_eq!(
            map.call_method(&*ctx, "insert", &args).unwrap(),
            Value::Int(0)
        );

        let mut keyed = ParamMap::new();
        keyed.insert("object".into(), Value::Object(pebble(&ctx)));
        keyed.insert("key".into(), Value::Int(4));
        assert_eq!(
            map.call_method(&*ctx, "insert", &keyed).unwrap(),
            Value::Int(4)
        );

        assert_eq!(map.call_method(&*ctx, "size", &ParamMap::new()).unwrap(), Value::Int(2));

        let mut probe = ParamMap::new();
        probe.insert("key".into(), Value::Int(4));
        assert_eq!(
            map.call_method(&*ctx, "contains", &probe).unwrap(),
            Value::Bool(true)
        );

        assert_eq!(
            map.call_method(&*ctx, "keys", &ParamMap::new()).unwrap(),
            Value::Vector(RealVec::from_slice(&[0.0, 4.0]))
        );
    }

    // ── Internal state ──────────────────────────────────────────

    #[test]
    fn internal_state_restores_keys_and_counter() {
        let ctx = context();
        let mut map = ObjectMap::new(TableCore::default());
        map.insert_at(MapKey(1), pebble(&ctx)).unwrap();
        map.insert_at(MapKey(2), pebble(&ctx)).unwrap();
        let state = map.internal_state().unwrap();

        let mut restored = ObjectMap::<TableCore>::default();
        restored.set_internal_state(&*ctx, &state).unwrap();
        assert!(restored.contains(MapKey(1)));
        assert!(restored.contains(MapKey(2)));
        assert_eq!(restored.len(), 2);
        assert_eq!(restored.core().len_in_core(), 2);
        assert_eq!(restored.insert(pebble(&ctx)).unwrap(), MapKey(3));
    }

    #[test]
    fn inconsistent_recorded_counter_is_rejected() {
        let ctx = context();
        let mut map = ObjectMap::new(TableCore::default());
        map.insert_at(MapKey(2), pebble(&ctx)).unwrap();
        let mut state = map.internal_state().unwrap();

        // Rewrite the trailing counter to 1, inside the assigned range.
        let len = state.len();
        state[len - 4..].copy_from_slice(&1u32.to_le_bytes());

        let mut restored = ObjectMap::<TableCore>::default();
        let err = restored.set_internal_state(&*ctx, &state).unwrap_err();
        assert!(matches!(err, DeserializeError::State { .. }));
    }

    #[test]
    fn populated_maps_do_not_restore() {
        let ctx = context();
        let mut map = ObjectMap::new(TableCore::default());
        map.insert(pebble(&ctx)).unwrap();
        let state = map.internal_state().unwrap();

        let err = map.set_internal_state(&*ctx, &state).unwrap_err();
        assert!(matches!(err, DeserializeError::State { .. }));
    }
}
