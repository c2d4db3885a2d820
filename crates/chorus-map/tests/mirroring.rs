//! End-to-end map behavior through handles: method dispatch, store
//! mirroring, and whole-map payload round trips on a local context.

use std::rc::Rc;

use chorus_core::{DispatchError, MapKey, ObjectId};
use chorus_map::{CoreError, CoreMirror, ObjectMap};
use chorus_object::{
    Context, DeserializeError, Factory, HandleError, LocalContext, ObjectHandle, ObjectRef,
    ParamMap, SyncObject, Value,
};
use indexmap::IndexMap;

// ── Fixtures ────────────────────────────────────────────────────

/// Store with a bounded key space: keyed inserts past the capacity
/// are refused, which is how a real store signals it cannot honor a
/// request it already started.
#[derive(Debug)]
struct BoundedCore {
    capacity: u32,
    entries: IndexMap<MapKey, ObjectId>,
    next: u32,
}

impl Default for BoundedCore {
    fn default() -> Self {
        Self {
            capacity: 8,
            entries: IndexMap::new(),
            next: 0,
        }
    }
}

impl CoreMirror for BoundedCore {
    fn insert_in_core(&mut self, element: &ObjectRef) -> Result<MapKey, CoreError> {
        let key = MapKey(self.next);
        self.next += 1;
        self.entries.insert(key, element.id());
        Ok(key)
    }

    fn insert_at_in_core(&mut self, key: MapKey, element: &ObjectRef) -> Result<(), CoreError> {
        if key.0 >= self.capacity {
            return Err(CoreError::new(format!(
                "key {key} outside table of {}",
                self.capacity
            )));
        }
        self.next = self.next.max(key.0 + 1);
        self.entries.insert(key, element.id());
        Ok(())
    }

    fn erase_in_core(&mut self, key: MapKey) -> Result<(), CoreError> {
        self.entries.shift_remove(&key);
        Ok(())
    }

    fn len_in_core(&self) -> usize {
        self.entries.len()
    }
}

#[derive(Default)]
struct Sample {
    tag: String,
}

impl SyncObject for Sample {
    fn parameter_names(&self) -> &'static [&'static str] {
        &["tag"]
    }

    fn set_parameter(&mut self, name: &str, value: &Value) -> Result<(), DispatchError> {
        match name {
            "tag" => {
                self.tag = value.as_str()?.to_owned();
                Ok(())
            }
            _ => Err(DispatchError::UnknownParameter {
                name: name.to_owned(),
            }),
        }
    }

    fn get_parameter(&self, name: &str) -> Result<Value, DispatchError> {
        match name {
            "tag" => Ok(Value::from(self.tag.as_str())),
            _ => Err(DispatchError::UnknownParameter {
                name: name.to_owned(),
            }),
        }
    }
}

// ── Helpers ─────────────────────────────────────────────────────

fn table_context() -> Rc<LocalContext> {
    let mut factory = Factory::new();
    factory.register::<Sample>("Sample").unwrap();
    factory
        .register::<ObjectMap<BoundedCore>>("Table")
        .unwrap();
    LocalContext::new(factory)
}

fn sample(ctx: &Rc<LocalContext>, tag: &str) -> ObjectRef {
    let mut params = ParamMap::new();
    params.insert("tag".into(), Value::from(tag));
    ctx.make_shared("Sample", &params).unwrap()
}

fn insert_args(element: ObjectRef, key: Option<u32>) -> ParamMap {
    let mut args = ParamMap::new();
    args.insert("object".into(), Value::Object(element));
    if let Some(key) = key {
        args.insert("key".into(), Value::Int(i64::from(key)));
    }
    args
}

fn key_args(key: u32) -> ParamMap {
    let mut args = ParamMap::new();
    args.insert("key".into(), Value::Int(i64::from(key)));
    args
}

// ═══ Method dispatch through handles ════════════════════════════

#[test]
fn insert_through_a_handle_returns_store_keys() {
    let ctx = table_context();
    let table = ctx.make_shared("Table", &ParamMap::new()).unwrap();

    let first = table
        .call_method("insert", &insert_args(sample(&ctx, "a"), None))
        .unwrap();
    let second = table
        .call_method("insert", &insert_args(sample(&ctx, "b"), None))
        .unwrap();

    assert_eq!(first, Value::Int(0));
    assert_eq!(second, Value::Int(1));
    assert_eq!(
        table.call_method("size", &ParamMap::new()).unwrap(),
        Value::Int(2)
    );
}

#[test]
fn keyed_insert_overwrites_and_reports_its_key() {
    let ctx = table_context();
    let table = ctx.make_shared("Table", &ParamMap::new()).unwrap();

    table
        .call_method("insert", &insert_args(sample(&ctx, "old"), Some(3)))
        .unwrap();
    let key = table
        .call_method("insert", &insert_args(sample(&ctx, "new"), Some(3)))
        .unwrap();

    assert_eq!(key, Value::Int(3));
    assert_eq!(
        table.call_method("size", &ParamMap::new()).unwrap(),
        Value::Int(1)
    );

    let map = table.downcast_ref::<ObjectMap<BoundedCore>>().unwrap();
    let entry = map.get(MapKey(3)).unwrap();
    assert_eq!(entry.get_parameter("tag").unwrap(), Value::from("new"));
    assert_eq!(map.core().len_in_core(), 1);
}

#[test]
fn store_rejections_surface_as_desync() {
    let ctx = table_context();
    let table = ctx.make_shared("Table", &ParamMap::new()).unwrap();

    let err = table
        .call_method("insert", &insert_args(sample(&ctx, "x"), Some(50)))
        .unwrap_err();
    assert!(matches!(
        err,
        HandleError::Dispatch(DispatchError::CoreDesync { .. })
    ));
}

#[test]
fn erase_and_clear_keep_map_and_store_level() {
    let ctx = table_context();
    let table = ctx.make_shared("Table", &ParamMap::new()).unwrap();

    for tag in ["a", "b", "c"] {
        table
            .call_method("insert", &insert_args(sample(&ctx, tag), None))
            .unwrap();
    }
    table.call_method("erase", &key_args(1)).unwrap();

    {
        let map = table.downcast_ref::<ObjectMap<BoundedCore>>().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.core().len_in_core(), 2);
        assert!(!map.contains(MapKey(1)));
    }

    table.call_method("clear", &ParamMap::new()).unwrap();

    let map = table.downcast_ref::<ObjectMap<BoundedCore>>().unwrap();
    assert!(map.is_empty());
    assert_eq!(map.core().len_in_core(), 0);
}

// ═══ Whole-map payload round trips ══════════════════════════════

#[test]
fn serialized_map_restores_entries_at_their_keys() {
    let ctx = table_context();
    let table = ctx.make_shared("Table", &ParamMap::new()).unwrap();
    table
        .call_method("insert", &insert_args(sample(&ctx, "alpha"), Some(1)))
        .unwrap();
    table
        .call_method("insert", &insert_args(sample(&ctx, "beta"), Some(2)))
        .unwrap();

    let payload = table.serialize().unwrap();
    let restored = ObjectHandle::deserialize(&payload, &*ctx).unwrap();

    {
        let map = restored.downcast_ref::<ObjectMap<BoundedCore>>().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.core().len_in_core(), 2);
        let alpha = map.get(MapKey(1)).unwrap();
        assert_eq!(alpha.get_parameter("tag").unwrap(), Value::from("alpha"));
        let beta = map.get(MapKey(2)).unwrap();
        assert_eq!(beta.get_parameter("tag").unwrap(), Value::from("beta"));
    }

    // The restored store resumes assignment past the restored keys.
    let next = restored
        .call_method("insert", &insert_args(sample(&ctx, "gamma"), None))
        .unwrap();
    assert_eq!(next, Value::Int(3));
}

#[test]
fn restore_without_element_types_fails_loudly() {
    let ctx = table_context();
    let table = ctx.make_shared("Table", &ParamMap::new()).unwrap();
    table
        .call_method("insert", &insert_args(sample(&ctx, "alpha"), None))
        .unwrap();
    let payload = table.serialize().unwrap();

    // A context that knows tables but not their elements.
    let mut bare = Factory::new();
    bare.register::<ObjectMap<BoundedCore>>("Table").unwrap();
    let other = LocalContext::new(bare);

    let err = ObjectHandle::deserialize(&payload, &*other).unwrap_err();
    assert!(matches!(err, DeserializeError::Make(_)));
}
