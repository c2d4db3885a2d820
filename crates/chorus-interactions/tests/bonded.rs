//! Integration test: a bonded-interaction setup driven like a front
//! end would drive it.
//!
//! Builds the interaction surface through factories and handles only,
//! locally and over a replicated worker group, and checks that the
//! core-side table ends up identical either way.

use std::rc::Rc;

use chorus_core::MapKey;
use chorus_group::{GroupConfig, GroupContext, ThreadGroup};
use chorus_interactions::{
    register_interaction_types, BondParams, Interactions,
};
use chorus_object::{Context, Factory, ObjectHandle, ObjectRef, ParamMap, Value};

// ── Helpers ─────────────────────────────────────────────────────

fn interaction_factory() -> Factory {
    let mut factory = Factory::new();
    // The fixture set is fixed; registration cannot collide.
    register_interaction_types(&mut factory).unwrap();
    factory
}

fn real_param(name: &str, value: f64) -> ParamMap {
    let mut params = ParamMap::new();
    params.insert(name.into(), Value::Real(value));
    params
}

fn harmonic_params(k: f64, r_0: f64, r_cut: f64) -> ParamMap {
    let mut params = ParamMap::new();
    params.insert("k".into(), Value::Real(k));
    params.insert("r_0".into(), Value::Real(r_0));
    params.insert("r_cut".into(), Value::Real(r_cut));
    params
}

fn insert_args(element: &ObjectRef) -> ParamMap {
    let mut args = ParamMap::new();
    args.insert("object".into(), Value::Object(Rc::clone(element)));
    args
}

/// Builds the standard two-bond setup through `ctx` and returns the
/// map handle.
fn standard_setup(ctx: &dyn Context) -> ObjectRef {
    let map = ctx.make_shared("Interactions", &ParamMap::new()).unwrap();
    let spring = ctx
        .make_shared("HarmonicBond", &harmonic_params(2.0, 1.0, 0.0))
        .unwrap();
    let pair = ctx
        .make_shared("CoulombPair", &real_param("q1q2", 4.0))
        .unwrap();
    map.call_method("insert", &insert_args(&spring)).unwrap();
    map.call_method("insert", &insert_args(&pair)).unwrap();
    map
}

fn table_snapshot(map: &ObjectHandle) -> Vec<(MapKey, BondParams)> {
    let map = map.downcast_ref::<Interactions>().unwrap();
    map.core()
        .bonds()
        .iter()
        .map(|(key, params)| (*key, params.clone()))
        .collect()
}

// ═══ Local and replicated setups agree ══════════════════════════

#[test]
fn a_replicated_setup_matches_the_local_one() {
    let local_ctx = chorus_object::LocalContext::new(interaction_factory());
    let local_map = standard_setup(&*local_ctx);

    let group = ThreadGroup::spawn(&GroupConfig::default(), &interaction_factory()).unwrap();
    let group_ctx = GroupContext::new(interaction_factory(), Box::new(group));
    let group_map = standard_setup(&*group_ctx);

    assert_eq!(table_snapshot(&local_map), table_snapshot(&group_map));
    assert_eq!(group_ctx.metrics().objects_created, 3);
}

#[test]
fn replicated_parameter_changes_take_effect_before_reinsertion() {
    let group = ThreadGroup::spawn(&GroupConfig::default(), &interaction_factory()).unwrap();
    let ctx = GroupContext::new(interaction_factory(), Box::new(group));

    let map = ctx.make_shared("Interactions", &ParamMap::new()).unwrap();
    let spring = ctx
        .make_shared("HarmonicBond", &harmonic_params(1.0, 1.0, 0.0))
        .unwrap();
    map.call_method("insert", &insert_args(&spring)).unwrap();

    // Table entries are copies; a later handle change lands only after
    // re-inserting at the same key.
    spring.set_parameter("k", &Value::Real(9.0)).unwrap();
    assert_eq!(
        table_snapshot(&map)[0].1,
        BondParams::Harmonic {
            k: 1.0,
            r_0: 1.0,
            r_cut: 0.0,
        }
    );

    let mut reinsert = insert_args(&spring);
    reinsert.insert("key".into(), Value::Int(0));
    map.call_method("insert", &reinsert).unwrap();
    assert_eq!(
        table_snapshot(&map)[0].1,
        BondParams::Harmonic {
            k: 9.0,
            r_0: 1.0,
            r_cut: 0.0,
        }
    );
}

#[test]
fn a_serialized_setup_restores_into_a_fresh_group() {
    let origin = chorus_object::LocalContext::new(interaction_factory());
    let payload = standard_setup(&*origin).serialize().unwrap();

    let group = ThreadGroup::spawn(&GroupConfig::default(), &interaction_factory()).unwrap();
    let ctx = GroupContext::new(interaction_factory(), Box::new(group));
    let restored = ObjectHandle::deserialize(&payload, &*ctx).unwrap();

    let table = restored.downcast_ref::<Interactions>().unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(
        table.core().bond(MapKey(0)),
        Some(&BondParams::Harmonic {
            k: 2.0,
            r_0: 1.0,
            r_cut: 0.0,
        })
    );
    // At r = 2: harmonic 1, coulomb 2.
    assert_eq!(table.core().total_energy(2.0), 3.0);
}
