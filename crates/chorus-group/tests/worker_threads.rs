//! Integration test: replication across real worker threads.
//!
//! Runs a [`GroupContext`] over a [`ThreadGroup`], one OS thread per
//! worker. Replica state is not reachable from here, so the assertions
//! ride on the blocking contract: a call that returns `Ok` was applied
//! by every worker, and a refused call reports why.

use chorus_core::DispatchError;
use chorus_group::{GroupConfig, GroupContext, ThreadGroup};
use chorus_object::{Context, MakeError, ParamMap, Value};
use chorus_test_utils::test_factory;

fn spawn_group(workers: usize) -> std::rc::Rc<GroupContext> {
    let config = GroupConfig {
        workers,
        ..GroupConfig::default()
    };
    let factory = test_factory();
    let group = ThreadGroup::spawn(&config, &factory).unwrap();
    GroupContext::new(factory, Box::new(group))
}

#[test]
fn counters_replicate_across_threads() {
    let ctx = spawn_group(3);
    let mut params = ParamMap::new();
    params.insert("count".into(), Value::Int(1));
    let handle = ctx.make_shared("Counter", &params).unwrap();

    let mut args = ParamMap::new();
    args.insert("amount".into(), Value::Int(4));
    assert_eq!(handle.call_method("add", &args).unwrap(), Value::Int(5));

    handle.set_parameter("count", &Value::Int(10)).unwrap();
    assert_eq!(handle.get_parameter("count").unwrap(), Value::Int(10));

    assert_eq!(ctx.metrics().calls_broadcast, 3);
}

#[test]
fn unknown_types_are_refused_by_the_whole_group() {
    let ctx = spawn_group(2);

    let err = ctx.make_shared("Ghost", &ParamMap::new()).unwrap_err();
    assert!(matches!(err, MakeError::Factory(_)));

    // Coordinator and workers refused symmetrically; the group keeps
    // going.
    let handle = ctx.make_shared("Inert", &ParamMap::new()).unwrap();
    assert!(ctx.is_addressable(handle.id()));
}

#[test]
fn bad_values_are_refused_by_the_whole_group() {
    let ctx = spawn_group(2);
    let mut params = ParamMap::new();
    params.insert("count".into(), Value::Str("many".into()));

    let err = ctx.make_shared("Counter", &params).unwrap_err();
    assert!(matches!(
        err,
        MakeError::Construct(DispatchError::InvalidValue { .. })
    ));
}

#[test]
fn a_long_call_stream_stays_in_step() {
    let ctx = spawn_group(4);
    let mut params = ParamMap::new();
    params.insert("count".into(), Value::Int(0));
    let handle = ctx.make_shared("Counter", &params).unwrap();

    let mut args = ParamMap::new();
    args.insert("amount".into(), Value::Int(1));
    for expected in 1..=200 {
        assert_eq!(
            handle.call_method("add", &args).unwrap(),
            Value::Int(expected)
        );
    }

    assert_eq!(ctx.metrics().calls_broadcast, 201);
}

#[test]
fn dropping_the_group_joins_cleanly() {
    let ctx = spawn_group(2);
    let handle = ctx.make_shared("Inert", &ParamMap::new()).unwrap();
    drop(handle);
    assert_eq!(ctx.metrics().objects_released, 1);
    // ctx and the transport inside it drop here; the test hangs if a
    // worker thread fails to join.
}
