//! Benchmark workloads and utilities for the chorus synchronization
//! layer.
//!
//! Provides deterministic call-stream builders for benchmarking:
//!
//! - [`set_parameter_stream`]: repeated parameter writes across a set
//!   of target objects
//! - [`mixed_call_stream`]: the construct/mutate/release mix a busy
//!   front end produces
//!
//! Streams are drawn from a seeded ChaCha8 RNG, so every run of a
//! benchmark sees the identical workload.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use chorus_core::{ObjectId, PackedValue, ReplicatedCall};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// A stream of `n` parameter writes spread across `targets` objects.
///
/// Target IDs are `1..=targets`, matching what a context's allocator
/// would have issued for that many constructions.
pub fn set_parameter_stream(seed: u64, n: usize, targets: u64) -> Vec<ReplicatedCall> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|_| ReplicatedCall::SetParameter {
            id: ObjectId(rng.random_range(1..=targets)),
            name: "count".to_owned(),
            value: PackedValue::Int(rng.random_range(-1_000_000..1_000_000)),
        })
        .collect()
}

/// A construct/mutate/release mix: one construction per target, a body
/// of interleaved writes and method calls, then every target released.
///
/// The mix is roughly one method call per three writes, which matches
/// the dispatch benchmarks' working profile.
pub fn mixed_call_stream(seed: u64, writes: usize, targets: u64) -> Vec<ReplicatedCall> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut calls = Vec::with_capacity(targets as usize * 2 + writes);

    for id in 1..=targets {
        calls.push(ReplicatedCall::MakeShared {
            id: ObjectId(id),
            name: "Counter".to_owned(),
            params: vec![(
                "count".to_owned(),
                PackedValue::Int(rng.random_range(0..100)),
            )],
            internal_state: Vec::new(),
        });
    }
    for _ in 0..writes {
        let id = ObjectId(rng.random_range(1..=targets));
        if rng.random_range(0..4) == 0 {
            calls.push(ReplicatedCall::CallMethod {
                id,
                name: "add".to_owned(),
                args: vec![("amount".to_owned(), PackedValue::Int(rng.random_range(1..10)))],
            });
        } else {
            calls.push(ReplicatedCall::SetParameter {
                id,
                name: "count".to_owned(),
                value: PackedValue::Int(rng.random_range(-1_000..1_000)),
            });
        }
    }
    for id in 1..=targets {
        calls.push(ReplicatedCall::Release { id: ObjectId(id) });
    }
    calls
}
