//! Test fixtures and mock types for chorus development.
//!
//! Provides standard synchronized types and backing-store mocks for
//! handle, map, and group tests, plus [`test_factory`] so coordinator
//! and worker sides of a test can register the identical type set from
//! one place.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{
    test_factory, CoreOp, CounterObject, FailingCore, InertObject, RecordingCore,
};
