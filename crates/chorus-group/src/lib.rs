//! Replicated call broadcast and worker-group coordination.
//!
//! A [`GroupContext`] is the coordinator end of a replicated object
//! graph: each construction, parameter change, mutating method call,
//! and release is encoded once and pushed through a [`GroupTransport`]
//! to every worker, which applies it to its own replica. Broadcasts
//! block until all workers report, so when a handle call returns, the
//! whole group has the new state.
//!
//! # Architecture
//!
//! - [`GroupContext`] originates calls and verifies that every worker
//!   reached the same verdict as the coordinator
//! - [`GroupTransport`] is the delivery seam; [`ThreadGroup`] is the
//!   in-process implementation with one OS thread per worker
//! - [`WorkerNode`] is the replica end: it decodes frames, applies
//!   them, and keeps the registry that resolves object IDs
//! - [`GroupMetrics`] counts what the coordinator has replicated
//!
//! Only the coordinator originates calls. Workers never talk back
//! except through per-call outcomes, which keeps every replica applying
//! the same calls in the same order.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod context;
pub mod metrics;
pub mod thread_group;
pub mod transport;
pub mod worker;

pub use chorus_core::{CallOutcome, GroupError, TransportError};
pub use config::{GroupConfig, GroupConfigError};
pub use context::GroupContext;
pub use metrics::GroupMetrics;
pub use thread_group::ThreadGroup;
pub use transport::GroupTransport;
pub use worker::{WorkerError, WorkerNode};
