//! Coordinator-side replication counters.

/// Counters accumulated by a replicating context.
///
/// chorus carries no logging framework; contexts expose plain counters
/// and the embedding application decides what to surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GroupMetrics {
    /// Calls encoded and broadcast to the group, of every kind.
    pub calls_broadcast: u64,
    /// Objects constructed group-wide.
    pub objects_created: u64,
    /// Objects released group-wide after their handle dropped.
    pub objects_released: u64,
    /// Release broadcasts that failed and were absorbed.
    pub release_failures: u64,
}
