//! The seam between the coordinator and whatever carries its calls.

use chorus_core::{CallOutcome, TransportError};

/// Delivery of encoded calls to a fixed group of workers.
///
/// # Contract
///
/// `broadcast` delivers the frame to every worker and blocks until each
/// has applied it, returning one outcome per worker in worker-index
/// order. Frames must reach each worker in submission order; the
/// coordinator's total-order guarantee rests on that ordering plus the
/// blocking. A worker that cannot produce an outcome at all
/// (undecodable frame, unknown target object, death) is a
/// [`TransportError`] and ends the group.
pub trait GroupTransport {
    /// Deliver one encoded call to every worker and collect outcomes.
    fn broadcast(&self, frame: &[u8]) -> Result<Vec<CallOutcome>, TransportError>;

    /// Fixed number of workers in the group.
    fn workers(&self) -> usize;
}
