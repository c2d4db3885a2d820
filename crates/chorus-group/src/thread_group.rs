//! In-process reference transport: one replica per thread.
//!
//! Each worker thread owns its [`WorkerNode`] exclusively (built inside
//! `thread::spawn` from a cloned factory). Frames arrive over a bounded
//! crossbeam channel and every frame carries its own reply sender, so
//! the coordinator can block per-call without any shared state.

use std::thread::{self, JoinHandle};

use chorus_core::{CallOutcome, TransportError};
use chorus_object::Factory;
use crossbeam_channel::{Receiver, Sender};

use crate::config::{GroupConfig, GroupConfigError};
use crate::transport::GroupTransport;
use crate::worker::{WorkerError, WorkerNode};

/// One encoded call submitted to a worker, paired with a reply channel
/// for the outcome.
struct CallFrame {
    bytes: Vec<u8>,
    reply: Sender<Result<CallOutcome, WorkerError>>,
}

/// A fixed group of worker threads, each running one replica.
///
/// Dropping the group disconnects every call channel and joins the
/// threads; replicas disappear with them.
#[derive(Debug)]
pub struct ThreadGroup {
    senders: Vec<Sender<CallFrame>>,
    threads: Vec<JoinHandle<()>>,
}

impl ThreadGroup {
    /// Validate `config` and spawn the worker threads.
    ///
    /// Every worker builds its replica from a clone of `factory`, so
    /// all participants register the identical type set.
    pub fn spawn(config: &GroupConfig, factory: &Factory) -> Result<Self, GroupConfigError> {
        config.validate()?;

        let mut senders = Vec::with_capacity(config.workers);
        let mut threads = Vec::with_capacity(config.workers);
        for index in 0..config.workers {
            let (frame_tx, frame_rx) = crossbeam_channel::bounded(config.channel_capacity);
            let worker_factory = factory.clone();
            let handle = thread::Builder::new()
                .name(format!("chorus-worker-{index}"))
                .spawn(move || worker_loop(worker_factory, frame_rx))
                .map_err(|err| GroupConfigError::ThreadSpawnFailed {
                    reason: format!("worker {index}: {err}"),
                })?;
            senders.push(frame_tx);
            threads.push(handle);
        }

        Ok(Self { senders, threads })
    }
}

/// Worker main loop: runs until the frame channel disconnects.
fn worker_loop(factory: Factory, frames: Receiver<CallFrame>) {
    let mut node = WorkerNode::new(factory);
    while let Ok(frame) = frames.recv() {
        let outcome = node.apply_bytes(&frame.bytes);
        // Best-effort reply; the coordinator may already have given up
        // on this call after another worker faulted.
        let _ = frame.reply.send(outcome);
    }
}

impl GroupTransport for ThreadGroup {
    fn broadcast(&self, frame: &[u8]) -> Result<Vec<CallOutcome>, TransportError> {
        // Send to every worker first, then wait for every reply, so
        // workers apply in parallel while staying one call in step.
        let mut replies = Vec::with_capacity(self.senders.len());
        for (index, sender) in self.senders.iter().enumerate() {
            let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
            let call = CallFrame {
                bytes: frame.to_vec(),
                reply: reply_tx,
            };
            sender
                .send(call)
                .map_err(|_| TransportError::WorkerLost { index })?;
            replies.push((index, reply_rx));
        }

        let mut outcomes = Vec::with_capacity(replies.len());
        for (index, reply_rx) in replies {
            match reply_rx.recv() {
                Ok(Ok(outcome)) => outcomes.push(outcome),
                Ok(Err(fault)) => {
                    return Err(TransportError::WorkerFault {
                        index,
                        detail: fault.to_string(),
                    })
                }
                Err(_) => return Err(TransportError::WorkerLost { index }),
            }
        }
        Ok(outcomes)
    }

    fn workers(&self) -> usize {
        self.senders.len()
    }
}

impl Drop for ThreadGroup {
    fn drop(&mut self) {
        // Disconnect the channels; each worker's recv() fails and its
        // loop exits.
        self.senders.clear();
        for handle in self.threads.drain(..) {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chorus_codec::codec::encode_call;
    use chorus_core::{ObjectId, ReplicatedCall};

    fn frame(call: &ReplicatedCall) -> Vec<u8> {
        let mut bytes = Vec::new();
        encode_call(&mut bytes, call).unwrap();
        bytes
    }

    #[test]
    fn broadcast_reaches_every_worker() {
        let config = GroupConfig {
            workers: 3,
            channel_capacity: 4,
        };
        let group = ThreadGroup::spawn(&config, &Factory::new()).unwrap();

        // Releasing an unregistered id is a no-op every worker applies.
        let call = ReplicatedCall::Release { id: ObjectId(9) };
        let outcomes = group.broadcast(&frame(&call)).unwrap();
        assert_eq!(outcomes, vec![CallOutcome::Applied; 3]);
        assert_eq!(group.workers(), 3);
    }

    #[test]
    fn malformed_frames_fault_the_group() {
        let group = ThreadGroup::spawn(&GroupConfig::default(), &Factory::new()).unwrap();
        let err = group.broadcast(&[0xFF, 0x00]).unwrap_err();
        assert!(matches!(err, TransportError::WorkerFault { index: 0, .. }));
    }

    #[test]
    fn workers_survive_a_bad_frame() {
        let group = ThreadGroup::spawn(&GroupConfig::default(), &Factory::new()).unwrap();
        let _ = group.broadcast(&[0xFF]).unwrap_err();

        // The loop replied with the fault and kept going.
        let call = ReplicatedCall::Release { id: ObjectId(1) };
        let outcomes = group.broadcast(&frame(&call)).unwrap();
        assert_eq!(outcomes, vec![CallOutcome::Applied; 2]);
    }

    #[test]
    fn invalid_config_does_not_spawn() {
        let config = GroupConfig {
            workers: 0,
            ..GroupConfig::default()
        };
        let err = ThreadGroup::spawn(&config, &Factory::new()).unwrap_err();
        assert_eq!(err, GroupConfigError::NoWorkers);
    }

    #[test]
    fn drop_joins_cleanly() {
        let group = ThreadGroup::spawn(&GroupConfig::default(), &Factory::new()).unwrap();
        drop(group);
    }
}
