//! Worker-group configuration, validation, and error types.

use std::error::Error;
use std::fmt;

// ── GroupConfig ─────────────────────────────────────────────────

/// Shape of an in-process worker group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupConfig {
    /// Number of worker replicas. Default: 2.
    pub workers: usize,
    /// Capacity of each worker's call channel. Default: 64.
    pub channel_capacity: usize,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            workers: 2,
            channel_capacity: 64,
        }
    }
}

impl GroupConfig {
    /// Validate structural invariants.
    pub fn validate(&self) -> Result<(), GroupConfigError> {
        // 1. A group without workers replicates to nobody.
        if self.workers == 0 {
            return Err(GroupConfigError::NoWorkers);
        }
        // 2. A zero-capacity channel cannot carry a single frame.
        if self.channel_capacity == 0 {
            return Err(GroupConfigError::ZeroCapacity);
        }
        Ok(())
    }
}

// ── GroupConfigError ────────────────────────────────────────────

/// Errors detected during [`GroupConfig::validate`] or group startup.
#[derive(Debug, PartialEq, Eq)]
pub enum GroupConfigError {
    /// The group has zero workers.
    NoWorkers,
    /// The call channel capacity is zero.
    ZeroCapacity,
    /// A worker thread could not be spawned.
    ThreadSpawnFailed {
        /// Description of which thread failed.
        reason: String,
    },
}

impl fmt::Display for GroupConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoWorkers => write!(f, "group must have at least one worker"),
            Self::ZeroCapacity => write!(f, "channel_capacity must be at least 1"),
            Self::ThreadSpawnFailed { reason } => {
                write!(f, "thread spawn failed: {reason}")
            }
        }
    }
}

impl Error for GroupConfigError {}
