//! Executor error types.
//!
//! Transaction-level failures are receipt statuses, not errors. An
//! [`ExecutorError`] means the shard could not do its job at all.

use crate::domain::entities::ShardId;
use shared_types::CodecError;
use thiserror::Error;

/// Shard-level failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutorError {
    /// The shard crashed or cannot be reached. Transient.
    #[error("Executor shard {shard} unavailable: {reason}")]
    Unavailable {
        /// Shard that failed
        shard: ShardId,
        /// Cause
        reason: String,
    },

    /// A message of the wrong kind was delivered.
    #[error("Invalid execution message: {0}")]
    InvalidMessage(String),

    /// The batch or its result is inconsistent.
    #[error("Invalid batch: {0}")]
    InvalidBatch(String),

    /// Encoding failure.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl ExecutorError {
    /// True when retrying may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}
