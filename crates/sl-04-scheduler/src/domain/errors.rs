//! # Scheduler Errors
//!
//! Block-level failures. Transaction-level outcomes (revert, depth limit,
//! unresolved conflict) are receipt statuses and never show up here.

use sl_01_storage::StorageError;
use sl_02_ledger::LedgerError;
use sl_03_executor::{ExecutorError, ShardId};
use thiserror::Error;

/// How an error propagates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// The node must not continue.
    Fatal,
    /// The block fails as a unit and nothing is committed.
    BlockFatal,
    /// Only one transaction fails; recorded on its receipt.
    TransactionLocal,
    /// Retried with backoff, then block-fatal.
    Transient,
}

/// Malformed block. Reported before any execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanningError {
    /// Receipts present but not one per transaction.
    #[error("Receipt count mismatch: {transactions} transactions, {receipts} receipts")]
    ReceiptCountMismatch {
        /// Transactions in the block
        transactions: usize,
        /// Receipts in the block
        receipts: usize,
    },

    /// Sender is not a 20-byte address.
    #[error("Unknown sender format in transaction {tx_index} ({len} bytes)")]
    UnknownSenderFormat {
        /// Offending transaction
        tx_index: u32,
        /// Sender length
        len: usize,
    },

    /// Block does not follow the chain tip.
    #[error("Non-sequential block: expected {expected}, got {actual}")]
    NonSequentialBlock {
        /// Next expected number
        expected: u64,
        /// Number provided
        actual: u64,
    },

    /// Parent link does not name the chain tip.
    #[error("Parent mismatch: block does not reference block {expected_number} ({expected_hash})")]
    ParentMismatch {
        /// Tip number
        expected_number: u64,
        /// Tip hash (hex)
        expected_hash: String,
    },

    /// Header already carries signatures, so its roots cannot be filled in.
    #[error("Header of block {0} is already sealed")]
    SealedHeader(u64),

    /// No genesis block yet.
    #[error("Ledger not initialized")]
    LedgerNotInitialized,

    /// More transactions than a block can index.
    #[error("Too many transactions: {0}")]
    TooManyTransactions(usize),

    /// Block or header content rejected by the protocol rules.
    #[error("Invalid block: {0}")]
    InvalidBlock(String),
}

/// Scheduler errors.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Block rejected during planning.
    #[error(transparent)]
    Planning(#[from] PlanningError),

    /// Another block is being executed.
    #[error("Block {running} is in flight; rejected block {requested}")]
    BlockInFlight {
        /// Block currently executing
        running: u64,
        /// Block that was rejected
        requested: u64,
    },

    /// A shard stayed unreachable.
    #[error("Executor shard {shard} unavailable after {attempts} attempts: {reason}")]
    ExecutorUnavailable {
        /// Failing shard
        shard: ShardId,
        /// Attempts made
        attempts: u32,
        /// Last error
        reason: String,
    },

    /// Block was cancelled before commit.
    #[error("Block {0} cancelled")]
    Cancelled(u64),

    /// Cancellation arrived too late.
    #[error("Cannot cancel block {number} in state {state}")]
    CancelRejected {
        /// Block number
        number: u64,
        /// State it was in
        state: &'static str,
    },

    /// Cancellation for a block that is not executing.
    #[error("Block {0} is not in flight")]
    NotInFlight(u64),

    /// Storage refused the block's scope.
    #[error("Commit failed: {0}")]
    CommitFailed(String),

    /// The block's scope is durable but the ledger did not append it.
    #[error("Block {number} committed but not appended: {reason}")]
    CommittedNotAppended {
        /// Block number
        number: u64,
        /// Ledger error
        reason: String,
    },

    /// Ledger failure.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Storage failure outside commit.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Shard failure that retrying cannot fix.
    #[error("Executor error: {0}")]
    Executor(ExecutorError),

    /// State machine misuse. Should never happen.
    #[error("Invalid state transition: {from} -> {to}")]
    InvalidTransition {
        /// Current state
        from: &'static str,
        /// Attempted state
        to: &'static str,
    },

    /// Configuration failure.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl SchedulerError {
    /// Propagation class of this error.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::ExecutorUnavailable { .. } | Self::BlockInFlight { .. } => ErrorClass::Transient,
            Self::Executor(e) if e.is_transient() => ErrorClass::Transient,
            Self::Ledger(LedgerError::InvariantViolation(_))
            | Self::CommittedNotAppended { .. }
            | Self::InvalidTransition { .. }
            | Self::Config(_) => ErrorClass::Fatal,
            _ => ErrorClass::BlockFatal,
        }
    }
}

impl From<ExecutorError> for SchedulerError {
    fn from(e: ExecutorError) -> Self {
        match e {
            ExecutorError::Unavailable { shard, reason } => Self::ExecutorUnavailable {
                shard,
                attempts: 1,
                reason,
            },
            other => Self::Executor(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classes() {
        assert_eq!(
            SchedulerError::from(PlanningError::SealedHeader(1)).class(),
            ErrorClass::BlockFatal
        );
        assert_eq!(
            SchedulerError::CommitFailed("disk".into()).class(),
            ErrorClass::BlockFatal
        );
        assert_eq!(
            SchedulerError::Ledger(LedgerError::InvariantViolation("x".into())).class(),
            ErrorClass::Fatal
        );
        assert_eq!(
            SchedulerError::Config("bad".into()).class(),
            ErrorClass::Fatal
        );
        assert_eq!(
            SchedulerError::CommittedNotAppended {
                number: 1,
                reason: "tip".into()
            }
            .class(),
            ErrorClass::Fatal
        );
    }

    #[test]
    fn test_unavailable_executor_is_transient() {
        let err = SchedulerError::from(ExecutorError::Unavailable {
            shard: 2,
            reason: "down".into(),
        });
        assert!(matches!(err, SchedulerError::ExecutorUnavailable { shard: 2, .. }));
        assert_eq!(err.class(), ErrorClass::Transient);

        let err = SchedulerError::from(ExecutorError::InvalidBatch("x".into()));
        assert_eq!(err.class(), ErrorClass::BlockFatal);
    }
}
