//! Per-block state machine.

use std::fmt;

/// Why a block failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// Malformed block; nothing was executed.
    Planning(String),
    /// A shard stayed unreachable after every retry.
    ExecutorUnavailable(String),
    /// Cancelled before commit.
    Cancelled,
    /// The storage scope did not commit.
    CommitFailed(String),
    /// Any other block-fatal condition.
    Internal(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Planning(reason) => write!(f, "planning: {reason}"),
            Self::ExecutorUnavailable(reason) => write!(f, "executor unavailable: {reason}"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::CommitFailed(reason) => write!(f, "commit failed: {reason}"),
            Self::Internal(reason) => write!(f, "internal: {reason}"),
        }
    }
}

/// Lifecycle of one block inside the scheduler.
///
/// ```text
/// Received -> Planning -> Executing -> Aggregating -> Committing -> Finalized
///                            |  ^
///                            +--+  (re-execution of a stale transaction,
///                                   or retry after an unavailable shard)
/// Committing -> Halted   (scope committed, chain tip not advanced)
/// any non-terminal state -> Failed(reason)
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BlockState {
    /// Accepted, not yet inspected.
    #[default]
    Received,
    /// Shape checks and shard assignment.
    Planning,
    /// Optimistic pass, validation and re-execution.
    Executing,
    /// Receipts and roots.
    Aggregating,
    /// Storage scope open; cancellation no longer possible.
    Committing,
    /// Committed and appended.
    Finalized,
    /// Failed as a unit; nothing was committed.
    Failed(FailureReason),
    /// Committed to storage but the ledger refused to append it. Storage
    /// and chain tip disagree and the node must not continue.
    Halted(String),
}

impl BlockState {
    /// Check if transition to next state is valid.
    pub fn can_transition_to(&self, next: &BlockState) -> bool {
        match (self, next) {
            (Self::Received, Self::Planning) => true,
            (Self::Planning, Self::Executing) => true,
            (Self::Executing, Self::Executing) => true,
            (Self::Executing, Self::Aggregating) => true,
            (Self::Aggregating, Self::Committing) => true,
            (Self::Committing, Self::Finalized) => true,
            (Self::Committing, Self::Halted(_)) => true,
            (current, Self::Failed(_)) => !current.is_terminal(),
            _ => false,
        }
    }

    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finalized | Self::Failed(_) | Self::Halted(_))
    }

    /// Whether a cancellation request is still honoured.
    pub fn is_cancellable(&self) -> bool {
        matches!(
            self,
            Self::Received | Self::Planning | Self::Executing | Self::Aggregating
        )
    }

    /// Short name for logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Received => "Received",
            Self::Planning => "Planning",
            Self::Executing => "Executing",
            Self::Aggregating => "Aggregating",
            Self::Committing => "Committing",
            Self::Finalized => "Finalized",
            Self::Failed(_) => "Failed",
            Self::Halted(_) => "Halted",
        }
    }
}
