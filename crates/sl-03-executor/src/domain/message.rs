//! # Execution Messages
//!
//! The unit exchanged between the scheduler and shards. A message is moved
//! from sender to receiver; the footprint of the calling transaction travels
//! inside it, so exactly one side owns the transaction's effects at any time.
//!
//! Within one transaction's call tree `seq` strictly increases: a callee
//! numbers its own messages after the request's `seq`, and its reply carries
//! the next free number back to the caller.

use crate::domain::entities::{ExecutionMode, Footprint, ShardId};
use shared_types::{Address, LogEntry, TransactionStatus};

/// Message kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    /// Top-level call of a transaction.
    Call,
    /// Top-level contract creation.
    Create,
    /// Successful local completion.
    Return,
    /// Request to a contract owned by another shard.
    CrossShardCall,
    /// Successful reply to a [`MessageType::CrossShardCall`].
    CrossShardReturn,
    /// Failed reply; effects of the call were discarded.
    Revert,
}

impl MessageType {
    /// True for reply kinds.
    pub fn is_reply(&self) -> bool {
        matches!(self, Self::Return | Self::CrossShardReturn | Self::Revert)
    }
}

/// A call or reply moving between scheduler and shards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionMessage {
    /// Kind.
    pub kind: MessageType,
    /// Block position of the transaction this call tree belongs to.
    pub origin_tx: u32,
    /// Execution attempt of that transaction.
    pub incarnation: u32,
    /// Sequence number within the call tree.
    pub seq: u32,
    /// Call depth; the top-level call is 0.
    pub depth: u32,
    /// Calling contract (for replies: the contract that replied).
    pub from: Address,
    /// Shard that executes the request (for replies: the shard that replied).
    pub target_shard: ShardId,
    /// Called contract.
    pub target_contract: Address,
    /// Encoded operations for requests.
    pub input: Vec<u8>,
    /// Return data or revert reason for replies.
    pub output: Vec<u8>,
    /// Gas left for the rest of the transaction.
    pub gas_remaining: u64,
    /// Outcome for replies; `Success` on requests.
    pub status: TransactionStatus,
    /// The transaction's footprint so far.
    pub footprint: Footprint,
    /// Logs emitted by the callee, in order.
    pub logs: Vec<LogEntry>,
    /// Read resolution mode of the transaction.
    pub mode: ExecutionMode,
}

impl ExecutionMessage {
    /// Failed reply to `request` that leaves the caller's footprint as it was
    /// when the request was sent.
    pub fn revert_for(request: &ExecutionMessage, status: TransactionStatus) -> Self {
        Self {
            kind: MessageType::Revert,
            origin_tx: request.origin_tx,
            incarnation: request.incarnation,
            seq: request.seq + 1,
            depth: request.depth,
            from: request.target_contract,
            target_shard: request.target_shard,
            target_contract: request.target_contract,
            input: Vec::new(),
            output: Vec::new(),
            gas_remaining: request.gas_remaining,
            status,
            footprint: request.footprint.clone(),
            logs: Vec::new(),
            mode: request.mode,
        }
    }
}
