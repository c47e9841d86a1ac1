//! # Inbound Ports (Driving Ports)
//!
//! The capability an executor shard offers the scheduler.

use crate::domain::entities::{ExecutedTransaction, ShardBatch, ShardId};
use crate::domain::errors::ExecutorError;
use crate::domain::message::ExecutionMessage;
use crate::ports::outbound::{CrossShardRouter, StateView};
use async_trait::async_trait;

/// An isolated execution unit.
///
/// ## Determinism
///
/// The same batch against the same view and the same replies must produce
/// the same results on every machine. Footprints must be reported honestly;
/// conflict detection relies on them.
#[async_trait]
pub trait ExecutorShard: Send + Sync {
    /// Shard identifier.
    fn id(&self) -> ShardId;

    /// Reset per-block state before the optimistic pass of `block_number`.
    async fn begin_block(&self, block_number: u64) -> Result<(), ExecutorError>;

    /// Execute `batch` in order. Returns one result per item, in item order.
    async fn execute_batch(
        &self,
        batch: ShardBatch,
        view: &dyn StateView,
        router: &dyn CrossShardRouter,
    ) -> Result<Vec<ExecutedTransaction>, ExecutorError>;

    /// Execute a `CrossShardCall` addressed to this shard.
    async fn handle_call(
        &self,
        request: ExecutionMessage,
        view: &dyn StateView,
        router: &dyn CrossShardRouter,
    ) -> Result<ExecutionMessage, ExecutorError>;

    /// Liveness check.
    async fn ping(&self) -> Result<(), ExecutorError>;
}
