//! # Outbound Ports (Driven Ports)
//!
//! What a shard needs from its environment while executing: a state view
//! and a router for calls it cannot resolve locally. Both are supplied per
//! call by the scheduler.

use crate::domain::entities::{ShardId, StateKey, Version};
use crate::domain::message::ExecutionMessage;
use async_trait::async_trait;
use shared_types::Address;

/// Read-only state a shard executes against.
pub trait StateView: Send + Sync {
    /// Value of `key` and the version that wrote it. `None` version means
    /// the pre-block state.
    fn read(&self, key: &StateKey) -> Option<(Vec<u8>, Option<Version>)>;
}

/// Delivers cross-shard calls.
///
/// Implemented by the scheduler. A call never fails: timeouts, depth limits
/// and unreachable shards come back as a `Revert` reply carrying the
/// request's footprint unchanged.
#[async_trait]
pub trait CrossShardRouter: Send + Sync {
    /// Shard owning `contract`.
    fn owner_of(&self, contract: &Address) -> ShardId;

    /// Deepest allowed call depth.
    fn max_call_depth(&self) -> u32;

    /// Deliver a `CrossShardCall` and wait for its reply.
    async fn call(&self, request: ExecutionMessage) -> ExecutionMessage;
}
