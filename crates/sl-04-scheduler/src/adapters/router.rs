//! # Cross-Shard Router
//!
//! The scheduler's side of the call/return protocol. Every `CrossShardCall`
//! a shard emits is delivered here, stamped with a request id, and handed to
//! the owning shard. Only the calling transaction waits for the reply.
//!
//! A call always completes with a message:
//!
//! | Situation | Reply |
//! |-----------|-------|
//! | callee returned | callee's `CrossShardReturn` / `Revert` |
//! | depth limit exceeded | `Revert` with `CallDepthExceeded` |
//! | no reply within the timeout | `Revert` with `CrossShardTimeout` |
//! | callee unreachable, block cancelled, protocol violation | `Revert` |
//!
//! Fallback replies carry the request's footprint, so the callee's effects
//! are discarded. An unreachable callee is also recorded; the scheduler
//! treats it as a transient failure of the whole execution attempt.

use crate::algorithms::planning::ShardResolver;
use async_trait::async_trait;
use parking_lot::Mutex;
use shardline_telemetry::metrics::CROSS_SHARD_CALLS;
use shared_types::{Address, TransactionStatus};
use sl_03_executor::{
    CrossShardRouter, ExecutionMessage, ExecutorError, ExecutorShard, MessageType, ShardId,
    StateView,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{trace, warn};

/// Routes cross-shard calls for one execution pass.
pub struct SchedulerRouter<'a> {
    view: &'a dyn StateView,
    shards: &'a [Arc<dyn ExecutorShard>],
    resolver: &'a ShardResolver,
    max_call_depth: u32,
    timeout: Duration,
    cancel: watch::Receiver<bool>,
    next_request_id: AtomicU64,
    failure: Mutex<Option<ExecutorError>>,
}

impl<'a> SchedulerRouter<'a> {
    /// Router delivering calls against `view`.
    pub fn new(
        view: &'a dyn StateView,
        shards: &'a [Arc<dyn ExecutorShard>],
        resolver: &'a ShardResolver,
        max_call_depth: u32,
        timeout: Duration,
        cancel: watch::Receiver<bool>,
    ) -> Self {
        Self {
            view,
            shards,
            resolver,
            max_call_depth,
            timeout,
            cancel,
            next_request_id: AtomicU64::new(0),
            failure: Mutex::new(None),
        }
    }

    /// First shard failure seen while routing, if any.
    pub fn take_failure(&self) -> Option<ExecutorError> {
        self.failure.lock().take()
    }

    /// Calls routed so far.
    pub fn requests(&self) -> u64 {
        self.next_request_id.load(Ordering::Relaxed)
    }

    fn record_failure(&self, error: ExecutorError) {
        let mut failure = self.failure.lock();
        if failure.is_none() {
            *failure = Some(error);
        }
    }

    /// A reply must answer the same call tree and advance its sequence.
    fn reply_is_valid((origin_tx, incarnation, seq): (u32, u32, u32), reply: &ExecutionMessage) -> bool {
        reply.kind.is_reply()
            && reply.origin_tx == origin_tx
            && reply.incarnation == incarnation
            && reply.seq > seq
    }
}

#[async_trait]
impl CrossShardRouter for SchedulerRouter<'_> {
    fn owner_of(&self, contract: &Address) -> ShardId {
        self.resolver.owner_of(contract)
    }

    fn max_call_depth(&self) -> u32 {
        self.max_call_depth
    }

    async fn call(&self, request: ExecutionMessage) -> ExecutionMessage {
        let request_id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        let mut fallback = ExecutionMessage::revert_for(&request, TransactionStatus::Revert);

        if request.kind != MessageType::CrossShardCall {
            warn!(request_id, kind = ?request.kind, "[sl-04] non-call message routed");
            self.record_failure(ExecutorError::InvalidMessage(format!(
                "routed {:?} as a call",
                request.kind
            )));
            CROSS_SHARD_CALLS.with_label_values(&["revert"]).inc();
            return fallback;
        }
        if request.depth > self.max_call_depth {
            fallback.status = TransactionStatus::CallDepthExceeded;
            CROSS_SHARD_CALLS.with_label_values(&["depth_exceeded"]).inc();
            return fallback;
        }
        if *self.cancel.borrow() {
            CROSS_SHARD_CALLS.with_label_values(&["revert"]).inc();
            return fallback;
        }
        let Some(shard) = self.shards.get(request.target_shard as usize) else {
            self.record_failure(ExecutorError::Unavailable {
                shard: request.target_shard,
                reason: "no such shard".to_string(),
            });
            CROSS_SHARD_CALLS.with_label_values(&["unavailable"]).inc();
            return fallback;
        };

        trace!(
            request_id,
            tx_index = request.origin_tx,
            seq = request.seq,
            depth = request.depth,
            target_shard = request.target_shard,
            "[sl-04] routing cross-shard call"
        );
        let sent = (request.origin_tx, request.incarnation, request.seq);

        match tokio::time::timeout(self.timeout, shard.handle_call(request, self.view, self)).await {
            Ok(Ok(reply)) if Self::reply_is_valid(sent, &reply) => {
                let outcome = if reply.status.is_success() {
                    "success"
                } else {
                    "revert"
                };
                CROSS_SHARD_CALLS.with_label_values(&[outcome]).inc();
                trace!(request_id, seq = reply.seq, status = ?reply.status, "[sl-04] cross-shard reply");
                reply
            }
            Ok(Ok(reply)) => {
                warn!(
                    request_id,
                    kind = ?reply.kind,
                    seq = reply.seq,
                    request_seq = sent.2,
                    "[sl-04] malformed cross-shard reply"
                );
                self.record_failure(ExecutorError::InvalidMessage(format!(
                    "reply {:?} seq {} to request seq {}",
                    reply.kind, reply.seq, sent.2
                )));
                CROSS_SHARD_CALLS.with_label_values(&["revert"]).inc();
                fallback
            }
            Ok(Err(e)) => {
                warn!(request_id, error = %e, "[sl-04] cross-shard call failed");
                let outcome = if e.is_transient() { "unavailable" } else { "revert" };
                CROSS_SHARD_CALLS.with_label_values(&[outcome]).inc();
                self.record_failure(e);
                fallback
            }
            Err(_) => {
                warn!(
                    request_id,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "[sl-04] cross-shard call timed out"
                );
                CROSS_SHARD_CALLS.with_label_values(&["timeout"]).inc();
                fallback.status = TransactionStatus::CrossShardTimeout;
                fallback
            }
        }
    }
}
