//! Fault injection around a shard.
//!
//! Used to exercise the scheduler's retry, timeout and cancellation paths.

use crate::domain::entities::{ExecutedTransaction, ShardBatch, ShardId};
use crate::domain::errors::ExecutorError;
use crate::domain::message::ExecutionMessage;
use crate::ports::inbound::ExecutorShard;
use crate::ports::outbound::{CrossShardRouter, StateView};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::time::Duration;
use tracing::warn;

/// Wraps a shard and fails or delays its operations on demand.
pub struct FaultyShard<S> {
    inner: S,
    failures_left: AtomicU32,
    down: AtomicBool,
    call_delay_ms: AtomicU64,
    batch_delay_ms: AtomicU64,
}

impl<S: ExecutorShard> FaultyShard<S> {
    /// Healthy wrapper.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            failures_left: AtomicU32::new(0),
            down: AtomicBool::new(false),
            call_delay_ms: AtomicU64::new(0),
            batch_delay_ms: AtomicU64::new(0),
        }
    }

    /// Fail the next `n` operations with `Unavailable`.
    pub fn fail_next(&self, n: u32) {
        self.failures_left.store(n, Ordering::SeqCst);
    }

    /// Fail every operation until cleared.
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    /// Delay every `handle_call`.
    pub fn set_call_delay(&self, delay: Duration) {
        self.call_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// Delay every `execute_batch`.
    pub fn set_batch_delay(&self, delay: Duration) {
        self.batch_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// Wrapped shard.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn check(&self, operation: &str) -> Result<(), ExecutorError> {
        let injected = self.down.load(Ordering::SeqCst)
            || self
                .failures_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
        if injected {
            warn!(shard = self.inner.id(), operation, "[sl-03] injected shard failure");
            return Err(ExecutorError::Unavailable {
                shard: self.inner.id(),
                reason: format!("injected failure in {operation}"),
            });
        }
        Ok(())
    }

    async fn delay(millis: &AtomicU64) {
        let ms = millis.load(Ordering::SeqCst);
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }
}

#[async_trait]
impl<S: ExecutorShard> ExecutorShard for FaultyShard<S> {
    fn id(&self) -> ShardId {
        self.inner.id()
    }

    async fn begin_block(&self, block_number: u64) -> Result<(), ExecutorError> {
        self.check("begin_block")?;
        self.inner.begin_block(block_number).await
    }

    async fn execute_batch(
        &self,
        batch: ShardBatch,
        view: &dyn StateView,
        router: &dyn CrossShardRouter,
    ) -> Result<Vec<ExecutedTransaction>, ExecutorError> {
        self.check("execute_batch")?;
        Self::delay(&self.batch_delay_ms).await;
        self.inner.execute_batch(batch, view, router).await
    }

    async fn handle_call(
        &self,
        request: ExecutionMessage,
        view: &dyn StateView,
        router: &dyn CrossShardRouter,
    ) -> Result<ExecutionMessage, ExecutorError> {
        self.check("handle_call")?;
        Self::delay(&self.call_delay_ms).await;
        self.inner.handle_call(request, view, router).await
    }

    async fn ping(&self) -> Result<(), ExecutorError> {
        self.check("ping")?;
        self.inner.ping().await
    }
}
