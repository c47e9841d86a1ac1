//! # Key/Value Shard
//!
//! Deterministic reference shard. Contracts are plain slot maps; a
//! transaction runs a list of [`Op`]s against its target contract.
//!
//! - Calls to contracts this shard owns run in place.
//! - Calls to contracts owned elsewhere go out through the router as
//!   `CrossShardCall` messages and suspend only the calling transaction.
//! - In optimistic mode reads fall through tx-local writes, then writes of
//!   earlier transactions of this block on this shard, then the view. Serial
//!   mode skips the middle layer.
//! - A failed call discards its writes and logs but keeps its reads.

use crate::domain::entities::{
    BatchItem, ExecutedTransaction, ExecutionMode, Footprint, ShardBatch, ShardId, StateKey,
    Version,
};
use crate::domain::errors::ExecutorError;
use crate::domain::message::{ExecutionMessage, MessageType};
use crate::domain::ops::{decode_counter, decode_ops, encode_counter, encode_ops, gas, Op};
use crate::ports::inbound::ExecutorShard;
use crate::ports::outbound::{CrossShardRouter, StateView};
use async_trait::async_trait;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use shared_crypto::CryptoSuite;
use shared_types::{Address, LogEntry, TransactionReceipt, TransactionStatus};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// Address of the contract created by `sender` with `nonce`.
pub fn create_address(suite: &CryptoSuite, sender: &Address, nonce: u64) -> Address {
    let hash = suite.hash_many(&[sender.as_slice(), &nonce.to_be_bytes()]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    address
}

/// Writes of this block's successful optimistic transactions on this shard.
#[derive(Default)]
struct Overlay {
    block_number: Option<u64>,
    writes: HashMap<StateKey, (Vec<u8>, Version)>,
}

/// The reference shard.
pub struct KvShard {
    id: ShardId,
    suite: Arc<CryptoSuite>,
    overlay: Mutex<Overlay>,
}

impl KvShard {
    /// Shard `id` hashing with `suite`.
    pub fn new(id: ShardId, suite: Arc<CryptoSuite>) -> Self {
        Self {
            id,
            suite,
            overlay: Mutex::new(Overlay::default()),
        }
    }

    /// Overlay entry written by a transaction before `before_tx`.
    fn overlay_read(&self, key: &StateKey, before_tx: u32) -> Option<(Vec<u8>, Version)> {
        self.overlay
            .lock()
            .writes
            .get(key)
            .filter(|(_, version)| version.tx_index < before_tx)
            .cloned()
    }

    async fn execute_item(
        &self,
        block_number: u64,
        mode: ExecutionMode,
        item: BatchItem,
        view: &dyn StateView,
        router: &dyn CrossShardRouter,
    ) -> ExecutedTransaction {
        let BatchItem {
            tx_index,
            incarnation,
            transaction: tx,
            gas_limit,
            ..
        } = item;
        let done = |receipt, footprint| ExecutedTransaction {
            tx_index,
            incarnation,
            receipt,
            footprint,
        };

        let sender = tx.sender_address();
        let (kind, contract) = match (tx.to, sender) {
            (Some(to), _) => (MessageType::Call, to),
            (None, Some(sender)) => (
                MessageType::Create,
                create_address(&self.suite, &sender, tx.nonce),
            ),
            (None, None) => {
                let receipt = TransactionReceipt::failure(TransactionStatus::Revert, 0, block_number);
                return done(receipt, Footprint::default());
            }
        };

        let intrinsic = match kind {
            MessageType::Create => gas::TX_BASE + gas::TX_CREATE,
            _ => gas::TX_BASE,
        };
        if gas_limit < intrinsic {
            let receipt =
                TransactionReceipt::failure(TransactionStatus::OutOfGas, gas_limit, block_number);
            return done(receipt, Footprint::default());
        }

        let request = ExecutionMessage {
            kind,
            origin_tx: tx_index,
            incarnation,
            seq: 0,
            depth: 0,
            from: sender.unwrap_or_default(),
            target_shard: self.id,
            target_contract: contract,
            input: tx.input,
            output: Vec::new(),
            gas_remaining: gas_limit - intrinsic,
            status: TransactionStatus::Success,
            footprint: Footprint::default(),
            logs: Vec::new(),
            mode,
        };
        let reply = self.execute_message(request, view, router).await;

        let success = reply.status.is_success();
        let receipt = TransactionReceipt {
            version: 0,
            status: reply.status,
            gas_used: gas_limit.saturating_sub(reply.gas_remaining),
            output: reply.output,
            logs: reply.logs,
            contract_address: (success && kind == MessageType::Create).then_some(contract),
            block_number,
        };
        trace!(
            shard = self.id,
            tx_index,
            incarnation,
            status = ?receipt.status,
            "[sl-03] transaction executed"
        );
        done(receipt, reply.footprint)
    }

    /// Run a top-level call, creation or cross-shard request to completion.
    async fn execute_message(
        &self,
        request: ExecutionMessage,
        view: &dyn StateView,
        router: &dyn CrossShardRouter,
    ) -> ExecutionMessage {
        let ops = match decode_ops(&request.input) {
            Ok(ops) => ops,
            Err(e) => {
                let mut reply = ExecutionMessage::revert_for(&request, TransactionStatus::Revert);
                reply.target_shard = self.id;
                reply.output = e.to_string().into_bytes();
                return reply;
            }
        };

        let ExecutionMessage {
            kind,
            origin_tx,
            incarnation,
            seq,
            depth,
            target_contract,
            gas_remaining,
            footprint,
            mode,
            ..
        } = request;
        let checkpoint = footprint.writes.clone();
        let mut ctx = CallContext {
            shard: self,
            view,
            router,
            mode,
            origin_tx,
            incarnation,
            seq,
            gas_remaining,
            footprint,
            logs: Vec::new(),
        };

        let result = ctx.run(target_contract, &ops, depth).await;
        let (kind, status, output) = match result {
            Ok(output) => {
                let kind = if kind == MessageType::CrossShardCall {
                    MessageType::CrossShardReturn
                } else {
                    MessageType::Return
                };
                (kind, TransactionStatus::Success, output)
            }
            Err(halt) => {
                ctx.footprint.writes = checkpoint;
                ctx.logs.clear();
                (MessageType::Revert, halt.status, halt.output)
            }
        };
        let gas_remaining = if status == TransactionStatus::OutOfGas {
            0
        } else {
            ctx.gas_remaining
        };

        ExecutionMessage {
            kind,
            origin_tx,
            incarnation,
            seq: ctx.seq + 1,
            depth,
            from: target_contract,
            target_shard: self.id,
            target_contract,
            input: Vec::new(),
            output,
            gas_remaining,
            status,
            footprint: ctx.footprint,
            logs: ctx.logs,
            mode,
        }
    }
}

#[async_trait]
impl ExecutorShard for KvShard {
    fn id(&self) -> ShardId {
        self.id
    }

    async fn begin_block(&self, block_number: u64) -> Result<(), ExecutorError> {
        let mut overlay = self.overlay.lock();
        overlay.block_number = Some(block_number);
        overlay.writes.clear();
        Ok(())
    }

    async fn execute_batch(
        &self,
        batch: ShardBatch,
        view: &dyn StateView,
        router: &dyn CrossShardRouter,
    ) -> Result<Vec<ExecutedTransaction>, ExecutorError> {
        if batch.mode == ExecutionMode::Optimistic
            && self.overlay.lock().block_number != Some(batch.block_number)
        {
            return Err(ExecutorError::InvalidBatch(format!(
                "shard {} did not begin block {}",
                self.id, batch.block_number
            )));
        }
        if let Some(item) = batch.items.iter().find(|i| i.target_shard != self.id) {
            return Err(ExecutorError::InvalidBatch(format!(
                "tx {} planned on shard {}, delivered to shard {}",
                item.tx_index, item.target_shard, self.id
            )));
        }

        debug!(
            shard = self.id,
            block_number = batch.block_number,
            mode = ?batch.mode,
            txs = batch.items.len(),
            "[sl-03] executing batch"
        );
        let mut results = Vec::with_capacity(batch.items.len());
        for item in batch.items {
            let executed = self
                .execute_item(batch.block_number, batch.mode, item, view, router)
                .await;
            if batch.mode == ExecutionMode::Optimistic && executed.receipt.status.is_success() {
                let version = Version {
                    tx_index: executed.tx_index,
                    incarnation: executed.incarnation,
                };
                let mut overlay = self.overlay.lock();
                for (key, value) in &executed.footprint.writes {
                    overlay.writes.insert(key.clone(), (value.clone(), version));
                }
            }
            results.push(executed);
        }
        Ok(results)
    }

    async fn handle_call(
        &self,
        request: ExecutionMessage,
        view: &dyn StateView,
        router: &dyn CrossShardRouter,
    ) -> Result<ExecutionMessage, ExecutorError> {
        if request.kind != MessageType::CrossShardCall {
            return Err(ExecutorError::InvalidMessage(format!(
                "expected CrossShardCall, got {:?}",
                request.kind
            )));
        }
        if request.target_shard != self.id {
            return Err(ExecutorError::InvalidMessage(format!(
                "call for shard {} delivered to shard {}",
                request.target_shard, self.id
            )));
        }
        Ok(self.execute_message(request, view, router).await)
    }

    async fn ping(&self) -> Result<(), ExecutorError> {
        Ok(())
    }
}

/// Why a call stopped early.
#[derive(Debug)]
struct Halt {
    status: TransactionStatus,
    output: Vec<u8>,
}

impl Halt {
    fn revert(reason: &[u8]) -> Self {
        Self {
            status: TransactionStatus::Revert,
            output: reason.to_vec(),
        }
    }
}

/// Execution state of one call tree on this shard.
struct CallContext<'a> {
    shard: &'a KvShard,
    view: &'a dyn StateView,
    router: &'a dyn CrossShardRouter,
    mode: ExecutionMode,
    origin_tx: u32,
    incarnation: u32,
    seq: u32,
    gas_remaining: u64,
    footprint: Footprint,
    logs: Vec<LogEntry>,
}

impl<'a> CallContext<'a> {
    fn charge(&mut self, cost: u64) -> Result<(), Halt> {
        if cost > self.gas_remaining {
            self.gas_remaining = 0;
            return Err(Halt {
                status: TransactionStatus::OutOfGas,
                output: Vec::new(),
            });
        }
        self.gas_remaining -= cost;
        Ok(())
    }

    fn read(&mut self, key: &StateKey) -> Option<Vec<u8>> {
        if let Some(value) = self.footprint.writes.get(key) {
            return Some(value.clone());
        }
        // Repeated reads see the first value even if the overlay moved on.
        if let Some(value) = self.footprint.first_read(key) {
            return value.map(<[u8]>::to_vec);
        }
        if self.mode == ExecutionMode::Optimistic {
            if let Some((value, version)) = self.shard.overlay_read(key, self.origin_tx) {
                self.footprint.record_read(key, Some(version), Some(value.as_slice()));
                return Some(value);
            }
        }
        match self.view.read(key) {
            Some((value, version)) => {
                self.footprint.record_read(key, version, Some(value.as_slice()));
                Some(value)
            }
            None => {
                self.footprint.record_read(key, None, None);
                None
            }
        }
    }

    fn write(&mut self, key: StateKey, value: Vec<u8>) {
        self.footprint.writes.insert(key, value);
    }

    fn run<'b>(
        &'b mut self,
        contract: Address,
        ops: &'b [Op],
        depth: u32,
    ) -> BoxFuture<'b, Result<Vec<u8>, Halt>> {
        Box::pin(async move {
            let mut output = Vec::new();
            for op in ops {
                self.charge(op.cost())?;
                match op {
                    Op::Set { key, value } => {
                        self.write(StateKey::new(contract, key.clone()), value.clone());
                    }
                    Op::Add { key, amount } => {
                        let slot = StateKey::new(contract, key.clone());
                        let current = match self.read(&slot) {
                            Some(raw) => decode_counter(&raw)
                                .ok_or_else(|| Halt::revert(b"slot is not a counter"))?,
                            None => 0,
                        };
                        let next = current
                            .checked_add(*amount)
                            .ok_or_else(|| Halt::revert(b"counter overflow"))?;
                        self.write(slot, encode_counter(next));
                    }
                    Op::Get { key } => {
                        if let Some(value) = self.read(&StateKey::new(contract, key.clone())) {
                            output.extend_from_slice(&value);
                        }
                    }
                    Op::Log { topics, data } => self.logs.push(LogEntry {
                        address: contract,
                        topics: topics.clone(),
                        data: data.clone(),
                    }),
                    Op::Call {
                        contract: callee,
                        ops: inner,
                        allow_failure,
                    } => match self.call(contract, *callee, inner, depth + 1).await {
                        Ok(out) => output.extend_from_slice(&out),
                        Err(halt) if *allow_failure && halt.status != TransactionStatus::OutOfGas => {
                            trace!(status = ?halt.status, "[sl-03] tolerated call failure");
                        }
                        Err(halt) => return Err(halt),
                    },
                    Op::Revert { reason } => return Err(Halt::revert(reason)),
                }
            }
            Ok(output)
        })
    }

    async fn call(
        &mut self,
        caller: Address,
        callee: Address,
        ops: &[Op],
        depth: u32,
    ) -> Result<Vec<u8>, Halt> {
        if depth > self.router.max_call_depth() {
            return Err(Halt {
                status: TransactionStatus::CallDepthExceeded,
                output: Vec::new(),
            });
        }

        let owner = self.router.owner_of(&callee);
        if owner == self.shard.id {
            let writes = self.footprint.writes.clone();
            let logs = self.logs.len();
            let result = self.run(callee, ops, depth).await;
            if result.is_err() {
                self.footprint.writes = writes;
                self.logs.truncate(logs);
            }
            return result;
        }

        let input = encode_ops(ops).map_err(|e| Halt::revert(e.to_string().as_bytes()))?;
        self.seq += 1;
        let request = ExecutionMessage {
            kind: MessageType::CrossShardCall,
            origin_tx: self.origin_tx,
            incarnation: self.incarnation,
            seq: self.seq,
            depth,
            from: caller,
            target_shard: owner,
            target_contract: callee,
            input,
            output: Vec::new(),
            gas_remaining: self.gas_remaining,
            status: TransactionStatus::Success,
            footprint: std::mem::take(&mut self.footprint),
            logs: Vec::new(),
            mode: self.mode,
        };

        let reply = self.router.call(request).await;
        self.seq = self.seq.max(reply.seq);
        self.gas_remaining = self.gas_remaining.min(reply.gas_remaining);
        self.footprint = reply.footprint;

        if reply.kind == MessageType::CrossShardReturn && reply.status.is_success() {
            self.logs.extend(reply.logs);
            Ok(reply.output)
        } else {
            let status = if reply.status.is_success() {
                TransactionStatus::Revert
            } else {
                reply.status
            };
            Err(Halt {
                status,
                output: reply.output,
            })
        }
    }
}
