//! # Scheduler Service
//!
//! Drives one block at a time through
//! `Received -> Planning -> Executing -> Aggregating -> Committing -> Finalized`.
//!
//! ## Execution
//!
//! 1. Every shard begins the block; shards with work run their batches
//!    concurrently against the pre-block snapshot. Cross-shard calls go
//!    through a [`SchedulerRouter`].
//! 2. Results are validated in block order against the finalized prefix.
//!    A stale transaction is re-executed serially against the prefix, up to
//!    `max_reexecutions` times, then failed with
//!    `ExecutionConflictUnresolved`.
//! 3. An unreachable shard fails the whole attempt; it is retried from
//!    scratch with exponential backoff.
//!
//! ## Commit
//!
//! State writes, new contract affinities and the ledger index go into one
//! storage scope. Any failure rolls it back; only a committed scope reaches
//! the ledger's chain tip.

use crate::adapters::router::SchedulerRouter;
use crate::algorithms::planning::{plan_block, ShardResolver};
use crate::algorithms::validation::{post_state_root, FinalizedPrefix, FinalizedView, StaleRead};
use crate::config::SchedulerConfig;
use crate::domain::errors::{PlanningError, SchedulerError};
use crate::domain::plan::ExecutionPlan;
use crate::domain::state::{BlockState, FailureReason};
use crate::ports::inbound::BlockExecutionApi;
use async_trait::async_trait;
use futures::future::join_all;
use parking_lot::Mutex;
use shardline_telemetry::metrics::{
    BLOCKS_FAILED, BLOCKS_FINALIZED, BLOCK_EXECUTION_DURATION, TX_CONFLICTS_UNRESOLVED,
    TX_REEXECUTIONS,
};
use shardline_telemetry::{log_block_event, log_tx_event, HistogramTimer};
use shared_crypto::CryptoSuite;
use shared_types::{
    Address, Block, ParentInfo, ProtocolError, TransactionReceipt, TransactionStatus, U256,
};
use sl_01_storage::{tables, ScopeId, StorageSnapshot, TransactionalStorage};
use sl_02_ledger::{FinalizedBlock, Ledger, LedgerError, StagedBlock};
use sl_03_executor::{
    ExecutedTransaction, ExecutionMode, ExecutorError, ExecutorShard, Footprint, ShardBatch,
    ShardId, SnapshotView, StateView, Version,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

/// Finished blocks whose state stays queryable.
const STATE_HISTORY: usize = 256;

/// The block currently owned by the scheduler.
struct InFlight {
    number: u64,
    state: BlockState,
    cancel: watch::Sender<bool>,
}

/// Everything one block's execution reads.
struct BlockRun<'a> {
    block: &'a Block,
    plan: &'a ExecutionPlan,
    resolver: &'a ShardResolver,
    base: SnapshotView,
    cancel: watch::Receiver<bool>,
}

impl BlockRun<'_> {
    fn number(&self) -> u64 {
        self.block.number()
    }

    fn check_cancelled(&self) -> Result<(), SchedulerError> {
        if *self.cancel.borrow() {
            return Err(SchedulerError::Cancelled(self.number()));
        }
        Ok(())
    }

    fn snapshot(&self) -> &StorageSnapshot {
        self.base.snapshot()
    }
}

/// Resolves once the block is cancelled.
async fn cancelled(mut cancel: watch::Receiver<bool>) {
    if cancel.wait_for(|flag| *flag).await.is_err() {
        // Sender gone: nobody can cancel any more.
        std::future::pending::<()>().await;
    }
}

/// Final per-transaction results of one successful attempt.
struct Executed {
    results: Vec<ExecutedTransaction>,
    prefix: FinalizedPrefix,
}

/// The execution orchestrator.
pub struct Scheduler<S: TransactionalStorage> {
    config: SchedulerConfig,
    suite: Arc<CryptoSuite>,
    ledger: Arc<Ledger<S>>,
    storage: Arc<S>,
    shards: Vec<Arc<dyn ExecutorShard>>,
    /// Held for the whole lifetime of a block.
    execution: tokio::sync::Mutex<()>,
    in_flight: Mutex<Option<InFlight>>,
    history: Mutex<BTreeMap<u64, BlockState>>,
}

impl<S: TransactionalStorage + 'static> Scheduler<S> {
    /// Scheduler over `shards`, which must be numbered `0..shard_count` in
    /// order.
    pub fn new(
        config: SchedulerConfig,
        suite: Arc<CryptoSuite>,
        ledger: Arc<Ledger<S>>,
        storage: Arc<S>,
        shards: Vec<Arc<dyn ExecutorShard>>,
    ) -> Result<Self, SchedulerError> {
        config.validate()?;
        if shards.len() != config.shard_count as usize {
            return Err(SchedulerError::Config(format!(
                "{} shards configured, {} provided",
                config.shard_count,
                shards.len()
            )));
        }
        if let Some((index, shard)) = shards
            .iter()
            .enumerate()
            .find(|(index, shard)| shard.id() as usize != *index)
        {
            return Err(SchedulerError::Config(format!(
                "shard at position {index} reports id {}",
                shard.id()
            )));
        }

        info!(
            shard_count = config.shard_count,
            max_reexecutions = config.max_reexecutions,
            "[sl-04] scheduler ready"
        );
        Ok(Self {
            config,
            suite,
            ledger,
            storage,
            shards,
            execution: tokio::sync::Mutex::new(()),
            in_flight: Mutex::new(None),
            history: Mutex::new(BTreeMap::new()),
        })
    }

    /// Configuration in use.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Ledger blocks are committed to.
    pub fn ledger(&self) -> &Arc<Ledger<S>> {
        &self.ledger
    }

    /// Execute, commit and append `block`.
    ///
    /// Only one block runs at a time; a concurrent call is rejected with
    /// [`SchedulerError::BlockInFlight`] without touching either block.
    #[instrument(skip(self, block), fields(number = block.number(), txs = block.transactions.len()))]
    pub async fn execute_block(&self, block: Block) -> Result<FinalizedBlock, SchedulerError> {
        let number = block.number();
        let Ok(_guard) = self.execution.try_lock() else {
            let running = self
                .in_flight
                .lock()
                .as_ref()
                .map_or(number, |flight| flight.number);
            warn!(running, requested = number, "[sl-04] block rejected, another is in flight");
            return Err(SchedulerError::BlockInFlight {
                running,
                requested: number,
            });
        };

        let (cancel_tx, cancel_rx) = watch::channel(false);
        *self.in_flight.lock() = Some(InFlight {
            number,
            state: BlockState::Received,
            cancel: cancel_tx,
        });
        let _timer = HistogramTimer::new(&BLOCK_EXECUTION_DURATION);

        let result = self.run_block(block, cancel_rx).await;
        let final_state = match &result {
            Ok(finalized) => {
                BLOCKS_FINALIZED.inc();
                log_block_event!(
                    info,
                    "sl-04",
                    "[sl-04] block finalized",
                    number,
                    hex::encode(finalized.hash()),
                    txs = finalized.block().transactions.len()
                );
                BlockState::Finalized
            }
            Err(SchedulerError::CommittedNotAppended { reason, .. }) => {
                error!(number, reason = %reason, "[sl-04] storage and chain tip diverged, node must stop");
                BlockState::Halted(reason.clone())
            }
            Err(e) => {
                BLOCKS_FAILED.inc();
                error!(number, error = %e, class = ?e.class(), "[sl-04] block failed");
                BlockState::Failed(Self::failure_reason(e))
            }
        };

        let flight = self.in_flight.lock().take();
        if let Some(flight) = flight {
            if flight.state != final_state && !flight.state.can_transition_to(&final_state) {
                error!(from = flight.state.name(), to = final_state.name(), "[sl-04] unexpected final state");
            }
        }
        let mut history = self.history.lock();
        history.insert(number, final_state);
        while history.len() > STATE_HISTORY {
            history.pop_first();
        }
        result
    }

    /// Cancel the in-flight block `number`.
    ///
    /// Allowed until the block reaches `Committing`; the block then fails
    /// with [`SchedulerError::Cancelled`] and nothing of it is committed.
    pub fn cancel(&self, number: u64) -> Result<(), SchedulerError> {
        let in_flight = self.in_flight.lock();
        match in_flight.as_ref() {
            Some(flight) if flight.number == number => {
                if !flight.state.is_cancellable() {
                    return Err(SchedulerError::CancelRejected {
                        number,
                        state: flight.state.name(),
                    });
                }
                flight.cancel.send_replace(true);
                info!(number, state = flight.state.name(), "[sl-04] cancellation requested");
                Ok(())
            }
            _ => Err(SchedulerError::NotInFlight(number)),
        }
    }

    /// Current or final state of block `number`.
    pub fn state_of(&self, number: u64) -> Option<BlockState> {
        if let Some(flight) = self.in_flight.lock().as_ref() {
            if flight.number == number {
                return Some(flight.state.clone());
            }
        }
        self.history.lock().get(&number).cloned()
    }

    fn failure_reason(error: &SchedulerError) -> FailureReason {
        match error {
            SchedulerError::Planning(e) => FailureReason::Planning(e.to_string()),
            SchedulerError::ExecutorUnavailable { .. } => {
                FailureReason::ExecutorUnavailable(error.to_string())
            }
            SchedulerError::Cancelled(_) => FailureReason::Cancelled,
            SchedulerError::CommitFailed(reason) => FailureReason::CommitFailed(reason.clone()),
            other => FailureReason::Internal(other.to_string()),
        }
    }

    /// Move the in-flight block to `next`.
    ///
    /// Entering `Committing` checks the cancellation flag under the same
    /// lock [`Scheduler::cancel`] takes, so a block is either cancelled or
    /// committing, never both.
    fn transition(&self, next: BlockState) -> Result<(), SchedulerError> {
        let mut in_flight = self.in_flight.lock();
        let flight = in_flight.as_mut().ok_or(SchedulerError::InvalidTransition {
            from: "None",
            to: next.name(),
        })?;
        if !flight.state.can_transition_to(&next) {
            return Err(SchedulerError::InvalidTransition {
                from: flight.state.name(),
                to: next.name(),
            });
        }
        if next == BlockState::Committing && *flight.cancel.borrow() {
            return Err(SchedulerError::Cancelled(flight.number));
        }
        debug!(number = flight.number, from = flight.state.name(), to = next.name(), "[sl-04] state transition");
        flight.state = next;
        Ok(())
    }

    async fn run_block(
        &self,
        block: Block,
        cancel: watch::Receiver<bool>,
    ) -> Result<FinalizedBlock, SchedulerError> {
        self.transition(BlockState::Planning)?;
        let snapshot = self.storage.snapshot();
        let (mut block, plan, resolver) = self.plan(block, snapshot.clone())?;

        self.transition(BlockState::Executing)?;
        let run = BlockRun {
            block: &block,
            plan: &plan,
            resolver: &resolver,
            base: SnapshotView::new(snapshot),
            cancel,
        };
        let executed = self.execute_with_retry(&run).await?;

        self.transition(BlockState::Aggregating)?;
        run.check_cancelled()?;
        let state_root = post_state_root(&self.suite, run.snapshot(), &executed.prefix);
        let created = Self::created_contracts(&plan, &executed.results);
        drop(run);
        Self::aggregate(&mut block, executed.results, state_root)?;

        self.transition(BlockState::Committing)?;
        let finalized = self.commit(block, &executed.prefix, &created).await?;
        self.transition(BlockState::Finalized)?;
        Ok(finalized)
    }

    /// Shape, sender, continuity and parent checks, then placement.
    fn plan(
        &self,
        mut block: Block,
        snapshot: StorageSnapshot,
    ) -> Result<(Block, ExecutionPlan, ShardResolver), SchedulerError> {
        block.validate_shape().map_err(|e| match e {
            ProtocolError::ReceiptCountMismatch {
                transactions,
                receipts,
            } => PlanningError::ReceiptCountMismatch {
                transactions,
                receipts,
            },
            other => PlanningError::InvalidBlock(other.to_string()),
        })?;
        if block.header.is_sealed() {
            return Err(PlanningError::SealedHeader(block.number()).into());
        }

        let not_initialized = |e: LedgerError| match e {
            LedgerError::NotInitialized => SchedulerError::from(PlanningError::LedgerNotInitialized),
            other => SchedulerError::from(other),
        };
        let latest = self.ledger.latest_block_number().map_err(not_initialized)?;
        let latest_hash = self.ledger.latest_block_hash().map_err(not_initialized)?;
        let tx_gas_limit = self.ledger.ledger_config().map_err(not_initialized)?.tx_gas_limit;

        if block.number() != latest + 1 {
            return Err(PlanningError::NonSequentialBlock {
                expected: latest + 1,
                actual: block.number(),
            }
            .into());
        }

        let parent = ParentInfo {
            block_number: latest,
            block_hash: latest_hash,
        };
        if block.header.parent_info().is_empty() {
            block
                .header
                .set_parent_info(vec![parent])
                .map_err(|e| PlanningError::InvalidBlock(e.to_string()))?;
        } else if self.config.verify_parent && !block.header.parent_info().contains(&parent) {
            return Err(PlanningError::ParentMismatch {
                expected_number: latest,
                expected_hash: hex::encode(latest_hash),
            }
            .into());
        }

        let mut resolver = ShardResolver::new(Arc::clone(&self.suite), snapshot, self.config.shard_count);
        let plan = plan_block(&block, &mut resolver, tx_gas_limit)?;
        Ok((block, plan, resolver))
    }

    /// Run execution attempts until one completes, retrying unavailable
    /// shards with backoff.
    async fn execute_with_retry(&self, run: &BlockRun<'_>) -> Result<Executed, SchedulerError> {
        let mut retry = 0u32;
        loop {
            run.check_cancelled()?;
            match self.execute_attempt(run).await {
                Ok(executed) => return Ok(executed),
                Err(SchedulerError::ExecutorUnavailable { shard, reason, .. })
                    if retry < self.config.executor_retry_attempts =>
                {
                    let delay = self.config.retry_backoff(retry);
                    retry += 1;
                    warn!(
                        number = run.number(),
                        shard,
                        retry,
                        delay_ms = delay.as_millis() as u64,
                        reason = %reason,
                        "[sl-04] executor unavailable, retrying"
                    );
                    self.transition(BlockState::Executing)?;
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = cancelled(run.cancel.clone()) => {
                            return Err(SchedulerError::Cancelled(run.number()));
                        }
                    }
                }
                Err(SchedulerError::ExecutorUnavailable { shard, reason, .. }) => {
                    return Err(SchedulerError::ExecutorUnavailable {
                        shard,
                        attempts: retry + 1,
                        reason,
                    });
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// One optimistic pass plus validation. Partial results of a failed
    /// attempt are dropped.
    async fn execute_attempt(&self, run: &BlockRun<'_>) -> Result<Executed, SchedulerError> {
        let number = run.number();
        let tx_count = run.plan.len();

        join_all(self.shards.iter().map(|shard| shard.begin_block(number)))
            .await
            .into_iter()
            .collect::<Result<Vec<()>, ExecutorError>>()?;

        let router = self.router(&run.base, run);
        let batches = run.plan.optimistic_batches(&run.block.transactions);
        let passes = batches.into_iter().map(|(shard_id, batch)| {
            let shard = Arc::clone(&self.shards[shard_id as usize]);
            let router = &router;
            let base = &run.base;
            async move { (shard_id, shard.execute_batch(batch, base, router).await) }
        });
        let outputs = tokio::select! {
            outputs = join_all(passes) => outputs,
            _ = cancelled(run.cancel.clone()) => return Err(SchedulerError::Cancelled(number)),
        };
        if let Some(failure) = router.take_failure() {
            return Err(failure.into());
        }

        let mut optimistic: Vec<Option<ExecutedTransaction>> = vec![None; tx_count];
        for (shard_id, output) in outputs {
            for executed in output? {
                Self::place_result(run.plan, shard_id, &mut optimistic, executed)?;
            }
        }
        debug!(number, txs = tx_count, calls = router.requests(), "[sl-04] optimistic pass complete");
        drop(router);

        let mut prefix = FinalizedPrefix::new();
        let mut results = Vec::with_capacity(tx_count);
        for (index, slot) in optimistic.into_iter().enumerate() {
            run.check_cancelled()?;
            let executed = slot.ok_or_else(|| {
                SchedulerError::Executor(ExecutorError::InvalidBatch(format!(
                    "no result for transaction {index}"
                )))
            })?;
            let accepted = match prefix.validate_reads(&executed.footprint) {
                Ok(()) => executed,
                Err(stale) => self.reexecute(run, &prefix, executed, stale).await?,
            };
            let version = Version {
                tx_index: accepted.tx_index,
                incarnation: accepted.incarnation,
            };
            if accepted.receipt.status.is_success() {
                prefix.apply(version, &accepted.footprint);
            } else {
                prefix.skip();
            }
            results.push(accepted);
        }
        Ok(Executed { results, prefix })
    }

    fn router<'a>(&'a self, view: &'a dyn StateView, run: &BlockRun<'a>) -> SchedulerRouter<'a> {
        SchedulerRouter::new(
            view,
            &self.shards,
            run.resolver,
            self.config.max_call_depth,
            self.config.cross_shard_timeout(),
            run.cancel.clone(),
        )
    }

    /// Check a shard's result against the plan and slot it in.
    fn place_result(
        plan: &ExecutionPlan,
        shard_id: ShardId,
        slots: &mut [Option<ExecutedTransaction>],
        executed: ExecutedTransaction,
    ) -> Result<(), SchedulerError> {
        let tx_index = executed.tx_index;
        let planned = plan.assignment(tx_index).map(|a| a.shard);
        let slot = slots.get_mut(tx_index as usize);
        match (planned, slot) {
            (Some(planned), Some(slot)) if planned == shard_id && slot.is_none() => {
                *slot = Some(executed);
                Ok(())
            }
            _ => Err(SchedulerError::Executor(ExecutorError::InvalidBatch(format!(
                "shard {shard_id} reported unexpected result for transaction {tx_index}"
            )))),
        }
    }

    /// Re-run a stale transaction serially against the finalized prefix.
    async fn reexecute(
        &self,
        run: &BlockRun<'_>,
        prefix: &FinalizedPrefix,
        stale: ExecutedTransaction,
        mut reason: StaleRead,
    ) -> Result<ExecutedTransaction, SchedulerError> {
        let number = run.number();
        let tx_index = stale.tx_index;
        let mut incarnation = stale.incarnation;

        for _ in 0..self.config.max_reexecutions {
            run.check_cancelled()?;
            self.transition(BlockState::Executing)?;
            incarnation += 1;
            TX_REEXECUTIONS.inc();
            log_tx_event!(
                debug,
                "sl-04",
                "[sl-04] re-executing after stale read",
                number,
                tx_index,
                incarnation,
                observed = ?reason.observed,
                expected = ?reason.expected
            );

            let item = run
                .plan
                .item(&run.block.transactions, tx_index, incarnation)
                .ok_or_else(|| {
                    SchedulerError::Executor(ExecutorError::InvalidBatch(format!(
                        "transaction {tx_index} is not planned"
                    )))
                })?;
            let shard = Arc::clone(&self.shards[item.target_shard as usize]);
            let batch = ShardBatch {
                block_number: number,
                mode: ExecutionMode::Serial,
                items: vec![item],
            };

            let view = FinalizedView::new(&run.base, prefix);
            let router = self.router(&view, run);
            let output = tokio::select! {
                output = shard.execute_batch(batch, &view, &router) => output,
                _ = cancelled(run.cancel.clone()) => return Err(SchedulerError::Cancelled(number)),
            };
            if let Some(failure) = router.take_failure() {
                return Err(failure.into());
            }
            let mut output = output?;
            if output.len() != 1 || output[0].tx_index != tx_index || output[0].incarnation != incarnation {
                return Err(SchedulerError::Executor(ExecutorError::InvalidBatch(format!(
                    "serial re-execution of transaction {tx_index} returned {} results",
                    output.len()
                ))));
            }
            let Some(executed) = output.pop() else {
                continue;
            };

            match prefix.validate_reads(&executed.footprint) {
                Ok(()) => return Ok(executed),
                Err(stale) => reason = stale,
            }
        }

        TX_CONFLICTS_UNRESOLVED.inc();
        log_tx_event!(
            warn,
            "sl-04",
            "[sl-04] conflict unresolved, transaction failed",
            number,
            tx_index,
            incarnation
        );
        Ok(ExecutedTransaction {
            tx_index,
            incarnation,
            receipt: TransactionReceipt::failure(
                TransactionStatus::ExecutionConflictUnresolved,
                0,
                number,
            ),
            footprint: Footprint::default(),
        })
    }

    /// Contracts deployed by successful creations, with their owning shard.
    fn created_contracts(
        plan: &ExecutionPlan,
        results: &[ExecutedTransaction],
    ) -> BTreeMap<Address, ShardId> {
        results
            .iter()
            .filter_map(|executed| {
                let contract = executed.receipt.contract_address?;
                let shard = plan
                    .created
                    .get(&contract)
                    .copied()
                    .or_else(|| plan.assignment(executed.tx_index).map(|a| a.shard))?;
                Some((contract, shard))
            })
            .collect()
    }

    /// Attach receipts and fill in the header's roots and gas.
    fn aggregate(
        block: &mut Block,
        results: Vec<ExecutedTransaction>,
        state_root: shared_types::Hash,
    ) -> Result<(), SchedulerError> {
        let number = block.number();
        let mut gas_used = U256::zero();
        block.receipts = results
            .into_iter()
            .map(|executed| {
                let mut receipt = executed.receipt;
                receipt.block_number = number;
                gas_used = gas_used.saturating_add(U256::from(receipt.gas_used));
                receipt
            })
            .collect();

        let txs_root = block.compute_txs_root();
        let receipts_root = block.compute_receipts_root();
        let invalid = |e: ProtocolError| SchedulerError::from(PlanningError::InvalidBlock(e.to_string()));
        let header = &mut block.header;
        header.set_txs_root(txs_root).map_err(invalid)?;
        header.set_receipts_root(receipts_root).map_err(invalid)?;
        header.set_state_root(state_root).map_err(invalid)?;
        header.set_gas_used(gas_used).map_err(invalid)?;

        debug!(
            number,
            gas_used = %gas_used,
            state_root = %hex::encode(state_root),
            "[sl-04] block aggregated"
        );
        Ok(())
    }

    /// Write everything in one scope, commit it and advance the ledger.
    #[instrument(skip_all, fields(number = block.number()))]
    async fn commit(
        &self,
        block: Block,
        prefix: &FinalizedPrefix,
        created: &BTreeMap<Address, ShardId>,
    ) -> Result<FinalizedBlock, SchedulerError> {
        let scope = self.storage.begin_scope().await?;
        let staged = match self.stage(scope, block, prefix, created).await {
            Ok(staged) => staged,
            Err(e) => {
                if let Err(rollback) = self.ledger.abandon(scope).await {
                    warn!(scope, error = %rollback, "[sl-04] rollback failed");
                }
                return Err(e);
            }
        };

        let finalized = self
            .ledger
            .commit_staged(staged)
            .await
            .map_err(|e| SchedulerError::CommitFailed(e.to_string()))?;
        if let Err(e) = self.ledger.append(finalized.clone()) {
            error!(
                number = finalized.number(),
                error = %e,
                "[sl-04] committed block rejected by the ledger"
            );
            return Err(SchedulerError::CommittedNotAppended {
                number: finalized.number(),
                reason: e.to_string(),
            });
        }
        Ok(finalized)
    }

    async fn stage(
        &self,
        scope: ScopeId,
        block: Block,
        prefix: &FinalizedPrefix,
        created: &BTreeMap<Address, ShardId>,
    ) -> Result<StagedBlock, SchedulerError> {
        for (key, value) in prefix.writes() {
            self.storage
                .put(scope, tables::S_STATE, &key.storage_key(), value.clone())
                .await?;
        }
        for (contract, shard) in created {
            self.storage
                .put(
                    scope,
                    tables::S_CONTRACT_SHARD,
                    contract,
                    tables::shard_value(*shard).to_vec(),
                )
                .await?;
        }
        debug!(
            scope,
            writes = prefix.write_count(),
            contracts = created.len(),
            "[sl-04] state staged"
        );
        Ok(self.ledger.stage_block(scope, block).await?)
    }
}

#[async_trait]
impl<S: TransactionalStorage + 'static> BlockExecutionApi for Scheduler<S> {
    async fn execute_block(&self, block: Block) -> Result<FinalizedBlock, SchedulerError> {
        Scheduler::execute_block(self, block).await
    }

    fn cancel(&self, number: u64) -> Result<(), SchedulerError> {
        Scheduler::cancel(self, number)
    }

    fn state_of(&self, number: u64) -> Option<BlockState> {
        Scheduler::state_of(self, number)
    }
}
