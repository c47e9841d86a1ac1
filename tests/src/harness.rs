//! Test node assembly.
//!
//! Every shard is wrapped in a [`FaultyShard`] so scenarios can inject
//! outages and delays.

use anyhow::{ensure, Context, Result};
use shared_crypto::{load_node_crypto, CryptoSuite};
use shared_types::{Address, Block, Hash, Transaction};
use sl_01_storage::{tables, MemoryStorage, TransactionalStorage};
use sl_02_ledger::{FinalizedBlock, GenesisConfig, Ledger};
use sl_03_executor::{decode_counter, encode_ops, ExecutorShard, FaultyShard, KvShard, Op, ShardId, StateKey};
use sl_04_scheduler::{NodeConfig, Scheduler, SchedulerConfig, SchedulerError};
use std::sync::Arc;

/// Sender of every test transaction.
pub const USER: Address = [0x11; 20];

/// Gas limit of every test transaction.
pub const TX_GAS: u64 = 1_000_000;

/// Chain gas limit used by [`node_config`].
pub const CHAIN_GAS: u64 = 300_000_000;

/// Config for group `"1"` with `shard_count` shards and fast retries.
pub fn node_config(shard_count: u16) -> NodeConfig {
    NodeConfig {
        genesis: GenesisConfig::for_testing("1", CHAIN_GAS),
        scheduler: SchedulerConfig::for_testing(shard_count),
        ..NodeConfig::default()
    }
}

/// A complete in-memory node.
pub struct TestNode {
    /// Suite selected from the config.
    pub suite: Arc<CryptoSuite>,
    /// Backing storage.
    pub storage: Arc<MemoryStorage>,
    /// Ledger over `storage`.
    pub ledger: Arc<Ledger<MemoryStorage>>,
    /// Scheduler driving `shards`.
    pub scheduler: Arc<Scheduler<MemoryStorage>>,
    /// Shards, indexed by id.
    pub shards: Vec<Arc<FaultyShard<KvShard>>>,
}

impl TestNode {
    /// Fresh node with genesis built.
    pub async fn start(config: &NodeConfig) -> Result<Self> {
        Self::start_with(config, &[]).await
    }

    /// Fresh node whose storage already records `owners` as contract
    /// affinities.
    pub async fn start_with(config: &NodeConfig, owners: &[(Address, ShardId)]) -> Result<Self> {
        let storage = Arc::new(MemoryStorage::new());
        if !owners.is_empty() {
            let scope = storage.begin_scope().await?;
            for (contract, shard) in owners {
                storage
                    .put(scope, tables::S_CONTRACT_SHARD, contract, tables::shard_value(*shard).to_vec())
                    .await?;
            }
            storage.commit(scope).await?;
        }
        Self::open(config, storage).await
    }

    /// Node over existing `storage`, as after a restart.
    pub async fn open(config: &NodeConfig, storage: Arc<MemoryStorage>) -> Result<Self> {
        config.validate()?;
        let crypto = load_node_crypto(&config.crypto).context("crypto suite")?;
        let suite = crypto.suite;

        let ledger = Arc::new(Ledger::open(Arc::clone(&storage), Arc::clone(&suite)).await?);
        ledger.build_genesis(&config.genesis).await?;

        let shards: Vec<Arc<FaultyShard<KvShard>>> = (0..config.scheduler.shard_count)
            .map(|id| Arc::new(FaultyShard::new(KvShard::new(id, Arc::clone(&suite)))))
            .collect();
        let executors: Vec<Arc<dyn ExecutorShard>> = shards
            .iter()
            .map(|shard| Arc::clone(shard) as Arc<dyn ExecutorShard>)
            .collect();
        let scheduler = Scheduler::new(
            config.scheduler.clone(),
            Arc::clone(&suite),
            Arc::clone(&ledger),
            Arc::clone(&storage),
            executors,
        )?;

        Ok(Self {
            suite,
            storage,
            ledger,
            scheduler: Arc::new(scheduler),
            shards,
        })
    }

    /// Unexecuted successor of the chain tip.
    pub fn next_block(&self, transactions: Vec<Transaction>) -> Result<Block> {
        let number = self.ledger.latest_block_number()? + 1;
        self.block(number, transactions)
    }

    /// Unexecuted block `number` with an empty parent link.
    pub fn block(&self, number: u64, transactions: Vec<Transaction>) -> Result<Block> {
        let factory = self.ledger.factory();
        let mut header = factory.create_header();
        header.set_number(number)?;
        Ok(factory.create_block(header, transactions))
    }

    /// Execute the successor of the chain tip.
    pub async fn execute(&self, transactions: Vec<Transaction>) -> Result<FinalizedBlock, SchedulerError> {
        let number = self.ledger.latest_block_number()? + 1;
        let block = self
            .block(number, transactions)
            .map_err(|e| SchedulerError::Config(e.to_string()))?;
        self.scheduler.execute_block(block).await
    }

    /// Committed value of a counter slot.
    pub fn counter(&self, contract: Address, key: &[u8]) -> Option<u64> {
        self.value(contract, key).as_deref().and_then(decode_counter)
    }

    /// Committed raw value of a slot.
    pub fn value(&self, contract: Address, key: &[u8]) -> Option<Vec<u8>> {
        self.storage
            .snapshot()
            .get(tables::S_STATE, &StateKey::new(contract, key.to_vec()).storage_key())
            .map(<[u8]>::to_vec)
    }

    /// State root recomputed from committed storage.
    pub fn committed_state_root(&self) -> Hash {
        let snapshot = self.storage.snapshot();
        let state: Vec<(&[u8], &[u8])> = snapshot.scan(tables::S_STATE).collect();
        shared_types::state_root(&self.suite, state.into_iter())
    }

    /// Check the ledger tip is `number` and its header's state root matches
    /// committed storage.
    pub fn assert_consistent(&self, number: u64) -> Result<()> {
        ensure!(self.ledger.latest_block_number()? == number, "tip is not {number}");
        let header = self.ledger.block_at(number)?.header;
        ensure!(
            header.state_root() == self.committed_state_root(),
            "state root of block {number} does not match storage"
        );
        Ok(())
    }
}

/// Call `to` with `ops`.
pub fn call_tx(to: Address, ops: &[Op], nonce: u64) -> Transaction {
    Transaction {
        version: 0,
        sender: USER.to_vec(),
        to: Some(to),
        nonce,
        gas_limit: TX_GAS,
        input: encode_ops(ops).unwrap_or_default(),
        signature: vec![],
        import_time: 0,
    }
}

/// Create a contract running `ops` in its own context.
pub fn create_tx(ops: &[Op], nonce: u64) -> Transaction {
    Transaction {
        to: None,
        ..call_tx([0; 20], ops, nonce)
    }
}

/// `Add` op.
pub fn add(key: &[u8], amount: u64) -> Op {
    Op::Add {
        key: key.to_vec(),
        amount,
    }
}

/// `Set` op.
pub fn set(key: &[u8], value: Vec<u8>) -> Op {
    Op::Set {
        key: key.to_vec(),
        value,
    }
}

/// `Call` op that fails the caller when the callee fails.
pub fn call(contract: Address, ops: Vec<Op>) -> Op {
    Op::Call {
        contract,
        ops,
        allow_failure: false,
    }
}
