//! Execution entities: state keys, versions, footprints and batches.

use serde::{Deserialize, Serialize};
use shared_types::{Address, Transaction, TransactionReceipt};
use std::collections::BTreeMap;

/// Shard identifier. Shards are numbered `0..shard_count`.
pub type ShardId = u16;

/// One contract storage slot.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StateKey {
    /// Owning contract.
    pub contract: Address,
    /// Slot key.
    pub key: Vec<u8>,
}

impl StateKey {
    /// Slot `key` of `contract`.
    pub fn new(contract: Address, key: impl Into<Vec<u8>>) -> Self {
        Self {
            contract,
            key: key.into(),
        }
    }

    /// Key in the `s_state` table.
    pub fn storage_key(&self) -> Vec<u8> {
        sl_01_storage::tables::state_key(&self.contract, &self.key)
    }
}

/// Identifies the execution that wrote a value.
///
/// Every re-execution of a transaction bumps its incarnation, so a reader
/// that saw an older incarnation's write is detectably stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    /// Writer's position in the block.
    pub tx_index: u32,
    /// Writer's execution attempt, starting at 0.
    pub incarnation: u32,
}

/// What a transaction read and wrote.
///
/// A read records the version it observed; `None` is the pre-block state.
/// Reads of the transaction's own writes are not recorded.
///
/// The value seen on first read is kept too, and every later read of that
/// key returns it. A transaction therefore never mixes two versions of one
/// key, and validating the recorded version covers every read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Footprint {
    /// Keys read, with the version observed on first read.
    pub reads: BTreeMap<StateKey, Option<Version>>,
    /// Value observed on first read, `None` for an absent slot.
    pub observed: BTreeMap<StateKey, Option<Vec<u8>>>,
    /// Final value of every key written.
    pub writes: BTreeMap<StateKey, Vec<u8>>,
}

impl Footprint {
    /// Record a read. Later reads of the same key keep the first version
    /// and value.
    pub fn record_read(&mut self, key: &StateKey, version: Option<Version>, value: Option<&[u8]>) {
        if !self.reads.contains_key(key) {
            self.reads.insert(key.clone(), version);
            self.observed.insert(key.clone(), value.map(<[u8]>::to_vec));
        }
    }

    /// Value returned by the first read of `key`, if it was read.
    pub fn first_read(&self, key: &StateKey) -> Option<Option<&[u8]>> {
        self.observed.get(key).map(Option::as_deref)
    }

    /// Declared read set.
    pub fn read_set(&self) -> impl Iterator<Item = &StateKey> {
        self.reads.keys()
    }

    /// Declared write set.
    pub fn write_set(&self) -> impl Iterator<Item = &StateKey> {
        self.writes.keys()
    }
}

/// How reads are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionMode {
    /// Parallel first pass: reads see writes of earlier transactions in the
    /// same shard, then the pre-block state.
    Optimistic,
    /// Re-execution: reads see only the supplied view.
    Serial,
}

/// One transaction assigned to a shard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItem {
    /// Position in the block.
    pub tx_index: u32,
    /// Execution attempt.
    pub incarnation: u32,
    /// The transaction.
    pub transaction: Transaction,
    /// Shard the transaction was planned on.
    pub target_shard: ShardId,
    /// Effective gas limit (transaction limit capped by the chain limit).
    pub gas_limit: u64,
}

/// Ordered work for one shard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardBatch {
    /// Block being executed.
    pub block_number: u64,
    /// Read resolution mode.
    pub mode: ExecutionMode,
    /// Items in their assigned order.
    pub items: Vec<BatchItem>,
}

/// Result of one transaction.
///
/// Read set is `footprint.reads`, write set is `footprint.writes`. Outbound
/// calls were already resolved through the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutedTransaction {
    /// Position in the block.
    pub tx_index: u32,
    /// Execution attempt that produced this result.
    pub incarnation: u32,
    /// Outcome.
    pub receipt: TransactionReceipt,
    /// Declared footprint. Writes are empty unless the receipt is a success.
    pub footprint: Footprint,
}
