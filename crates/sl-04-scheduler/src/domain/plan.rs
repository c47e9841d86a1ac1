//! Execution plan: which shard runs which transaction.

use shared_types::{Address, Transaction};
use sl_03_executor::{BatchItem, ExecutionMode, ShardBatch, ShardId};
use std::collections::BTreeMap;

/// Placement of one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxAssignment {
    /// Position in the block.
    pub tx_index: u32,
    /// Executing shard.
    pub shard: ShardId,
    /// Effective gas limit.
    pub gas_limit: u64,
}

/// Deterministic placement of a block's transactions.
///
/// Two nodes planning the same block against the same chain state produce
/// equal plans.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecutionPlan {
    /// Block being planned.
    pub block_number: u64,
    /// One entry per transaction, in block order.
    pub assignments: Vec<TxAssignment>,
    /// Contracts created by this block and the shard that owns them.
    pub created: BTreeMap<Address, ShardId>,
}

impl ExecutionPlan {
    /// Assignment of `tx_index`.
    pub fn assignment(&self, tx_index: u32) -> Option<&TxAssignment> {
        self.assignments.get(tx_index as usize)
    }

    /// Batch item for `tx_index` at `incarnation`.
    pub fn item(&self, transactions: &[Transaction], tx_index: u32, incarnation: u32) -> Option<BatchItem> {
        let assignment = self.assignment(tx_index)?;
        let transaction = transactions.get(tx_index as usize)?.clone();
        Some(BatchItem {
            tx_index,
            incarnation,
            transaction,
            target_shard: assignment.shard,
            gas_limit: assignment.gas_limit,
        })
    }

    /// First-pass batches, one per shard with work, items in block order.
    pub fn optimistic_batches(&self, transactions: &[Transaction]) -> BTreeMap<ShardId, ShardBatch> {
        let mut batches: BTreeMap<ShardId, ShardBatch> = BTreeMap::new();
        for assignment in &self.assignments {
            let Some(item) = self.item(transactions, assignment.tx_index, 0) else {
                continue;
            };
            batches
                .entry(assignment.shard)
                .or_insert_with(|| ShardBatch {
                    block_number: self.block_number,
                    mode: ExecutionMode::Optimistic,
                    items: Vec::new(),
                })
                .items
                .push(item);
        }
        batches
    }

    /// Number of transactions.
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// True for an empty block.
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}
