//! # Block Planning
//!
//! Deterministic placement of transactions on shards.
//!
//! A contract's owner is resolved in this order:
//!
//! 1. created earlier in the same block: the shard its creation was planned on
//! 2. recorded affinity in `s_contract_shard`, if that shard still exists
//! 3. rendezvous hashing of the address over the shard set
//!
//! Creations have no affinity yet and are dealt round-robin in block order.
//! Every input is chain state or block content, so all nodes agree.

use crate::domain::errors::PlanningError;
use crate::domain::plan::{ExecutionPlan, TxAssignment};
use shared_crypto::CryptoSuite;
use shared_types::{Address, Block};
use sl_01_storage::{tables, StorageSnapshot};
use sl_03_executor::{create_address, ShardId};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Rendezvous (highest random weight) assignment of `address` to one of
/// `shards`.
///
/// Adding a shard moves only the addresses that now rank it highest.
pub fn rendezvous_assign(suite: &CryptoSuite, address: &Address, shards: &[ShardId]) -> ShardId {
    if shards.is_empty() {
        return 0;
    }

    if shards.len() == 1 {
        return shards[0];
    }

    let mut input = [0u8; 22];
    input[..20].copy_from_slice(address);

    let mut best_shard = shards[0];
    let mut best_hash = [0u8; 32];

    for shard in shards {
        input[20..22].copy_from_slice(&shard.to_be_bytes());
        let weight = suite.hash(&input);

        if weight > best_hash {
            best_hash = weight;
            best_shard = *shard;
        }
    }

    best_shard
}

/// Resolves contract owners for one block.
#[derive(Debug, Clone)]
pub struct ShardResolver {
    suite: Arc<CryptoSuite>,
    snapshot: StorageSnapshot,
    created: BTreeMap<Address, ShardId>,
    shards: Vec<ShardId>,
}

impl ShardResolver {
    /// Resolver over the pre-block `snapshot` with `shard_count` shards.
    pub fn new(suite: Arc<CryptoSuite>, snapshot: StorageSnapshot, shard_count: u16) -> Self {
        Self {
            suite,
            snapshot,
            created: BTreeMap::new(),
            shards: (0..shard_count.max(1)).collect(),
        }
    }

    /// Shard ids.
    pub fn shards(&self) -> &[ShardId] {
        &self.shards
    }

    /// Owner of `contract`.
    pub fn owner_of(&self, contract: &Address) -> ShardId {
        if let Some(shard) = self.created.get(contract) {
            return *shard;
        }
        let recorded = self
            .snapshot
            .get(tables::S_CONTRACT_SHARD, contract)
            .and_then(tables::decode_shard)
            .filter(|shard| (*shard as usize) < self.shards.len());
        match recorded {
            Some(shard) => shard,
            None => rendezvous_assign(&self.suite, contract, &self.shards),
        }
    }

    fn record_creation(&mut self, contract: Address, shard: ShardId) -> ShardId {
        *self.created.entry(contract).or_insert(shard)
    }

    /// Contracts created so far.
    pub fn created(&self) -> &BTreeMap<Address, ShardId> {
        &self.created
    }
}

/// Place every transaction of `block`.
///
/// Fails without side effects if a sender is not a 20-byte address.
pub fn plan_block(
    block: &Block,
    resolver: &mut ShardResolver,
    tx_gas_limit: u64,
) -> Result<ExecutionPlan, PlanningError> {
    let shard_count = resolver.shards().len();
    let mut assignments = Vec::with_capacity(block.transactions.len());
    let mut creations = 0usize;

    for (index, tx) in block.transactions.iter().enumerate() {
        let tx_index = u32::try_from(index)
            .map_err(|_| PlanningError::TooManyTransactions(block.transactions.len()))?;
        let sender = tx
            .sender_address()
            .ok_or(PlanningError::UnknownSenderFormat {
                tx_index,
                len: tx.sender.len(),
            })?;

        let shard = match tx.to {
            Some(to) => resolver.owner_of(&to),
            None => {
                let contract = create_address(&resolver.suite, &sender, tx.nonce);
                let shard = (creations % shard_count) as ShardId;
                creations += 1;
                resolver.record_creation(contract, shard)
            }
        };

        assignments.push(TxAssignment {
            tx_index,
            shard,
            gas_limit: tx.gas_limit.min(tx_gas_limit),
        });
    }

    debug!(
        block_number = block.number(),
        txs = assignments.len(),
        creations,
        "[sl-04] block planned"
    );
    Ok(ExecutionPlan {
        block_number: block.number(),
        assignments,
        created: resolver.created().clone(),
    })
}
