//! # Ledger Service
//!
//! Durable chain metadata on top of [`TransactionalStorage`]:
//!
//! 1. Builds the genesis block exactly once per chain
//! 2. Stages block index entries into a caller-owned storage scope
//! 3. Tracks the chain tip, advanced only by [`Ledger::append`]
//!
//! Reads go through storage snapshots and never block writers.

use crate::config::{GenesisConfig, LedgerConfig};
use crate::domain::errors::LedgerError;
use crate::domain::finalized::{FinalizedBlock, StagedBlock};
use parking_lot::RwLock;
use shared_crypto::CryptoSuite;
use shared_types::{codec, state_root, Address, Block, BlockFactory, Hash};
use sl_01_storage::tables::{self, *};
use sl_01_storage::{ScopeId, StorageSnapshot, TransactionalStorage};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ChainTip {
    number: u64,
    hash: Hash,
}

/// The ledger.
pub struct Ledger<S: TransactionalStorage> {
    storage: Arc<S>,
    factory: BlockFactory,
    tip: RwLock<Option<ChainTip>>,
    config: RwLock<Option<LedgerConfig>>,
    /// Serializes genesis construction.
    write_lock: tokio::sync::Mutex<()>,
}

impl<S: TransactionalStorage> Ledger<S> {
    /// Open the ledger over `storage`, loading the persisted tip if any.
    pub async fn open(storage: Arc<S>, suite: Arc<CryptoSuite>) -> Result<Self, LedgerError> {
        let ledger = Self {
            storage,
            factory: BlockFactory::new(suite),
            tip: RwLock::new(None),
            config: RwLock::new(None),
            write_lock: tokio::sync::Mutex::new(()),
        };
        ledger.reload()?;
        Ok(ledger)
    }

    /// Crypto suite blocks are decoded with.
    pub fn suite(&self) -> &Arc<CryptoSuite> {
        self.factory.suite()
    }

    /// Block factory bound to the ledger's suite.
    pub fn factory(&self) -> &BlockFactory {
        &self.factory
    }

    /// Underlying storage.
    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }

    fn reload(&self) -> Result<(), LedgerError> {
        let snapshot = self.storage.snapshot();
        let Some(raw) = snapshot.get(S_CURRENT_STATE, KEY_CURRENT_NUMBER) else {
            return Ok(());
        };
        let number = tables::decode_number(raw)
            .ok_or_else(|| LedgerError::CorruptMetadata("current number".to_string()))?;
        let hash = self.read_header(&snapshot, number)?.hash();
        let config = Self::read_config(&snapshot)?;

        shardline_telemetry::metrics::CHAIN_HEIGHT.set(number as f64);
        info!(number, hash = %hex::encode(hash), "[sl-02] ledger opened");
        *self.tip.write() = Some(ChainTip { number, hash });
        *self.config.write() = Some(LedgerConfig::from(&config));
        Ok(())
    }

    /// Build block 0 from `config`, or confirm the existing one.
    ///
    /// Idempotent for a byte-identical config; any difference against an
    /// existing chain is [`LedgerError::GenesisMismatch`].
    #[instrument(skip(self, config), fields(group_id = %config.group_id))]
    pub async fn build_genesis(&self, config: &GenesisConfig) -> Result<Block, LedgerError> {
        config.validate()?;
        let encoded = codec::encode(config)?;
        let _guard = self.write_lock.lock().await;

        let snapshot = self.storage.snapshot();
        if let Some(stored) = snapshot.get(S_CONFIG, KEY_GENESIS_CONFIG) {
            let genesis = self.read_block(&snapshot, 0)?;
            if stored == encoded.as_slice() {
                debug!("[sl-02] genesis already built with identical config");
                return Ok(genesis);
            }
            let stored_hash = hex::encode(genesis.hash());
            warn!(%stored_hash, "[sl-02] genesis config mismatch");
            return Err(LedgerError::GenesisMismatch { stored_hash });
        }

        let block = self.genesis_block(config, encoded.clone())?;
        let scope = self.storage.begin_scope().await?;
        let written = async {
            self.storage
                .put(scope, S_CONFIG, KEY_GENESIS_CONFIG, encoded)
                .await?;
            self.put_block_index(scope, &block).await
        }
        .await;
        if let Err(e) = written {
            self.discard(scope).await;
            return Err(e);
        }
        self.storage.commit(scope).await?;

        let hash = block.hash();
        *self.tip.write() = Some(ChainTip { number: 0, hash });
        *self.config.write() = Some(LedgerConfig::from(config));
        shardline_telemetry::metrics::CHAIN_HEIGHT.set(0.0);
        info!(hash = %hex::encode(hash), "[sl-02] genesis block built");
        Ok(block)
    }

    fn genesis_block(&self, config: &GenesisConfig, extra_data: Vec<u8>) -> Result<Block, LedgerError> {
        let suite = self.factory.suite();
        let mut header = self.factory.create_header();
        header.set_number(0)?;
        header.populate_empty_block(config.timestamp)?;
        header.set_sealer_list(config.sealer_list.clone())?;
        header.set_consensus_weights(config.effective_weights())?;
        header.set_extra_data(extra_data)?;
        header.set_state_root(state_root(suite, std::iter::empty::<(&[u8], &[u8])>()))?;
        Ok(self.factory.create_block(header, Vec::new()))
    }

    /// Write the index entries of `block` into `scope`.
    ///
    /// `block` must be the successor of the current tip. Nothing is visible
    /// until [`Ledger::commit_staged`].
    pub async fn stage_block(
        &self,
        scope: ScopeId,
        block: Block,
    ) -> Result<StagedBlock, LedgerError> {
        block.validate_shape()?;
        let expected = self.latest_block_number()? + 1;
        if block.number() != expected {
            return Err(LedgerError::NonSequentialBlock {
                expected,
                actual: block.number(),
            });
        }
        self.put_block_index(scope, &block).await?;
        debug!(number = block.number(), scope, "[sl-02] block staged");
        Ok(StagedBlock { scope, block })
    }

    /// Commit the scope holding `staged`.
    ///
    /// On error the scope is closed by storage and nothing is visible.
    #[instrument(skip(self, staged), fields(number = staged.block.number(), scope = staged.scope))]
    pub async fn commit_staged(&self, staged: StagedBlock) -> Result<FinalizedBlock, LedgerError> {
        self.storage.commit(staged.scope).await?;
        Ok(FinalizedBlock::new(staged.block))
    }

    /// Roll back a block scope that will not be committed, staged or not.
    pub async fn abandon(&self, scope: ScopeId) -> Result<(), LedgerError> {
        self.storage.rollback(scope).await?;
        debug!(scope, "[sl-02] block scope abandoned");
        Ok(())
    }

    /// Advance the chain tip to a committed block.
    pub fn append(&self, block: FinalizedBlock) -> Result<(), LedgerError> {
        let mut tip = self.tip.write();
        let expected = tip.map(|t| t.number + 1).ok_or(LedgerError::NotInitialized)?;
        let number = block.number();
        if number != expected {
            error!(expected, number, "[sl-02] append out of order");
            return Err(LedgerError::InvariantViolation(format!(
                "append of block {number}, expected {expected}"
            )));
        }
        let stored = self
            .storage
            .snapshot()
            .get(S_CURRENT_STATE, KEY_CURRENT_NUMBER)
            .and_then(tables::decode_number);
        if stored != Some(number) {
            error!(number, ?stored, "[sl-02] appended block is not the committed tip");
            return Err(LedgerError::InvariantViolation(format!(
                "block {number} appended but storage tip is {stored:?}"
            )));
        }

        let hash = block.hash();
        *tip = Some(ChainTip { number, hash });
        shardline_telemetry::metrics::CHAIN_HEIGHT.set(number as f64);
        info!(number, hash = %hex::encode(hash), "[sl-02] block appended");
        Ok(())
    }

    /// Number of the latest appended block.
    pub fn latest_block_number(&self) -> Result<u64, LedgerError> {
        self.tip
            .read()
            .map(|t| t.number)
            .ok_or(LedgerError::NotInitialized)
    }

    /// Hash of the latest appended block.
    pub fn latest_block_hash(&self) -> Result<Hash, LedgerError> {
        self.tip
            .read()
            .map(|t| t.hash)
            .ok_or(LedgerError::NotInitialized)
    }

    /// Chain parameters from genesis.
    pub fn ledger_config(&self) -> Result<LedgerConfig, LedgerError> {
        self.config.read().clone().ok_or(LedgerError::NotInitialized)
    }

    /// Full block by number.
    pub fn block_at(&self, number: u64) -> Result<Block, LedgerError> {
        self.read_block(&self.storage.snapshot(), number)
    }

    /// Header hash by number.
    pub fn block_hash_at(&self, number: u64) -> Result<Hash, LedgerError> {
        Ok(self.read_header(&self.storage.snapshot(), number)?.hash())
    }

    /// Number of the block with header hash `hash`.
    pub fn number_of_hash(&self, hash: &Hash) -> Result<Option<u64>, LedgerError> {
        self.storage
            .snapshot()
            .get(S_HASH_2_NUMBER, hash)
            .map(|raw| {
                tables::decode_number(raw)
                    .ok_or_else(|| LedgerError::CorruptMetadata("hash index".to_string()))
            })
            .transpose()
    }

    /// Shard a contract was assigned to, if it has been deployed.
    pub fn contract_shard(&self, contract: &Address) -> Result<Option<u16>, LedgerError> {
        self.storage
            .snapshot()
            .get(S_CONTRACT_SHARD, contract)
            .map(|raw| {
                tables::decode_shard(raw)
                    .ok_or_else(|| LedgerError::CorruptMetadata("contract shard".to_string()))
            })
            .transpose()
    }

    async fn put_block_index(&self, scope: ScopeId, block: &Block) -> Result<(), LedgerError> {
        let number = block.number();
        let key = tables::number_key(number);
        self.storage
            .put(scope, S_NUMBER_2_HEADER, &key, self.factory.encode_header(&block.header)?)
            .await?;
        self.storage
            .put(scope, S_NUMBER_2_TXS, &key, codec::encode(&block.transactions)?)
            .await?;
        self.storage
            .put(scope, S_NUMBER_2_RECEIPTS, &key, codec::encode(&block.receipts)?)
            .await?;
        self.storage
            .put(scope, S_HASH_2_NUMBER, &block.hash(), key.to_vec())
            .await?;
        self.storage
            .put(scope, S_CURRENT_STATE, KEY_CURRENT_NUMBER, key.to_vec())
            .await?;
        Ok(())
    }

    async fn discard(&self, scope: ScopeId) {
        if let Err(e) = self.storage.rollback(scope).await {
            warn!(scope, error = %e, "[sl-02] rollback failed");
        }
    }

    fn read_config(snapshot: &StorageSnapshot) -> Result<GenesisConfig, LedgerError> {
        let raw = snapshot
            .get(S_CONFIG, KEY_GENESIS_CONFIG)
            .ok_or_else(|| LedgerError::CorruptMetadata("missing genesis config".to_string()))?;
        Ok(codec::decode(raw)?)
    }

    fn read_header(
        &self,
        snapshot: &StorageSnapshot,
        number: u64,
    ) -> Result<shared_types::BlockHeader, LedgerError> {
        let raw = snapshot
            .get(S_NUMBER_2_HEADER, &tables::number_key(number))
            .ok_or(LedgerError::BlockNotFound(number))?;
        Ok(self.factory.decode_header(raw)?)
    }

    fn read_block(&self, snapshot: &StorageSnapshot, number: u64) -> Result<Block, LedgerError> {
        let header = self.read_header(snapshot, number)?;
        let key = tables::number_key(number);
        let transactions = match snapshot.get(S_NUMBER_2_TXS, &key) {
            Some(raw) => codec::decode(raw)?,
            None => return Err(LedgerError::CorruptMetadata(format!("txs of block {number}"))),
        };
        let receipts = match snapshot.get(S_NUMBER_2_RECEIPTS, &key) {
            Some(raw) => codec::decode(raw)?,
            None => {
                return Err(LedgerError::CorruptMetadata(format!(
                    "receipts of block {number}"
                )))
            }
        };
        Ok(Block {
            header,
            transactions,
            receipts,
        })
    }
}
