//! # Block Header
//!
//! `hash(header) == suite.hash(encode(hash fields))`, where the hash fields
//! are every header field except `signature_list` (sealers sign the hash).
//!
//! The hash is a memoized derived value: an explicit `dirty` flag plus the
//! cached digest. Every setter marks the cache dirty; `hash()` recomputes
//! lazily. Once the signature list is non-empty the header is sealed and
//! every setter fails with [`ProtocolError::ImmutableHeader`].

use crate::codec::{self, CanonicalHasher};
use crate::entities::{Hash, ParentInfo, SealerSignature, U256};
use crate::errors::ProtocolError;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use shared_crypto::{CryptoSuite, KeyPair, ZERO_HASH};
use std::sync::Arc;

/// Plain header field set; this is what goes on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HeaderData {
    /// Header format version.
    pub version: u32,
    /// Parent links (one entry on a linear chain).
    pub parent_info: Vec<ParentInfo>,
    /// Block number.
    pub number: u64,
    /// Proposal time in milliseconds.
    pub timestamp: u64,
    /// Index of the sealer that proposed the block.
    pub sealer: u64,
    /// Public keys of the sealer set.
    pub sealer_list: Vec<Vec<u8>>,
    /// Merkle root of transaction hashes.
    pub txs_root: Hash,
    /// Merkle root of receipt hashes.
    pub receipts_root: Hash,
    /// Hash of the post-block state.
    pub state_root: Hash,
    /// Total gas used by the block.
    #[serde(with = "codec::u256_be")]
    pub gas_used: U256,
    /// Opaque extra data.
    pub extra_data: Vec<u8>,
    /// Voting weight per sealer.
    pub consensus_weights: Vec<u64>,
    /// Sealer signatures over the header hash.
    pub signature_list: Vec<SealerSignature>,
}

#[derive(Debug, Clone, Copy)]
struct HashCache {
    dirty: bool,
    value: Hash,
}

/// A block header bound to the node's crypto suite.
pub struct BlockHeader {
    data: HeaderData,
    suite: Arc<CryptoSuite>,
    cache: Mutex<HashCache>,
}

macro_rules! setter {
    ($(#[$doc:meta])* $name:ident, $field:ident: $ty:ty) => {
        $(#[$doc])*
        pub fn $name(&mut self, value: $ty) -> Result<(), ProtocolError> {
            self.ensure_mutable()?;
            self.data.$field = value;
            self.mark_dirty();
            Ok(())
        }
    };
}

impl BlockHeader {
    /// Empty header.
    pub fn new(suite: Arc<CryptoSuite>) -> Self {
        Self::from_data(suite, HeaderData::default())
    }

    /// Wrap decoded or pre-built header data.
    pub fn from_data(suite: Arc<CryptoSuite>, data: HeaderData) -> Self {
        Self {
            data,
            suite,
            cache: Mutex::new(HashCache {
                dirty: true,
                value: ZERO_HASH,
            }),
        }
    }

    /// Field view.
    pub fn data(&self) -> &HeaderData {
        &self.data
    }

    /// Unwrap into the field set.
    pub fn into_data(self) -> HeaderData {
        self.data
    }

    /// Suite this header hashes with.
    pub fn suite(&self) -> &Arc<CryptoSuite> {
        &self.suite
    }

    /// Header hash; recomputed only after a setter ran.
    pub fn hash(&self) -> Hash {
        let mut cache = self.cache.lock();
        if cache.dirty {
            cache.value = self.compute_hash();
            cache.dirty = false;
        }
        cache.value
    }

    fn compute_hash(&self) -> Hash {
        let d = &self.data;
        let mut h = CanonicalHasher::new(self.suite.hash_algorithm());
        h.u32(d.version).seq_len(d.parent_info.len());
        for parent in &d.parent_info {
            h.u64(parent.block_number).fixed(&parent.block_hash);
        }
        h.u64(d.number)
            .u64(d.timestamp)
            .u64(d.sealer)
            .seq_len(d.sealer_list.len());
        for sealer in &d.sealer_list {
            h.bytes(sealer);
        }
        let mut gas = [0u8; 32];
        d.gas_used.to_big_endian(&mut gas);
        h.fixed(&d.txs_root)
            .fixed(&d.receipts_root)
            .fixed(&d.state_root)
            .fixed(&gas)
            .bytes(&d.extra_data)
            .seq_len(d.consensus_weights.len());
        for weight in &d.consensus_weights {
            h.u64(*weight);
        }
        h.finalize()
    }

    /// True once the signature list is non-empty.
    pub fn is_sealed(&self) -> bool {
        !self.data.signature_list.is_empty()
    }

    fn ensure_mutable(&self) -> Result<(), ProtocolError> {
        if self.is_sealed() {
            return Err(ProtocolError::ImmutableHeader);
        }
        Ok(())
    }

    fn mark_dirty(&mut self) {
        self.cache.get_mut().dirty = true;
    }

    // Accessors

    /// Header version.
    pub fn version(&self) -> u32 {
        self.data.version
    }

    /// Parent links.
    pub fn parent_info(&self) -> &[ParentInfo] {
        &self.data.parent_info
    }

    /// Block number.
    pub fn number(&self) -> u64 {
        self.data.number
    }

    /// Timestamp.
    pub fn timestamp(&self) -> u64 {
        self.data.timestamp
    }

    /// Proposing sealer index.
    pub fn sealer(&self) -> u64 {
        self.data.sealer
    }

    /// Sealer public keys.
    pub fn sealer_list(&self) -> &[Vec<u8>] {
        &self.data.sealer_list
    }

    /// Transactions root.
    pub fn txs_root(&self) -> Hash {
        self.data.txs_root
    }

    /// Receipts root.
    pub fn receipts_root(&self) -> Hash {
        self.data.receipts_root
    }

    /// State root.
    pub fn state_root(&self) -> Hash {
        self.data.state_root
    }

    /// Gas used.
    pub fn gas_used(&self) -> U256 {
        self.data.gas_used
    }

    /// Extra data.
    pub fn extra_data(&self) -> &[u8] {
        &self.data.extra_data
    }

    /// Consensus weights.
    pub fn consensus_weights(&self) -> &[u64] {
        &self.data.consensus_weights
    }

    /// Sealer signatures.
    pub fn signature_list(&self) -> &[SealerSignature] {
        &self.data.signature_list
    }

    // Setters

    setter!(
        /// Set the header version.
        set_version, version: u32
    );
    setter!(
        /// Set the parent links.
        set_parent_info, parent_info: Vec<ParentInfo>
    );
    setter!(
        /// Set the block number.
        set_number, number: u64
    );
    setter!(
        /// Set the timestamp.
        set_timestamp, timestamp: u64
    );
    setter!(
        /// Set the proposing sealer.
        set_sealer, sealer: u64
    );
    setter!(
        /// Set the sealer list.
        set_sealer_list, sealer_list: Vec<Vec<u8>>
    );
    setter!(
        /// Set the transactions root.
        set_txs_root, txs_root: Hash
    );
    setter!(
        /// Set the receipts root.
        set_receipts_root, receipts_root: Hash
    );
    setter!(
        /// Set the state root.
        set_state_root, state_root: Hash
    );
    setter!(
        /// Set gas used.
        set_gas_used, gas_used: U256
    );
    setter!(
        /// Set extra data.
        set_extra_data, extra_data: Vec<u8>
    );
    setter!(
        /// Set consensus weights.
        set_consensus_weights, consensus_weights: Vec<u64>
    );
    setter!(
        /// Replace the signature list. A non-empty list seals the header.
        set_signature_list, signature_list: Vec<SealerSignature>
    );

    /// Attach the sealer signatures. Allowed once.
    pub fn seal(&mut self, signatures: Vec<SealerSignature>) -> Result<(), ProtocolError> {
        if signatures.is_empty() {
            return Err(ProtocolError::EmptySignatureList);
        }
        self.set_signature_list(signatures)
    }

    /// Link this header to `parent` as the next block.
    pub fn populate_from_parent(&mut self, parent: &BlockHeader) -> Result<(), ProtocolError> {
        self.set_number(parent.number() + 1)?;
        self.set_parent_info(vec![ParentInfo {
            block_number: parent.number(),
            block_hash: parent.hash(),
        }])
    }

    /// Turn this header into the header of an empty block.
    pub fn populate_empty_block(&mut self, timestamp: u64) -> Result<(), ProtocolError> {
        let empty_root = crate::merkle::merkle_root(&self.suite, &[]);
        self.set_timestamp(timestamp)?;
        self.set_txs_root(empty_root)?;
        self.set_receipts_root(empty_root)?;
        self.set_gas_used(U256::zero())
    }

    /// Sign this header's hash as sealer `sealer_index`.
    pub fn sign(
        &self,
        key_pair: &KeyPair,
        sealer_index: u64,
    ) -> Result<SealerSignature, ProtocolError> {
        let signature = self.suite.sign(key_pair, &self.hash())?;
        Ok(SealerSignature {
            sealer_index,
            signature,
        })
    }

    /// Check every signature against the sealer it names.
    pub fn verify_signature_list(&self) -> Result<(), ProtocolError> {
        let hash = self.hash();
        let sealers = &self.data.sealer_list;
        for entry in &self.data.signature_list {
            let public_key = usize::try_from(entry.sealer_index)
                .ok()
                .and_then(|i| sealers.get(i))
                .ok_or(ProtocolError::SealerIndexOutOfRange {
                    index: entry.sealer_index,
                    sealers: sealers.len(),
                })?;
            if !self.suite.verify(public_key, &hash, &entry.signature) {
                return Err(ProtocolError::InvalidSealerSignature {
                    index: entry.sealer_index,
                });
            }
        }
        Ok(())
    }
}

impl Clone for BlockHeader {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            suite: Arc::clone(&self.suite),
            cache: Mutex::new(*self.cache.lock()),
        }
    }
}

impl PartialEq for BlockHeader {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl Eq for BlockHeader {}

impl std::fmt::Debug for BlockHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockHeader")
            .field("number", &self.data.number)
            .field("hash", &hex::encode(self.hash()))
            .field("data", &self.data)
            .finish()
    }
}
