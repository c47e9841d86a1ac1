//! # Core Domain Entities
//!
//! Transactions, receipts and the small value types shared by every crate.
//! Blocks and headers live in [`crate::block`] and [`crate::header`].

use crate::codec::CanonicalHasher;
use serde::{Deserialize, Serialize};
use shared_crypto::CryptoSuite;

// Re-export U256 from primitive-types for use across all crates
pub use primitive_types::U256;

/// A 32-byte content hash (Keccak-256 or SM3, depending on the suite).
pub type Hash = [u8; 32];

/// A 20-byte account/contract address.
pub type Address = [u8; 20];

/// Length of a well-formed sender address.
pub const ADDRESS_LEN: usize = 20;

/// Link from a header to one of its parents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct ParentInfo {
    /// Parent block number.
    pub block_number: u64,
    /// Parent header hash.
    pub block_hash: Hash,
}

/// A sealer's signature over a header hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SealerSignature {
    /// Index into the header's sealer list.
    pub sealer_index: u64,
    /// Signature bytes in the suite's format.
    pub signature: Vec<u8>,
}

/// A transaction as ordered by consensus.
///
/// Never mutated once it is part of a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction format version.
    pub version: u32,
    /// Sender address bytes. Must be exactly 20 bytes to be executable.
    pub sender: Vec<u8>,
    /// Target contract, `None` for contract creation.
    pub to: Option<Address>,
    /// Sender nonce.
    pub nonce: u64,
    /// Gas limit requested by the sender.
    pub gas_limit: u64,
    /// Call data.
    pub input: Vec<u8>,
    /// Sender signature over [`Transaction::hash`].
    pub signature: Vec<u8>,
    /// Local arrival time (milliseconds), not part of the hash.
    pub import_time: u64,
}

impl Transaction {
    /// Content hash over every field except `signature` and `import_time`.
    pub fn hash(&self, suite: &CryptoSuite) -> Hash {
        let mut h = CanonicalHasher::new(suite.hash_algorithm());
        h.u32(self.version).bytes(&self.sender);
        match &self.to {
            Some(to) => h.u8(1).fixed(to),
            None => h.u8(0),
        };
        h.u64(self.nonce).u64(self.gas_limit).bytes(&self.input);
        h.finalize()
    }

    /// Sender as an address, if it has the right length.
    pub fn sender_address(&self) -> Option<Address> {
        self.sender.as_slice().try_into().ok()
    }

    /// True when this transaction deploys a contract.
    pub fn is_create(&self) -> bool {
        self.to.is_none()
    }
}

/// Final status of a transaction.
///
/// The numeric codes are part of the receipt format and never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// Executed successfully.
    Success,
    /// Contract logic reverted.
    Revert,
    /// Ran out of gas.
    OutOfGas,
    /// Nested calls went deeper than the configured limit.
    CallDepthExceeded,
    /// A cross-shard call did not return in time and was not tolerated.
    CrossShardTimeout,
    /// The node could not produce a serializable execution within the
    /// re-execution budget. Distinct from a revert: the transaction did
    /// nothing wrong.
    ExecutionConflictUnresolved,
}

impl TransactionStatus {
    /// Stable numeric code.
    pub fn code(&self) -> u32 {
        match self {
            Self::Success => 0,
            Self::Revert => 1,
            Self::OutOfGas => 2,
            Self::CallDepthExceeded => 3,
            Self::CrossShardTimeout => 4,
            Self::ExecutionConflictUnresolved => 5,
        }
    }

    /// Inverse of [`TransactionStatus::code`].
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::Success),
            1 => Some(Self::Revert),
            2 => Some(Self::OutOfGas),
            3 => Some(Self::CallDepthExceeded),
            4 => Some(Self::CrossShardTimeout),
            5 => Some(Self::ExecutionConflictUnresolved),
            _ => None,
        }
    }

    /// Shorthand for `== Success`.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// An event emitted during execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Emitting contract.
    pub address: Address,
    /// Indexed topics.
    pub topics: Vec<Hash>,
    /// Payload.
    pub data: Vec<u8>,
}

/// Outcome of one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    /// Receipt format version.
    pub version: u32,
    /// Final status.
    pub status: TransactionStatus,
    /// Gas charged.
    pub gas_used: u64,
    /// Return data (or revert message).
    pub output: Vec<u8>,
    /// Emitted events, in emission order.
    pub logs: Vec<LogEntry>,
    /// Address of the created contract, if any.
    pub contract_address: Option<Address>,
    /// Block this receipt belongs to.
    pub block_number: u64,
}

impl TransactionReceipt {
    /// Receipt for a transaction that had no effects.
    pub fn failure(status: TransactionStatus, gas_used: u64, block_number: u64) -> Self {
        Self {
            version: 0,
            status,
            gas_used,
            output: Vec::new(),
            logs: Vec::new(),
            contract_address: None,
            block_number,
        }
    }

    /// Content hash over every field.
    pub fn hash(&self, suite: &CryptoSuite) -> Hash {
        let mut h = CanonicalHasher::new(suite.hash_algorithm());
        h.u32(self.version)
            .u32(self.status.code())
            .u64(self.gas_used)
            .bytes(&self.output)
            .seq_len(self.logs.len());
        for log in &self.logs {
            h.fixed(&log.address).seq_len(log.topics.len());
            for topic in &log.topics {
                h.fixed(topic);
            }
            h.bytes(&log.data);
        }
        match &self.contract_address {
            Some(addr) => h.u8(1).fixed(addr),
            None => h.u8(0),
        };
        h.u64(self.block_number);
        h.finalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;

    fn sample_transaction() -> Transaction {
        Transaction {
            version: 0,
            sender: vec![0x11; 20],
            to: Some([0x22; 20]),
            nonce: 7,
            gas_limit: 100_000,
            input: b"transfer".to_vec(),
            signature: vec![0xAA; 64],
            import_time: 1_700_000_000_000,
        }
    }

    fn sample_receipt() -> TransactionReceipt {
        TransactionReceipt {
            version: 0,
            status: TransactionStatus::Revert,
            gas_used: 21_000,
            output: b"insufficient".to_vec(),
            logs: vec![LogEntry {
                address: [3; 20],
                topics: vec![[4; 32], [5; 32]],
                data: vec![6, 7],
            }],
            contract_address: Some([8; 20]),
            block_number: 9,
        }
    }

    #[test]
    fn test_transaction_hash_ignores_signature_and_import_time() {
        let suite = CryptoSuite::standard();
        let tx = sample_transaction();
        let mut other = tx.clone();
        other.signature = vec![0xBB; 64];
        other.import_time = 0;
        assert_eq!(tx.hash(&suite), other.hash(&suite));

        other.nonce += 1;
        assert_ne!(tx.hash(&suite), other.hash(&suite));
    }

    #[test]
    fn test_transaction_hash_is_hash_of_canonical_fields() {
        #[derive(Serialize)]
        struct Fields<'a> {
            version: u32,
            sender: &'a Vec<u8>,
            to: &'a Option<Address>,
            nonce: u64,
            gas_limit: u64,
            input: &'a Vec<u8>,
        }

        let suite = CryptoSuite::national_cipher();
        let tx = sample_transaction();
        let encoded = codec::encode(&Fields {
            version: tx.version,
            sender: &tx.sender,
            to: &tx.to,
            nonce: tx.nonce,
            gas_limit: tx.gas_limit,
            input: &tx.input,
        })
        .unwrap();

        assert_eq!(tx.hash(&suite), suite.hash(&encoded));
    }

    #[test]
    fn test_receipt_hash_is_hash_of_encoding() {
        let suite = CryptoSuite::standard();
        let receipt = sample_receipt();
        let encoded = codec::encode(&receipt).unwrap();
        assert_eq!(receipt.hash(&suite), suite.hash(&encoded));
    }

    #[test]
    fn test_status_codes_are_stable() {
        assert_eq!(TransactionStatus::Success.code(), 0);
        assert_eq!(TransactionStatus::ExecutionConflictUnresolved.code(), 5);
        for code in 0..6 {
            let status = TransactionStatus::from_code(code).unwrap();
            assert_eq!(status.code(), code);
        }
        assert!(TransactionStatus::from_code(6).is_none());
    }

    #[test]
    fn test_status_encodes_as_code() {
        let bytes = codec::encode(&TransactionStatus::CrossShardTimeout).unwrap();
        assert_eq!(bytes, vec![0, 1, 0, 0, 0, 4]);
    }

    #[test]
    fn test_sender_address() {
        let mut tx = sample_transaction();
        assert_eq!(tx.sender_address(), Some([0x11; 20]));
        tx.sender = vec![1, 2, 3];
        assert_eq!(tx.sender_address(), None);
    }
}
