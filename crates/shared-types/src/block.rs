//! # Blocks and the Block Factory
//!
//! A block is a header plus positionally correlated transactions and
//! receipts: receipt `i` belongs to transaction `i`. A block arriving for
//! execution carries no receipts yet.
//!
//! Headers hold the node's crypto suite, so decoding goes through a
//! [`BlockFactory`] that re-attaches it.

use crate::codec;
use crate::entities::{Hash, Transaction, TransactionReceipt};
use crate::errors::{CodecError, ProtocolError};
use crate::header::{BlockHeader, HeaderData};
use crate::merkle::merkle_root;
use serde::{Deserialize, Serialize};
use shared_crypto::CryptoSuite;
use std::sync::Arc;

/// A block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Header.
    pub header: BlockHeader,
    /// Transactions in consensus order.
    pub transactions: Vec<Transaction>,
    /// Receipts, empty before execution.
    pub receipts: Vec<TransactionReceipt>,
}

impl Block {
    /// Block number from the header.
    pub fn number(&self) -> u64 {
        self.header.number()
    }

    /// Header hash.
    pub fn hash(&self) -> Hash {
        self.header.hash()
    }

    /// Check transaction/receipt correlation.
    pub fn validate_shape(&self) -> Result<(), ProtocolError> {
        if !self.receipts.is_empty() && self.receipts.len() != self.transactions.len() {
            return Err(ProtocolError::ReceiptCountMismatch {
                transactions: self.transactions.len(),
                receipts: self.receipts.len(),
            });
        }
        Ok(())
    }

    /// Merkle root over transaction hashes, in block order.
    pub fn compute_txs_root(&self) -> Hash {
        let suite = self.header.suite();
        let leaves: Vec<Hash> = self.transactions.iter().map(|tx| tx.hash(suite)).collect();
        merkle_root(suite, &leaves)
    }

    /// Merkle root over receipt hashes, in block order.
    pub fn compute_receipts_root(&self) -> Hash {
        let suite = self.header.suite();
        let leaves: Vec<Hash> = self.receipts.iter().map(|r| r.hash(suite)).collect();
        merkle_root(suite, &leaves)
    }
}

#[derive(Serialize)]
struct BlockWireRef<'a> {
    header: &'a HeaderData,
    transactions: &'a [Transaction],
    receipts: &'a [TransactionReceipt],
}

#[derive(Deserialize)]
struct BlockWire {
    header: HeaderData,
    transactions: Vec<Transaction>,
    receipts: Vec<TransactionReceipt>,
}

/// Builds, encodes and decodes blocks for one crypto suite.
#[derive(Debug, Clone)]
pub struct BlockFactory {
    suite: Arc<CryptoSuite>,
}

impl BlockFactory {
    /// Factory bound to `suite`.
    pub fn new(suite: Arc<CryptoSuite>) -> Self {
        Self { suite }
    }

    /// Bound suite.
    pub fn suite(&self) -> &Arc<CryptoSuite> {
        &self.suite
    }

    /// Empty header.
    pub fn create_header(&self) -> BlockHeader {
        BlockHeader::new(Arc::clone(&self.suite))
    }

    /// Header from a field set.
    pub fn header_from_data(&self, data: HeaderData) -> BlockHeader {
        BlockHeader::from_data(Arc::clone(&self.suite), data)
    }

    /// Block with no receipts.
    pub fn create_block(&self, header: BlockHeader, transactions: Vec<Transaction>) -> Block {
        Block {
            header,
            transactions,
            receipts: Vec::new(),
        }
    }

    /// Canonical block bytes.
    pub fn encode_block(&self, block: &Block) -> Result<Vec<u8>, CodecError> {
        codec::encode(&BlockWireRef {
            header: block.header.data(),
            transactions: &block.transactions,
            receipts: &block.receipts,
        })
    }

    /// Inverse of [`BlockFactory::encode_block`].
    pub fn decode_block(&self, bytes: &[u8]) -> Result<Block, CodecError> {
        let wire: BlockWire = codec::decode(bytes)?;
        Ok(Block {
            header: self.header_from_data(wire.header),
            transactions: wire.transactions,
            receipts: wire.receipts,
        })
    }

    /// Canonical header bytes, signatures included.
    pub fn encode_header(&self, header: &BlockHeader) -> Result<Vec<u8>, CodecError> {
        codec::encode(header.data())
    }

    /// Inverse of [`BlockFactory::encode_header`].
    pub fn decode_header(&self, bytes: &[u8]) -> Result<BlockHeader, CodecError> {
        let data: HeaderData = codec::decode(bytes)?;
        Ok(self.header_from_data(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        LogEntry, ParentInfo, SealerSignature, TransactionStatus, U256,
    };
    use proptest::prelude::*;

    fn factory() -> BlockFactory {
        BlockFactory::new(Arc::new(CryptoSuite::standard()))
    }

    fn tx(nonce: u64) -> Transaction {
        Transaction {
            version: 0,
            sender: vec![1; 20],
            to: Some([2; 20]),
            nonce,
            gas_limit: 50_000,
            input: vec![nonce as u8; 4],
            signature: vec![3; 64],
            import_time: 0,
        }
    }

    fn receipt(gas: u64) -> TransactionReceipt {
        TransactionReceipt {
            version: 0,
            status: TransactionStatus::Success,
            gas_used: gas,
            output: vec![],
            logs: vec![],
            contract_address: None,
            block_number: 1,
        }
    }

    #[test]
    fn test_receipt_count_mismatch() {
        let f = factory();
        let mut block = f.create_block(f.create_header(), vec![tx(0), tx(1)]);
        assert!(block.validate_shape().is_ok());

        block.receipts = vec![receipt(1)];
        assert!(matches!(
            block.validate_shape(),
            Err(ProtocolError::ReceiptCountMismatch {
                transactions: 2,
                receipts: 1
            })
        ));

        block.receipts.push(receipt(2));
        assert!(block.validate_shape().is_ok());
    }

    #[test]
    fn test_txs_root_is_deterministic() {
        let f = factory();
        let a = f.create_block(f.create_header(), vec![tx(0), tx(1)]);
        let b = f.create_block(f.create_header(), vec![tx(0), tx(1)]);
        assert_eq!(a.compute_txs_root(), b.compute_txs_root());

        let expected = merkle_root(
            f.suite(),
            &[tx(0).hash(f.suite()), tx(1).hash(f.suite())],
        );
        assert_eq!(a.compute_txs_root(), expected);
    }

    #[test]
    fn test_sealed_header_roundtrip_keeps_seal() {
        let f = factory();
        let mut header = f.create_header();
        header.set_number(3).unwrap();
        header
            .seal(vec![SealerSignature {
                sealer_index: 0,
                signature: vec![9; 64],
            }])
            .unwrap();

        let decoded = f.decode_header(&f.encode_header(&header).unwrap()).unwrap();
        assert!(decoded.is_sealed());
        assert_eq!(decoded.hash(), header.hash());
    }

    #[test]
    fn test_decode_rejects_other_version() {
        let f = factory();
        let block = f.create_block(f.create_header(), vec![tx(0)]);
        let mut bytes = f.encode_block(&block).unwrap();
        bytes[0] = 0xFF;
        assert!(matches!(
            f.decode_block(&bytes),
            Err(CodecError::VersionMismatch { .. })
        ));
    }

    fn arb_bytes(max: usize) -> impl Strategy<Value = Vec<u8>> {
        proptest::collection::vec(any::<u8>(), 0..max)
    }

    fn arb_transaction() -> impl Strategy<Value = Transaction> {
        (
            any::<u32>(),
            arb_bytes(24),
            proptest::option::of(any::<[u8; 20]>()),
            any::<u64>(),
            any::<u64>(),
            arb_bytes(64),
            arb_bytes(72),
            any::<u64>(),
        )
            .prop_map(
                |(version, sender, to, nonce, gas_limit, input, signature, import_time)| {
                    Transaction {
                        version,
                        sender,
                        to,
                        nonce,
                        gas_limit,
                        input,
                        signature,
                        import_time,
                    }
                },
            )
    }

    fn arb_receipt() -> impl Strategy<Value = TransactionReceipt> {
        (
            0u32..6,
            any::<u64>(),
            arb_bytes(32),
            proptest::collection::vec(
                (any::<[u8; 20]>(), proptest::collection::vec(any::<[u8; 32]>(), 0..3), arb_bytes(16)),
                0..3,
            ),
            proptest::option::of(any::<[u8; 20]>()),
            any::<u64>(),
        )
            .prop_map(|(code, gas_used, output, logs, contract_address, block_number)| {
                TransactionReceipt {
                    version: 0,
                    status: TransactionStatus::from_code(code).unwrap_or(TransactionStatus::Success),
                    gas_used,
                    output,
                    logs: logs
                        .into_iter()
                        .map(|(address, topics, data)| LogEntry {
                            address,
                            topics,
                            data,
                        })
                        .collect(),
                    contract_address,
                    block_number,
                }
            })
    }

    fn arb_header_data() -> impl Strategy<Value = HeaderData> {
        (
            any::<u32>(),
            proptest::collection::vec((any::<u64>(), any::<[u8; 32]>()), 0..3),
            any::<u64>(),
            any::<u64>(),
            proptest::collection::vec(arb_bytes(33), 0..4),
            any::<[u8; 32]>(),
            any::<[u8; 32]>(),
            any::<u128>(),
            arb_bytes(32),
            proptest::collection::vec(any::<u64>(), 0..4),
            proptest::collection::vec((any::<u64>(), arb_bytes(64)), 0..3),
        )
            .prop_map(
                |(version, parents, number, timestamp, sealer_list, txs_root, state_root, gas, extra_data, consensus_weights, sigs)| {
                    HeaderData {
                        version,
                        parent_info: parents
                            .into_iter()
                            .map(|(block_number, block_hash)| ParentInfo {
                                block_number,
                                block_hash,
                            })
                            .collect(),
                        number,
                        timestamp,
                        sealer: number % 7,
                        sealer_list,
                        txs_root,
                        receipts_root: txs_root,
                        state_root,
                        gas_used: U256::from(gas),
                        extra_data,
                        consensus_weights,
                        signature_list: sigs
                            .into_iter()
                            .map(|(sealer_index, signature)| SealerSignature {
                                sealer_index,
                                signature,
                            })
                            .collect(),
                    }
                },
            )
    }

    proptest! {
        #[test]
        fn test_block_roundtrip(
            data in arb_header_data(),
            transactions in proptest::collection::vec(arb_transaction(), 0..4),
            receipts in proptest::collection::vec(arb_receipt(), 0..4),
        ) {
            let f = factory();
            let block = Block {
                header: f.header_from_data(data),
                transactions,
                receipts,
            };
            let bytes = f.encode_block(&block).unwrap();
            let decoded = f.decode_block(&bytes).unwrap();
            prop_assert_eq!(&decoded, &block);
            prop_assert_eq!(decoded.hash(), block.hash());
            prop_assert_eq!(f.encode_block(&decoded).unwrap(), bytes);
        }
    }
}
