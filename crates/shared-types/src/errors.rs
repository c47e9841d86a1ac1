//! # Error Types
//!
//! Protocol-level errors for the block/header model and its wire format.

use shared_crypto::CryptoError;
use thiserror::Error;

/// Canonical encoding failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Payload was written by another codec version.
    #[error("Codec version mismatch: expected {expected}, found {found}")]
    VersionMismatch {
        /// Version this node speaks
        expected: u16,
        /// Version found on the wire
        found: u16,
    },

    /// Input shorter than the version prefix.
    #[error("Truncated input: {0} bytes")]
    Truncated(usize),

    /// Serialization failed (size limit exceeded).
    #[error("Encode failed: {0}")]
    Encode(String),

    /// Malformed payload.
    #[error("Decode failed: {0}")]
    Decode(String),
}

/// Errors raised by blocks and headers.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// A setter was called on a sealed header.
    #[error("Header is sealed and can no longer be modified")]
    ImmutableHeader,

    /// `seal` was called with no signatures.
    #[error("Cannot seal a header with an empty signature list")]
    EmptySignatureList,

    /// Transactions and receipts are not positionally correlated.
    #[error("Receipt count mismatch: {transactions} transactions, {receipts} receipts")]
    ReceiptCountMismatch {
        /// Number of transactions
        transactions: usize,
        /// Number of receipts
        receipts: usize,
    },

    /// A signature names a sealer that is not in the sealer list.
    #[error("Sealer index {index} out of range ({sealers} sealers)")]
    SealerIndexOutOfRange {
        /// Index carried by the signature
        index: u64,
        /// Size of the sealer list
        sealers: usize,
    },

    /// A signature does not verify against its sealer.
    #[error("Invalid signature from sealer {index}")]
    InvalidSealerSignature {
        /// Index carried by the signature
        index: u64,
    },

    /// Wire format error.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Signing failed.
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}
