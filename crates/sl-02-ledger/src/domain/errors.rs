//! Ledger error types.

use shared_types::{CodecError, ProtocolError};
use sl_01_storage::StorageError;
use thiserror::Error;

/// Ledger errors.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// No genesis block has been built yet.
    #[error("Ledger not initialized: build genesis first")]
    NotInitialized,

    /// Chain metadata exists and was built from a different genesis config.
    #[error("Genesis mismatch: stored config differs from the provided one (stored genesis hash {stored_hash})")]
    GenesisMismatch {
        /// Hex hash of the stored genesis block
        stored_hash: String,
    },

    /// No block with this number is stored.
    #[error("Block {0} not found")]
    BlockNotFound(u64),

    /// The genesis config fails validation.
    #[error("Invalid genesis config: {0}")]
    InvalidGenesisConfig(String),

    /// A block was staged out of order.
    #[error("Non-sequential block: expected {expected}, got {actual}")]
    NonSequentialBlock {
        /// Next expected number
        expected: u64,
        /// Number provided
        actual: u64,
    },

    /// An internal invariant was violated. Should never happen.
    #[error("Ledger invariant violated: {0}")]
    InvariantViolation(String),

    /// Stored metadata could not be interpreted.
    #[error("Corrupt ledger metadata: {0}")]
    CorruptMetadata(String),

    /// Storage failure.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Encoding failure.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Header/block failure.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
