//! Crypto error types.

use std::path::PathBuf;
use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Encryption failed
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Decryption failed
    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    /// Invalid key length
    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Expected key length in bytes
        expected: usize,
        /// Actual key length in bytes
        actual: usize,
    },

    /// Ciphertext shorter than the nonce prefix
    #[error("Ciphertext too short: {0} bytes")]
    CiphertextTooShort(usize),

    /// Invalid public key
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// Invalid private key
    #[error("Invalid private key")]
    InvalidPrivateKey,

    /// Invalid signature
    #[error("Invalid signature")]
    InvalidSignature,

    /// Key pair belongs to a different profile than the suite.
    #[error("Algorithm mismatch: suite uses {suite}, key pair is {key}")]
    AlgorithmMismatch {
        /// Signature algorithm of the suite
        suite: &'static str,
        /// Signature algorithm of the key pair
        key: &'static str,
    },

    /// Private key file is configured but cannot be read or parsed.
    ///
    /// Fatal at startup.
    #[error("Key material unreadable at {path}: {reason}")]
    KeyMaterialUnreadable {
        /// Configured key path
        path: PathBuf,
        /// Underlying failure
        reason: String,
    },

    /// A key pair was requested but no key path is configured.
    #[error("Key pair requested but no private key path configured")]
    MissingKeyPath,
}
