//! # Shared Crypto - Pluggable Crypto Suite
//!
//! The node runs exactly one cryptographic profile, chosen at startup.
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | Keccak-256, SM3 | Header/transaction/receipt hashes, merkle roots |
//! | `ecdsa` | secp256k1 | Sealer signatures (standard profile) |
//! | `sm2` | SM2 | Sealer signatures (national-cipher profile) |
//! | `symmetric` | AES-256-GCM, SM4-GCM | Data-at-rest encryption |
//! | `suite` | - | Profile selection and the `{hash, sign, verify, encrypt}` facade |
//! | `config` | - | Key material loading |

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod ecdsa;
pub mod errors;
pub mod hashing;
pub mod sm2;
pub mod suite;
pub mod symmetric;

// Re-exports
pub use config::{load_key_pair, load_node_crypto, CryptoConfig, NodeCrypto};
pub use ecdsa::Secp256k1KeyPair;
pub use errors::CryptoError;
pub use hashing::{HashAlgorithm, HashValue, Hasher, ZERO_HASH};
pub use sm2::Sm2KeyPair;
pub use suite::{CryptoProfile, CryptoSuite, KeyPair, SignatureAlgorithm};
pub use symmetric::CipherAlgorithm;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
