//! # Hashing
//!
//! The two content hashes a node can run with:
//!
//! - **Keccak-256** for the standard profile
//! - **SM3** for the national-cipher profile
//!
//! Both produce 256-bit digests, so every hash in the system is a `HashValue`.

use sha3::{Digest, Keccak256};
use sm3::Sm3;

/// 256-bit hash output.
pub type HashValue = [u8; 32];

/// The all-zero hash, used for placeholder roots.
pub const ZERO_HASH: HashValue = [0u8; 32];

/// Hash function selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    /// Keccak-256 (Ethereum flavour, not NIST SHA3-256).
    Keccak256,
    /// SM3 (GB/T 32905-2016).
    Sm3,
}

impl HashAlgorithm {
    /// Stable name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Keccak256 => "keccak256",
            Self::Sm3 => "sm3",
        }
    }

    /// One-shot hash.
    pub fn hash(&self, data: &[u8]) -> HashValue {
        let mut hasher = Hasher::new(*self);
        hasher.update(data);
        hasher.finalize()
    }
}

/// Streaming hasher over either algorithm.
pub enum Hasher {
    /// Keccak-256 state
    Keccak(Keccak256),
    /// SM3 state
    Sm3(Sm3),
}

impl Hasher {
    /// Create a new hasher for the algorithm.
    pub fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Keccak256 => Self::Keccak(Keccak256::new()),
            HashAlgorithm::Sm3 => Self::Sm3(Sm3::new()),
        }
    }

    /// Update with data.
    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        match self {
            Self::Keccak(inner) => Digest::update(inner, data),
            Self::Sm3(inner) => Digest::update(inner, data),
        }
        self
    }

    /// Finalize and return hash.
    pub fn finalize(self) -> HashValue {
        let mut output = [0u8; 32];
        match self {
            Self::Keccak(inner) => output.copy_from_slice(&inner.finalize()),
            Self::Sm3(inner) => output.copy_from_slice(&inner.finalize()),
        }
        output
    }
}
