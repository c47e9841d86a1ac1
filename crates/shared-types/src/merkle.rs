//! # Merkle Roots
//!
//! Binary hash tree where each non-leaf node is `H(left || right)`, with `H`
//! the suite's hash function.
//!
//! - Leaves are padded to the next power of two with [`SENTINEL_HASH`].
//! - A single leaf is padded to two, so its root is `H(leaf || SENTINEL)`.
//! - The empty list has root [`SENTINEL_HASH`].
//!
//! Same leaves in the same order always produce the same root.

use crate::entities::Hash;
use shared_crypto::{CryptoSuite, ZERO_HASH};

/// Padding leaf.
pub const SENTINEL_HASH: Hash = ZERO_HASH;

/// Root of the tree over `leaves`, in order.
pub fn merkle_root(suite: &CryptoSuite, leaves: &[Hash]) -> Hash {
    if leaves.is_empty() {
        return SENTINEL_HASH;
    }

    let padded = leaves.len().next_power_of_two().max(2);
    let mut level: Vec<Hash> = Vec::with_capacity(padded);
    level.extend_from_slice(leaves);
    level.resize(padded, SENTINEL_HASH);

    while level.len() > 1 {
        level = level
            .chunks_exact(2)
            .map(|pair| hash_pair(suite, &pair[0], &pair[1]))
            .collect();
    }
    level[0]
}

fn hash_pair(suite: &CryptoSuite, left: &Hash, right: &Hash) -> Hash {
    suite.hash_many(&[left.as_slice(), right.as_slice()])
}
