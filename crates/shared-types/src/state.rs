//! State summary hash.
//!
//! The state root is the suite hash of the canonical encoding of every
//! `(key, value)` entry of the state table, in ascending key order. It is a
//! flat summary rather than a trie root: it binds the full post-block state
//! but offers no inclusion proofs.

use crate::codec::CanonicalHasher;
use crate::entities::Hash;
use shared_crypto::CryptoSuite;

/// Hash of the sorted state entries. `entries` must already be sorted by key.
pub fn state_root<'a, I>(suite: &CryptoSuite, entries: I) -> Hash
where
    I: ExactSizeIterator<Item = (&'a [u8], &'a [u8])>,
{
    let mut h = CanonicalHasher::new(suite.hash_algorithm());
    h.seq_len(entries.len());
    for (key, value) in entries {
        h.bytes(key).bytes(value);
    }
    h.finalize()
}
