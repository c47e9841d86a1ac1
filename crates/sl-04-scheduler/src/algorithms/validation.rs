//! # Conflict Validation
//!
//! Optimistic results are accepted in block order. A transaction is valid
//! when every key it read was read at the version the finalized prefix
//! holds for that key: the latest write of an earlier, already accepted
//! transaction, or the pre-block state if there is none. A valid
//! transaction observed exactly what a serial execution would have, so
//! accepting it keeps the block serializable.
//!
//! When two transactions conflict in both directions, the earlier one in
//! block order is accepted and the later one re-executes.

use shared_crypto::CryptoSuite;
use shared_types::{state_root, Hash};
use sl_01_storage::{tables, StorageSnapshot};
use sl_03_executor::{Footprint, StateKey, StateView, Version};
use std::collections::BTreeMap;

/// A read that no longer matches the finalized prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleRead {
    /// Key read.
    pub key: StateKey,
    /// Version the transaction saw.
    pub observed: Option<Version>,
    /// Version the prefix holds.
    pub expected: Option<Version>,
}

/// Writes of the transactions accepted so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinalizedPrefix {
    writes: BTreeMap<StateKey, (Vec<u8>, Version)>,
    accepted: u32,
}

impl FinalizedPrefix {
    /// Empty prefix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Transactions accepted so far.
    pub fn len(&self) -> u32 {
        self.accepted
    }

    /// True before the first transaction is accepted.
    pub fn is_empty(&self) -> bool {
        self.accepted == 0
    }

    /// Version of the latest accepted write of `key`.
    pub fn latest_version(&self, key: &StateKey) -> Option<Version> {
        self.writes.get(key).map(|(_, version)| *version)
    }

    /// Latest accepted value of `key` and its writer.
    pub fn get(&self, key: &StateKey) -> Option<&(Vec<u8>, Version)> {
        self.writes.get(key)
    }

    /// First stale read of `footprint`, if any.
    pub fn validate_reads(&self, footprint: &Footprint) -> Result<(), StaleRead> {
        for (key, observed) in &footprint.reads {
            let expected = self.latest_version(key);
            if *observed != expected {
                return Err(StaleRead {
                    key: key.clone(),
                    observed: *observed,
                    expected,
                });
            }
        }
        Ok(())
    }

    /// Accept the next transaction in block order.
    pub fn apply(&mut self, version: Version, footprint: &Footprint) {
        for (key, value) in &footprint.writes {
            self.writes.insert(key.clone(), (value.clone(), version));
        }
        self.accepted += 1;
    }

    /// Accept a transaction that left no writes.
    pub fn skip(&mut self) {
        self.accepted += 1;
    }

    /// Accepted writes in key order.
    pub fn writes(&self) -> impl ExactSizeIterator<Item = (&StateKey, &Vec<u8>)> {
        self.writes.iter().map(|(key, (value, _))| (key, value))
    }

    /// Number of distinct keys written.
    pub fn write_count(&self) -> usize {
        self.writes.len()
    }
}

/// Pre-block state overlaid with the finalized prefix.
///
/// Prefix values read with their writer's version, base values with `None`,
/// which is exactly what [`FinalizedPrefix::validate_reads`] expects.
pub struct FinalizedView<'a, B: StateView> {
    base: &'a B,
    prefix: &'a FinalizedPrefix,
}

impl<'a, B: StateView> FinalizedView<'a, B> {
    /// Overlay `prefix` on `base`.
    pub fn new(base: &'a B, prefix: &'a FinalizedPrefix) -> Self {
        Self { base, prefix }
    }
}

impl<B: StateView> StateView for FinalizedView<'_, B> {
    fn read(&self, key: &StateKey) -> Option<(Vec<u8>, Option<Version>)> {
        match self.prefix.get(key) {
            Some((value, version)) => Some((value.clone(), Some(*version))),
            None => self.base.read(key),
        }
    }
}

/// State root after applying `prefix` to the state table of `snapshot`.
pub fn post_state_root(suite: &CryptoSuite, snapshot: &StorageSnapshot, prefix: &FinalizedPrefix) -> Hash {
    let written: Vec<(Vec<u8>, &[u8])> = prefix
        .writes()
        .map(|(key, value)| (key.storage_key(), value.as_slice()))
        .collect();

    let mut state: BTreeMap<&[u8], &[u8]> = snapshot.scan(tables::S_STATE).collect();
    for (key, value) in &written {
        state.insert(key.as_slice(), *value);
    }
    state_root(suite, state.iter().map(|(k, v)| (*k, *v)))
}
