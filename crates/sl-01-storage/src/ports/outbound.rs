//! # Outbound Ports (Driven Ports)
//!
//! The storage contract this core consumes. The on-disk engine behind it is
//! an external collaborator; only scope/commit/rollback semantics matter.

use crate::domain::errors::StorageError;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Handle of an open write scope.
pub type ScopeId = u64;

/// One table: key to value, sorted.
pub type Table = BTreeMap<Vec<u8>, Vec<u8>>;

/// All tables by name. Tables are shared copy-on-write between snapshots.
pub type Tables = BTreeMap<String, Arc<Table>>;

/// Read-only view of the committed state at one point in time.
///
/// Cheap to clone; later commits are never observed through it.
#[derive(Debug, Clone, Default)]
pub struct StorageSnapshot {
    tables: Arc<Tables>,
    version: u64,
}

impl StorageSnapshot {
    /// Wrap committed tables.
    pub fn new(tables: Arc<Tables>, version: u64) -> Self {
        Self { tables, version }
    }

    /// Committed tables.
    pub fn tables(&self) -> &Arc<Tables> {
        &self.tables
    }

    /// Number of commits that produced this snapshot.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Point lookup.
    pub fn get(&self, table: &str, key: &[u8]) -> Option<&[u8]> {
        self.tables
            .get(table)
            .and_then(|t| t.get(key))
            .map(Vec::as_slice)
    }

    /// All entries of a table in key order.
    pub fn scan<'a>(&'a self, table: &str) -> impl Iterator<Item = (&'a [u8], &'a [u8])> + 'a {
        self.tables
            .get(table)
            .into_iter()
            .flat_map(|t| t.iter().map(|(k, v)| (k.as_slice(), v.as_slice())))
    }

    /// Number of entries in a table.
    pub fn table_len(&self, table: &str) -> usize {
        self.tables.get(table).map_or(0, |t| t.len())
    }
}

/// Abstract interface for a transactional key/value store.
///
/// Addressing is `(table, key)`. Writes go into a scope opened with
/// [`TransactionalStorage::begin_scope`] and become visible only when the
/// scope commits.
///
/// ## Atomicity Guarantee
///
/// Either ALL writes of a scope are applied, or NONE are.
#[async_trait]
pub trait TransactionalStorage: Send + Sync {
    /// Open a new write scope.
    async fn begin_scope(&self) -> Result<ScopeId, StorageError>;

    /// Stage a write.
    async fn put(
        &self,
        scope: ScopeId,
        table: &str,
        key: &[u8],
        value: Vec<u8>,
    ) -> Result<(), StorageError>;

    /// Read through `scope` (staged writes first), or committed state when
    /// `scope` is `None`. `Ok(None)` is NotFound.
    async fn get(
        &self,
        scope: Option<ScopeId>,
        table: &str,
        key: &[u8],
    ) -> Result<Option<Vec<u8>>, StorageError>;

    /// Apply every staged write atomically and close the scope.
    ///
    /// On error the scope is closed and nothing was applied.
    async fn commit(&self, scope: ScopeId) -> Result<(), StorageError>;

    /// Discard the scope.
    async fn rollback(&self, scope: ScopeId) -> Result<(), StorageError>;

    /// Snapshot of committed state for concurrent readers.
    fn snapshot(&self) -> StorageSnapshot;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> StorageSnapshot {
        let mut table = Table::new();
        table.insert(b"b".to_vec(), b"2".to_vec());
        table.insert(b"a".to_vec(), b"1".to_vec());
        let mut tables = Tables::new();
        tables.insert("t".to_string(), Arc::new(table));
        StorageSnapshot::new(Arc::new(tables), 3)
    }

    #[test]
    fn test_snapshot_get() {
        let snap = snapshot();
        assert_eq!(snap.get("t", b"a"), Some(&b"1"[..]));
        assert_eq!(snap.get("t", b"z"), None);
        assert_eq!(snap.get("missing", b"a"), None);
        assert_eq!(snap.version(), 3);
    }

    #[test]
    fn test_snapshot_scan_is_sorted() {
        let snap = snapshot();
        let keys: Vec<&[u8]> = snap.scan("t").map(|(k, _)| k).collect();
        assert_eq!(keys, vec![&b"a"[..], &b"b"[..]]);
        assert_eq!(snap.scan("missing").count(), 0);
        assert_eq!(snap.table_len("t"), 2);
    }
}
