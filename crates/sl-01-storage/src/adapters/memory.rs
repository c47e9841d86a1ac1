//! In-memory transactional storage.
//!
//! Committed state is an `Arc<Tables>` swapped in whole on commit, so a
//! snapshot is an `Arc` clone and a failed commit leaves nothing behind.
//! Tables touched by a commit are copied on write; the rest are shared.

use crate::domain::errors::StorageError;
use crate::ports::outbound::{ScopeId, StorageSnapshot, Table, Tables, TransactionalStorage};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

type StagedWrites = BTreeMap<String, BTreeMap<Vec<u8>, Vec<u8>>>;

/// In-memory storage with injectable commit failures.
#[derive(Default)]
pub struct MemoryStorage {
    committed: RwLock<StorageSnapshot>,
    scopes: Mutex<HashMap<ScopeId, StagedWrites>>,
    next_scope: AtomicU64,
    fail_next_commit: AtomicBool,
}

impl MemoryStorage {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next commit fail after applying part of its writes.
    pub fn fail_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }

    /// Number of scopes currently open.
    pub fn open_scopes(&self) -> usize {
        self.scopes.lock().len()
    }
}

#[async_trait]
impl TransactionalStorage for MemoryStorage {
    async fn begin_scope(&self) -> Result<ScopeId, StorageError> {
        let scope = self.next_scope.fetch_add(1, Ordering::SeqCst);
        self.scopes.lock().insert(scope, StagedWrites::new());
        debug!(scope, "[sl-01] scope opened");
        Ok(scope)
    }

    async fn put(
        &self,
        scope: ScopeId,
        table: &str,
        key: &[u8],
        value: Vec<u8>,
    ) -> Result<(), StorageError> {
        let mut scopes = self.scopes.lock();
        let staged = scopes
            .get_mut(&scope)
            .ok_or(StorageError::UnknownScope(scope))?;
        staged
            .entry(table.to_string())
            .or_default()
            .insert(key.to_vec(), value);
        Ok(())
    }

    async fn get(
        &self,
        scope: Option<ScopeId>,
        table: &str,
        key: &[u8],
    ) -> Result<Option<Vec<u8>>, StorageError> {
        if let Some(scope) = scope {
            let scopes = self.scopes.lock();
            let staged = scopes.get(&scope).ok_or(StorageError::UnknownScope(scope))?;
            if let Some(value) = staged.get(table).and_then(|t| t.get(key)) {
                return Ok(Some(value.clone()));
            }
        }
        Ok(self.committed.read().get(table, key).map(<[u8]>::to_vec))
    }

    async fn commit(&self, scope: ScopeId) -> Result<(), StorageError> {
        let staged = self
            .scopes
            .lock()
            .remove(&scope)
            .ok_or(StorageError::UnknownScope(scope))?;
        let inject_failure = self.fail_next_commit.swap(false, Ordering::SeqCst);

        let mut committed = self.committed.write();
        let mut next: Tables = committed.tables().as_ref().clone();
        let total_tables = staged.len();

        for (applied, (name, writes)) in staged.into_iter().enumerate() {
            if inject_failure && applied * 2 >= total_tables {
                warn!(scope, applied, "[sl-01] injected commit failure");
                return Err(StorageError::CommitFailed {
                    scope,
                    reason: "injected failure".to_string(),
                });
            }
            let table: &mut Table = Arc::make_mut(next.entry(name).or_default());
            table.extend(writes);
        }

        if inject_failure {
            // Scope too small to interrupt half-way.
            return Err(StorageError::CommitFailed {
                scope,
                reason: "injected failure".to_string(),
            });
        }

        let version = committed.version() + 1;
        *committed = StorageSnapshot::new(Arc::new(next), version);
        debug!(scope, version, "[sl-01] scope committed");
        Ok(())
    }

    async fn rollback(&self, scope: ScopeId) -> Result<(), StorageError> {
        self.scopes
            .lock()
            .remove(&scope)
            .ok_or(StorageError::UnknownScope(scope))?;
        debug!(scope, "[sl-01] scope rolled back");
        Ok(())
    }

    fn snapshot(&self) -> StorageSnapshot {
        self.committed.read().clone()
    }
}
