//! State view over a committed storage snapshot.

use crate::domain::entities::{StateKey, Version};
use crate::ports::outbound::StateView;
use sl_01_storage::{tables, StorageSnapshot};

/// Pre-block state: every value reads with version `None`.
#[derive(Debug, Clone)]
pub struct SnapshotView {
    snapshot: StorageSnapshot,
}

impl SnapshotView {
    /// View over `snapshot`.
    pub fn new(snapshot: StorageSnapshot) -> Self {
        Self { snapshot }
    }

    /// Underlying snapshot.
    pub fn snapshot(&self) -> &StorageSnapshot {
        &self.snapshot
    }
}

impl StateView for SnapshotView {
    fn read(&self, key: &StateKey) -> Option<(Vec<u8>, Option<Version>)> {
        self.snapshot
            .get(tables::S_STATE, &key.storage_key())
            .map(|value| (value.to_vec(), None))
    }
}
