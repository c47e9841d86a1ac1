//! Storage error types.

use thiserror::Error;

/// Errors reported by a transactional storage backend.
///
/// A reported error is authoritative: the caller must assume nothing from
/// the failed call was applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The scope was never opened or is already closed.
    #[error("Unknown storage scope: {0}")]
    UnknownScope(u64),

    /// The backend refused the commit; the scope is discarded.
    #[error("Commit of scope {scope} failed: {reason}")]
    CommitFailed {
        /// Scope that failed
        scope: u64,
        /// Backend reason
        reason: String,
    },

    /// Any other backend failure.
    #[error("Storage backend error: {0}")]
    Backend(String),
}
