//! # Transactional Storage (sl-01)
//!
//! The storage contract consumed by the ledger and the scheduler: writes are
//! staged in a scope and become visible all at once on commit, or not at all.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Atomic Commit | A scope commits entirely or leaves no trace |
//! | 2 | Authoritative Errors | A failed commit never partially applies |
//! | 3 | Stable Snapshots | A snapshot never observes later commits |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Table names, key helpers, errors
//! - `ports/` - `TransactionalStorage` trait and `StorageSnapshot`
//! - `adapters/` - `MemoryStorage`

#![warn(missing_docs)]

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::memory::MemoryStorage;
pub use domain::errors::StorageError;
pub use domain::tables;
pub use ports::outbound::{ScopeId, StorageSnapshot, TransactionalStorage};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
