//! # Ledger (sl-02)
//!
//! Durable chain metadata: genesis construction, chain-config parameters and
//! the append-only block index.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Genesis Once | Block 0 is built once; a different config is rejected |
//! | 2 | Committed Append | Only a [`FinalizedBlock`] can be appended |
//! | 3 | Sequential Tip | Each appended block is `latest + 1` |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Errors, staged and finalized block handles
//! - `config.rs` - Genesis and ledger configuration
//! - `service.rs` - [`Ledger`]

#![warn(missing_docs)]

pub mod config;
pub mod domain;
pub mod service;

pub use config::{GenesisConfig, LedgerConfig, DEFAULT_TX_GAS_LIMIT};
pub use domain::errors::LedgerError;
pub use domain::finalized::{FinalizedBlock, StagedBlock};
pub use service::Ledger;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
