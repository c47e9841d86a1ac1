//! # Shardline Test Suite
//!
//! Cross-crate scenarios: a full node (storage, ledger, shards, scheduler)
//! is assembled from a [`NodeConfig`](sl_04_scheduler::NodeConfig) and
//! driven block by block.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/harness.rs       # TestNode and transaction builders
//! ├── src/integration/     # End-to-end scenarios
//! └── benches/             # Block execution throughput
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p sl-tests
//! cargo test -p sl-tests integration::cross_shard::
//! cargo bench -p sl-tests
//! ```

pub mod harness;
pub mod integration;

pub use harness::TestNode;
