//! # Executor Shards (sl-03)
//!
//! The capability the scheduler drives: isolated execution units that apply
//! ordered batches of transactions against a state view and report, per
//! transaction, a receipt plus the keys it read and wrote.
//!
//! ## Cross-Shard Protocol
//!
//! A call to a contract owned by another shard leaves the shard as a
//! `CrossShardCall` [`ExecutionMessage`] through the [`CrossShardRouter`] and
//! comes back as a `CrossShardReturn` or `Revert`. Only the calling
//! transaction waits; the transaction's footprint travels with the message.
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - State keys, versions, footprints, messages, operations
//! - `ports/` - [`ExecutorShard`] (inbound), [`StateView`] and
//!   [`CrossShardRouter`] (outbound)
//! - `adapters/` - [`KvShard`], [`SnapshotView`], [`FaultyShard`]

#![warn(missing_docs)]

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::faulty::FaultyShard;
pub use adapters::kv_shard::{create_address, KvShard};
pub use adapters::snapshot_view::SnapshotView;
pub use domain::entities::{
    BatchItem, ExecutedTransaction, ExecutionMode, Footprint, ShardBatch, ShardId, StateKey,
    Version,
};
pub use domain::errors::ExecutorError;
pub use domain::message::{ExecutionMessage, MessageType};
pub use domain::ops::{decode_counter, decode_ops, encode_counter, encode_ops, gas, Op};
pub use ports::inbound::ExecutorShard;
pub use ports::outbound::{CrossShardRouter, StateView};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
