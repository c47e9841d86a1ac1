//! # Block Scheduler (sl-04)
//!
//! Turns an ordered block into a finalized one: plans transactions onto
//! executor shards, runs them in parallel, routes cross-shard calls,
//! validates the optimistic results in block order and commits state plus
//! ledger index in a single storage scope.
//!
//! ## Guarantees
//!
//! | Property | How |
//! |----------|-----|
//! | Serializability | Reads validated against the finalized prefix; stale transactions re-execute serially |
//! | Determinism | Placement, validation and roots depend only on chain state and block content |
//! | Atomic commit | One scope per block; failure rolls everything back |
//! | One block at a time | Concurrent `execute_block` calls are rejected |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Block states, execution plan, errors
//! - `algorithms/` - Shard placement, conflict validation
//! - `adapters/` - [`SchedulerRouter`] for cross-shard calls
//! - `ports/` - [`BlockExecutionApi`]
//! - `service.rs` - [`Scheduler`]
//! - `config.rs` - [`SchedulerConfig`], [`NodeConfig`]

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::router::SchedulerRouter;
pub use algorithms::planning::{plan_block, rendezvous_assign, ShardResolver};
pub use algorithms::validation::{post_state_root, FinalizedPrefix, FinalizedView, StaleRead};
pub use config::{NodeConfig, SchedulerConfig};
pub use domain::errors::{ErrorClass, PlanningError, SchedulerError};
pub use domain::plan::{ExecutionPlan, TxAssignment};
pub use domain::state::{BlockState, FailureReason};
pub use ports::inbound::BlockExecutionApi;
pub use service::Scheduler;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
