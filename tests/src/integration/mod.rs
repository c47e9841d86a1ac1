//! End-to-end scenarios.
//!
//! | Module | Covers |
//! |--------|--------|
//! | `block_flow` | Genesis, sequential blocks, roots, restart |
//! | `cross_shard` | Calls between shards, serializability, placement independence |
//! | `failures` | Atomic commit, retries, cancellation, conflict limits |

mod block_flow;
mod cross_shard;
mod failures;
