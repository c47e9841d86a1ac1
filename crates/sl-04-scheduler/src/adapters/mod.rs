//! Adapters the scheduler plugs into executor shards.

pub mod router;
