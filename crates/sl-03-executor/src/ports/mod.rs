//! Ports for executor shards.

pub mod inbound;
pub mod outbound;
