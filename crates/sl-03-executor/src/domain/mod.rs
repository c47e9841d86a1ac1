//! Domain layer for executor shards.

pub mod entities;
pub mod errors;
pub mod message;
pub mod ops;
