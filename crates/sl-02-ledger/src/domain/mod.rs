//! Domain layer for the ledger.

pub mod errors;
pub mod finalized;
