//! Domain layer for the scheduler.

pub mod errors;
pub mod plan;
pub mod state;
