//! Ports for the scheduler.

pub mod inbound;
