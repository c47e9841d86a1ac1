//! Domain layer: table addressing and errors.

pub mod errors;
pub mod tables;
