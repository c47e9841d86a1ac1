//! Pure scheduling algorithms.

pub mod planning;
pub mod validation;
