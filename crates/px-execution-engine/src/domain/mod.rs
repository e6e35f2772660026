//! Engine domain types.

pub mod entities;
pub mod errors;
