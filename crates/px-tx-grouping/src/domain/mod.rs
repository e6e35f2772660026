//! Grouping domain entities.

pub mod entities;
