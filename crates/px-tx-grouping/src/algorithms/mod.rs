//! Grouping algorithms.

pub mod chain_builder;
pub mod union_find;
