//! # Dependency Grouping
//!
//! Partitions a block's transactions into ordered dependency chains using
//! address-based union-find: any two transactions whose sender/recipient
//! parties transitively intersect belong to the same chain, preserving their
//! original relative order. Transactions without resolvable parties are
//! singletons and are never chained.
//!
//! The union-find structure is block-scoped by construction (a fresh
//! [`AddressSet`] per invocation), so concurrent block executions cannot race
//! on shared grouping state.

pub mod algorithms;
pub mod domain;

pub use algorithms::chain_builder::build_group_plan;
pub use algorithms::union_find::AddressSet;
pub use domain::entities::GroupPlan;
