//! Application layer: the block executor facade.

pub mod service;

pub use service::BlockExecutor;
