//! # Shared Types Crate
//!
//! Cross-crate primitives for the Parallax execution engine.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: types that cross crate boundaries (addresses,
//!   key spaces, delivery responses, the block bloom aggregate) live here.
//! - **No behavior**: this crate holds data shapes and small pure helpers
//!   only; scheduling and state logic belong to the engine crates.

pub mod bloom;
pub mod primitives;
pub mod response;

pub use bloom::Bloom;
pub use primitives::*;
pub use response::*;
