//! Overlay domain logic.

pub mod batch;
pub mod committed;
pub mod entities;
pub mod overlay;
