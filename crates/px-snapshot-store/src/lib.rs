//! # Versioned Snapshot Store
//!
//! Copy-on-write key/value overlays for speculative transaction execution.
//!
//! ## Architecture
//!
//! - **Domain** (`domain/`): pure overlay logic
//!   - `SnapshotOverlay`: single-namespace overlay recording read and write
//!     sets per execution attempt
//!   - `OverlayBatch`: multi-namespace aggregator grouping several named key
//!     spaces under one logical batch; seals into an immutable view that a
//!     chain successor can speculate on
//!   - `SharedOverlay`: the block's committed overlay, base snapshot plus
//!     the globally accumulated dirty set, extended only by the merge loop
//! - **Ports** (`ports/`): `StateView` (shared read-only base) and
//!   `StateBackend` (durable store the committed overlay flushes into)
//! - **Adapters** (`adapters/`): `MemStore` in-memory backend
//!
//! ## Invariants
//!
//! - Flush order is ascending by key within each namespace, namespaces in
//!   name order; write sets are `BTreeMap`-backed so the order is structural.
//! - A read is recorded only when it falls through to the parent; locally
//!   dirty keys never enter the read set.
//! - The fee-collector balance key is excluded from conflict comparison and
//!   reconciled once at settlement.

pub mod adapters;
pub mod domain;
pub mod errors;
pub mod ports;

pub use adapters::MemStore;
pub use domain::batch::{OverlayBatch, SealedBatch};
pub use domain::committed::SharedOverlay;
pub use domain::entities::{CValue, DirtyState, FlushBatch, Key, ReadSet, WriteSet};
pub use domain::overlay::SnapshotOverlay;
pub use errors::StoreError;
pub use ports::{StateBackend, StateView, StateWriter};
