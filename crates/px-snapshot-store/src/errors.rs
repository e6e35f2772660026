//! Error types for the snapshot store.

use thiserror::Error;

/// All errors that can occur in the snapshot store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The durable backend rejected a flush. Unrecoverable for the block.
    #[error("backend flush failed: {0}")]
    FlushFailed(String),

    /// A shared lock was poisoned by a panicking thread.
    #[error("state lock poisoned")]
    LockPoisoned,
}
