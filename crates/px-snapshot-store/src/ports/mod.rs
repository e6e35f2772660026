//! Port traits for state access.

use shared_types::StoreKey;

use crate::domain::entities::FlushBatch;
use crate::errors::StoreError;

/// Read-only view over multi-namespace state. The block's base snapshot and
/// every frozen speculative view implement this, so overlays can stack.
pub trait StateView: Send + Sync {
    fn get(&self, ns: StoreKey, key: &[u8]) -> Option<Vec<u8>>;
}

/// Mutable sink used when an overlay flushes its write set downward.
pub trait StateWriter {
    fn set(&mut self, ns: StoreKey, key: Vec<u8>, value: Vec<u8>);
    fn delete(&mut self, ns: StoreKey, key: &[u8]);
}

/// Durable store the committed block overlay is flushed into once the whole
/// batch has settled. Flush failure is fatal for the block.
pub trait StateBackend: StateView {
    fn apply(&self, batch: FlushBatch) -> Result<(), StoreError>;
}
