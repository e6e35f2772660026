//! The block's committed overlay.

use std::sync::{Arc, RwLock};

use shared_types::StoreKey;

use crate::domain::batch::SealedBatch;
use crate::domain::entities::{CValue, DirtyState, FlushBatch};
use crate::errors::StoreError;
use crate::ports::{StateBackend, StateView, StateWriter};

/// Base snapshot plus the globally accumulated dirty set.
///
/// Shared read-only by every worker; mutated only by the merge loop
/// (single-writer discipline). The dirty set doubles as the conflict
/// reference: it holds, per key, the last value committed this block.
pub struct SharedOverlay {
    base: Arc<dyn StateView>,
    dirty: RwLock<DirtyState>,
}

impl SharedOverlay {
    pub fn new(base: Arc<dyn StateView>) -> Self {
        Self {
            base,
            dirty: RwLock::new(DirtyState::new()),
        }
    }

    /// Validate a sealed attempt against the committed dirty set.
    pub fn conflicts(&self, sealed: &SealedBatch, fee_collector_key: &[u8]) -> bool {
        match self.dirty.read() {
            Ok(dirty) => sealed.conflicts_with(&dirty, fee_collector_key),
            // A poisoned lock means a worker panicked mid-read; treat the
            // attempt as conflicting rather than trust it.
            Err(_) => true,
        }
    }

    /// Merge a committed attempt's write sets into the dirty set, ascending
    /// key order per namespace.
    pub fn merge(&self, sealed: &SealedBatch) -> Result<(), StoreError> {
        let mut dirty = self.dirty.write().map_err(|_| StoreError::LockPoisoned)?;
        for (ns, write_set) in sealed.writes() {
            let dirty_ns = dirty.entry(*ns).or_default();
            for (key, cv) in write_set {
                dirty_ns.insert(key.clone(), cv.clone());
            }
        }
        Ok(())
    }

    /// Drain the dirty set into an ordered flush batch for the durable
    /// backend.
    pub fn flush_batch(&self) -> Result<FlushBatch, StoreError> {
        let dirty = self.dirty.read().map_err(|_| StoreError::LockPoisoned)?;
        let mut ops = Vec::new();
        for (ns, entries) in dirty.iter() {
            for (key, cv) in entries {
                if cv.deleted {
                    ops.push((*ns, key.clone(), None));
                } else if let Some(value) = &cv.value {
                    ops.push((*ns, key.clone(), Some(value.clone())));
                }
            }
        }
        Ok(FlushBatch { ops })
    }

    /// Flush the committed overlay into the backend. Fatal on error.
    pub fn flush_into(&self, backend: &dyn StateBackend) -> Result<(), StoreError> {
        backend.apply(self.flush_batch()?)
    }
}

impl StateView for SharedOverlay {
    fn get(&self, ns: StoreKey, key: &[u8]) -> Option<Vec<u8>> {
        if let Ok(dirty) = self.dirty.read() {
            if let Some(cv) = dirty.get(&ns).and_then(|d| d.get(key)) {
                return cv.current().cloned();
            }
        }
        self.base.get(ns, key)
    }
}

impl StateWriter for &SharedOverlay {
    fn set(&mut self, ns: StoreKey, key: Vec<u8>, value: Vec<u8>) {
        if let Ok(mut dirty) = self.dirty.write() {
            dirty.entry(ns).or_default().insert(key, CValue::set(value));
        }
    }

    fn delete(&mut self, ns: StoreKey, key: &[u8]) {
        if let Ok(mut dirty) = self.dirty.write() {
            dirty
                .entry(ns)
                .or_default()
                .insert(key.to_vec(), CValue::tombstone());
        }
    }
}
