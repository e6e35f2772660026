//! Single-namespace copy-on-write overlay.

use std::sync::Arc;

use shared_types::StoreKey;

use crate::domain::entities::{CValue, ReadSet, WriteSet};
use crate::ports::{StateView, StateWriter};

/// Overlay over one named key space.
///
/// Reads fall through to the parent view and are recorded in the read set;
/// writes and deletes stay local until explicitly flushed. The read set holds
/// the value observed on first fall-through, which is what conflict
/// validation later compares against the committed dirty set.
pub struct SnapshotOverlay {
    ns: StoreKey,
    parent: Arc<dyn StateView>,
    reads: ReadSet,
    writes: WriteSet,
}

impl SnapshotOverlay {
    pub fn new(ns: StoreKey, parent: Arc<dyn StateView>) -> Self {
        Self {
            ns,
            parent,
            reads: ReadSet::new(),
            writes: WriteSet::new(),
        }
    }

    pub fn ns(&self) -> StoreKey {
        self.ns
    }

    /// Read a key: locally dirty value if present, otherwise the parent's.
    /// Only parent reads enter the read set.
    pub fn get(&mut self, key: &[u8]) -> Option<Vec<u8>> {
        if let Some(cv) = self.writes.get(key) {
            return cv.current().cloned();
        }
        let value = self.parent.get(self.ns, key);
        self.reads
            .entry(key.to_vec())
            .or_insert_with(|| value.clone());
        value
    }

    pub fn set(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.writes.insert(key, CValue::set(value));
    }

    pub fn delete(&mut self, key: &[u8]) {
        self.writes.insert(key.to_vec(), CValue::tombstone());
    }

    /// Flush the local write set into `sink` in ascending key order.
    /// Deterministic flush order is a reproducibility requirement, not an
    /// optimization.
    pub fn write(&self, sink: &mut dyn StateWriter) {
        for (key, cv) in &self.writes {
            if cv.deleted {
                sink.delete(self.ns, key);
            } else if let Some(value) = &cv.value {
                sink.set(self.ns, key.clone(), value.clone());
            }
        }
    }

    pub fn reads(&self) -> &ReadSet {
        &self.reads
    }

    pub fn writes(&self) -> &WriteSet {
        &self.writes
    }

    pub(crate) fn into_parts(self) -> (ReadSet, WriteSet) {
        (self.reads, self.writes)
    }
}
