//! Multi-namespace overlay batch.

use std::collections::BTreeMap;
use std::sync::Arc;

use shared_types::StoreKey;

use crate::domain::entities::{DirtyState, ReadSet, WriteSet};
use crate::domain::overlay::SnapshotOverlay;
use crate::ports::{StateView, StateWriter};

/// Groups one [`SnapshotOverlay`] per named key space under a single logical
/// batch. This is the private state a worker executes a transaction against:
/// nothing escapes until the merge loop commits the sealed result.
pub struct OverlayBatch {
    parent: Arc<dyn StateView>,
    overlays: BTreeMap<StoreKey, SnapshotOverlay>,
}

impl OverlayBatch {
    pub fn new(parent: Arc<dyn StateView>) -> Self {
        Self {
            parent,
            overlays: BTreeMap::new(),
        }
    }

    fn overlay(&mut self, ns: StoreKey) -> &mut SnapshotOverlay {
        let parent = Arc::clone(&self.parent);
        self.overlays
            .entry(ns)
            .or_insert_with(|| SnapshotOverlay::new(ns, parent))
    }

    pub fn get(&mut self, ns: StoreKey, key: &[u8]) -> Option<Vec<u8>> {
        self.overlay(ns).get(key)
    }

    pub fn set(&mut self, ns: StoreKey, key: Vec<u8>, value: Vec<u8>) {
        self.overlay(ns).set(key, value);
    }

    pub fn delete(&mut self, ns: StoreKey, key: &[u8]) {
        self.overlay(ns).delete(key);
    }

    /// Flush every namespace's write set into `sink`, namespaces in name
    /// order, keys ascending within each.
    pub fn write(&self, sink: &mut dyn StateWriter) {
        for overlay in self.overlays.values() {
            overlay.write(sink);
        }
    }

    /// Seal the batch into an immutable, shareable snapshot of its effect.
    pub fn seal(self) -> SealedBatch {
        let mut reads = BTreeMap::new();
        let mut writes = BTreeMap::new();
        for (ns, overlay) in self.overlays {
            let (r, w) = overlay.into_parts();
            reads.insert(ns, r);
            writes.insert(ns, w);
        }
        SealedBatch {
            parent: self.parent,
            reads,
            writes: Arc::new(writes),
        }
    }
}

/// Immutable effect of one execution attempt: the per-namespace read and
/// write sets, still chained on the parent the attempt ran against.
///
/// Implements [`StateView`] so the next transaction in the same dependency
/// chain can speculate on top of an uncommitted predecessor. Reads through a
/// sealed batch are not recorded anywhere; the successor's own overlay does
/// its own bookkeeping.
pub struct SealedBatch {
    parent: Arc<dyn StateView>,
    reads: BTreeMap<StoreKey, ReadSet>,
    writes: Arc<BTreeMap<StoreKey, WriteSet>>,
}

impl SealedBatch {
    pub fn reads(&self) -> &BTreeMap<StoreKey, ReadSet> {
        &self.reads
    }

    pub fn writes(&self) -> &BTreeMap<StoreKey, WriteSet> {
        &self.writes
    }

    /// Validate this attempt's read set against the globally committed dirty
    /// set: any key read with a value the dirty set has since superseded is a
    /// conflict. The fee-collector balance key is skipped: every transaction
    /// touches it, and its true value is reconciled once at settlement.
    pub fn conflicts_with(&self, dirty: &DirtyState, fee_collector_key: &[u8]) -> bool {
        for (ns, read_set) in &self.reads {
            let Some(dirty_ns) = dirty.get(ns) else {
                continue;
            };
            for (key, observed) in read_set {
                if key.as_slice() == fee_collector_key {
                    continue;
                }
                if let Some(committed) = dirty_ns.get(key) {
                    if committed.current() != observed.as_ref() {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Apply this attempt's write sets to `sink` in deterministic order.
    pub fn write(&self, sink: &mut dyn StateWriter) {
        for (ns, write_set) in self.writes.iter() {
            for (key, cv) in write_set {
                if cv.deleted {
                    sink.delete(*ns, key);
                } else if let Some(value) = &cv.value {
                    sink.set(*ns, key.clone(), value.clone());
                }
            }
        }
    }
}

impl StateView for SealedBatch {
    fn get(&self, ns: StoreKey, key: &[u8]) -> Option<Vec<u8>> {
        if let Some(cv) = self.writes.get(&ns).and_then(|w| w.get(key)) {
            return cv.current().cloned();
        }
        self.parent.get(ns, key)
    }
}
