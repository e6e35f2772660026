//! Core value types for overlays.

use std::collections::BTreeMap;

use shared_types::StoreKey;

/// Raw state key.
pub type Key = Vec<u8>;

/// A cached write: either a pending value or a pending deletion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CValue {
    pub value: Option<Vec<u8>>,
    pub deleted: bool,
}

impl CValue {
    pub fn set(value: Vec<u8>) -> Self {
        Self {
            value: Some(value),
            deleted: false,
        }
    }

    pub fn tombstone() -> Self {
        Self {
            value: None,
            deleted: true,
        }
    }

    /// The value this write makes visible: `None` once deleted.
    pub fn current(&self) -> Option<&Vec<u8>> {
        if self.deleted {
            None
        } else {
            self.value.as_ref()
        }
    }
}

/// Keys an attempt read from its parent, with the value observed at read
/// time (`None` = absent). Ordered for reproducible iteration.
pub type ReadSet = BTreeMap<Key, Option<Vec<u8>>>;

/// Keys an attempt wrote, ordered so flushes are ascending by construction.
pub type WriteSet = BTreeMap<Key, CValue>;

/// The globally accumulated last-committed values, per namespace. Extended
/// only by the merge loop.
pub type DirtyState = BTreeMap<StoreKey, BTreeMap<Key, CValue>>;

/// Ordered operations to apply to a durable backend: namespaces in name
/// order, keys ascending within each; `None` value = delete.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlushBatch {
    pub ops: Vec<(StoreKey, Key, Option<Vec<u8>>)>,
}

impl FlushBatch {
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }
}
