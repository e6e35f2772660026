//! In-memory state backend for tests and reference use.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use shared_types::StoreKey;

use crate::domain::entities::{FlushBatch, Key};
use crate::errors::StoreError;
use crate::ports::{StateBackend, StateView};

/// Multi-namespace in-memory store.
pub struct MemStore {
    spaces: RwLock<HashMap<StoreKey, BTreeMap<Key, Vec<u8>>>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self {
            spaces: RwLock::new(HashMap::new()),
        }
    }

    /// Insert a value directly, bypassing flush. Test setup helper.
    pub fn seed(&self, ns: StoreKey, key: Key, value: Vec<u8>) {
        let mut spaces = self.spaces.write().expect("mem store lock");
        spaces.entry(ns).or_default().insert(key, value);
    }

    /// Ordered copy of the full contents, for whole-state equality checks.
    pub fn dump(&self) -> BTreeMap<StoreKey, BTreeMap<Key, Vec<u8>>> {
        let spaces = self.spaces.read().expect("mem store lock");
        spaces
            .iter()
            .map(|(ns, entries)| (*ns, entries.clone()))
            .collect()
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateView for MemStore {
    fn get(&self, ns: StoreKey, key: &[u8]) -> Option<Vec<u8>> {
        let spaces = self.spaces.read().ok()?;
        spaces.get(&ns)?.get(key).cloned()
    }
}

impl StateBackend for MemStore {
    fn apply(&self, batch: FlushBatch) -> Result<(), StoreError> {
        let mut spaces = self.spaces.write().map_err(|_| StoreError::LockPoisoned)?;
        for (ns, key, value) in batch.ops {
            let space = spaces.entry(ns).or_default();
            match value {
                Some(v) => {
                    space.insert(key, v);
                }
                None => {
                    space.remove(&key);
                }
            }
        }
        Ok(())
    }
}
