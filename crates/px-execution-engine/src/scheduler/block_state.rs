//! Shared per-block scheduling state.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use px_snapshot_store::{SharedOverlay, StateView};
use px_tx_grouping::GroupPlan;

use crate::domain::entities::{ExecutionAttempt, TaskSlot};

/// Mutable scheduling bookkeeping, guarded by one mutex.
///
/// Workers take the lock only to choose a base view; every state transition
/// is made by the merge loop. `committed_index` is the commit watermark:
/// every task at or below it is final.
pub(crate) struct Bookkeeping {
    pub slots: Vec<TaskSlot>,
    /// Buffered completion per task, cleared when consumed or invalidated.
    pub attempts: Vec<Option<ExecutionAttempt>>,
    /// Monotonic attempt sequence, shared by all tasks. A completion whose
    /// sequence does not match the slot's live attempt is stale.
    pub attempt_counter: u64,
    pub committed_index: i64,
}

/// Everything the workers and the merge loop share for one block.
pub(crate) struct BlockState {
    pub shared: Arc<SharedOverlay>,
    pub plan: GroupPlan,
    inner: Mutex<Bookkeeping>,
}

impl BlockState {
    pub fn new(shared: Arc<SharedOverlay>, plan: GroupPlan, slots: Vec<TaskSlot>) -> Self {
        let n = slots.len();
        let mut attempts = Vec::with_capacity(n);
        attempts.resize_with(n, || None);
        Self {
            shared,
            plan,
            inner: Mutex::new(Bookkeeping {
                slots,
                attempts,
                attempt_counter: 0,
                committed_index: -1,
            }),
        }
    }

    /// Lock the bookkeeping. A poisoning panic can only come from a worker
    /// holding the lock for the few reads in `base_view`; the data is still
    /// coherent, so recover the guard instead of wedging the block.
    pub fn bk(&self) -> MutexGuard<'_, Bookkeeping> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Choose the base snapshot for an attempt at `index`.
    ///
    /// If the chain predecessor has an uncommitted healthy result buffered,
    /// speculate on top of it; otherwise run against the committed overlay.
    /// Returns the view plus the watermark the choice was made under (the
    /// predecessor's index when chaining).
    pub fn base_view(&self, index: usize) -> (Arc<dyn StateView>, i64) {
        let bk = self.bk();
        if let Some(prev) = self.plan.prev_of(index) {
            if prev as i64 > bk.committed_index {
                if let Some(attempt) = bk.attempts[prev].as_ref() {
                    if attempt.ante_err.is_none() {
                        if let Some(sealed) = attempt.sealed.as_ref() {
                            return (Arc::clone(sealed) as Arc<dyn StateView>, prev as i64);
                        }
                    }
                }
            }
        }
        let watermark = bk.committed_index;
        drop(bk);
        (Arc::clone(&self.shared) as Arc<dyn StateView>, watermark)
    }

    /// Clone the slots out for the settlement pass, once scheduling is done.
    pub fn slots_snapshot(&self) -> Vec<TaskSlot> {
        self.bk().slots.clone()
    }
}
