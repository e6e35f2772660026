//! Group plan derived from one block's transactions.

use std::collections::HashMap;

/// Dependency chains for one block.
///
/// `groups` holds chains in first-seen order, members in original
/// transaction order. Tasks without resolvable parties appear in no group
/// and no chain map: they are scheduled as independent singletons.
#[derive(Clone, Debug, Default)]
pub struct GroupPlan {
    pub groups: Vec<Vec<usize>>,
    pub next_in_chain: HashMap<usize, usize>,
    pub prev_in_chain: HashMap<usize, usize>,
}

impl GroupPlan {
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// First member of every chain; these are seeded into the scheduler
    /// immediately.
    pub fn chain_heads(&self) -> impl Iterator<Item = usize> + '_ {
        self.groups.iter().filter_map(|g| g.first().copied())
    }

    pub fn next_of(&self, index: usize) -> Option<usize> {
        self.next_in_chain.get(&index).copied()
    }

    pub fn prev_of(&self, index: usize) -> Option<usize> {
        self.prev_in_chain.get(&index).copied()
    }
}
