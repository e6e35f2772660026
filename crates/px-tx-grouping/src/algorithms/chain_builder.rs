//! Builds the per-block group plan.

use std::collections::HashMap;

use shared_types::{Address, TxParties};

use crate::algorithms::union_find::AddressSet;
use crate::domain::entities::GroupPlan;

/// Partition a batch into dependency chains.
///
/// `parties[i]` is the sender/recipient pair extracted from task `i`, or
/// `None` when the task is not value-transfer-shaped (or failed to decode).
/// Two passes: union every pair, then bucket indices by set representative
/// in original order and derive the pairwise chain maps.
pub fn build_group_plan(parties: &[Option<TxParties>]) -> GroupPlan {
    let mut set = AddressSet::new();
    for p in parties.iter().flatten() {
        set.union(p.sender, p.recipient);
    }

    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut root_to_group: HashMap<Address, usize> = HashMap::new();
    for (index, p) in parties.iter().enumerate() {
        let Some(p) = p else {
            continue;
        };
        let root = set.find(p.sender);
        let gid = *root_to_group.entry(root).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[gid].push(index);
    }

    let mut next_in_chain = HashMap::new();
    let mut prev_in_chain = HashMap::new();
    for group in &groups {
        for pair in group.windows(2) {
            next_in_chain.insert(pair[0], pair[1]);
            prev_in_chain.insert(pair[1], pair[0]);
        }
    }

    GroupPlan {
        groups,
        next_in_chain,
        prev_in_chain,
    }
}
