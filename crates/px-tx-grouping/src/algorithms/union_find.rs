//! Union-find over account addresses.

use std::collections::HashMap;

use shared_types::Address;

/// Disjoint sets of addresses with path compression.
///
/// One instance per block execution. Addresses are registered lazily on
/// first use.
#[derive(Default)]
pub struct AddressSet {
    parent: HashMap<Address, Address>,
}

impl AddressSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Representative of `x`'s set, compressing the walked path.
    pub fn find(&mut self, x: Address) -> Address {
        let mut root = x;
        while let Some(&p) = self.parent.get(&root) {
            if p == root {
                break;
            }
            root = p;
        }
        if !self.parent.contains_key(&root) {
            self.parent.insert(root, root);
        }
        // compress
        let mut cur = x;
        while cur != root {
            let next = self.parent[&cur];
            self.parent.insert(cur, root);
            cur = next;
        }
        root
    }

    /// Join the sender's set with the recipient's, if any. Registers both
    /// parties.
    pub fn union(&mut self, sender: Address, recipient: Option<Address>) {
        let fx = self.find(sender);
        let Some(recipient) = recipient else {
            return;
        };
        let fy = self.find(recipient);
        if fx != fy {
            self.parent.insert(fy, fx);
        }
    }
}
