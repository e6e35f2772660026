//! Base primitives shared across the workspace.

use std::fmt;

/// Account address (20 bytes).
pub type Address = primitive_types::H160;

/// Generic 32-byte hash.
pub type Hash = primitive_types::H256;

/// Gas amount.
pub type Gas = u64;

/// Fee amount in base units.
pub type Fee = u128;

/// Identifier of a named key space inside the multi-namespace state
/// (accounts, contract storage, ...). Namespaces are declared statically by
/// the embedding node, so a `&'static str` is sufficient and keeps the type
/// `Copy`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StoreKey(pub &'static str);

impl StoreKey {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Sender/recipient pair extracted from a value-transfer-capable transaction.
/// Used only for dependency grouping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TxParties {
    pub sender: Address,
    /// Absent for contract-creation-like transactions.
    pub recipient: Option<Address>,
}

impl TxParties {
    pub fn new(sender: Address, recipient: Option<Address>) -> Self {
        Self { sender, recipient }
    }
}
