//! Per-transaction delivery responses.
//!
//! One `DeliverResult` is produced per input transaction, positionally
//! aligned with the block's transaction list regardless of the order in
//! which execution actually completed.

use serde::{Deserialize, Serialize};

use crate::primitives::{Address, Gas, Hash};

/// Response codes. `0` is success; everything else is an error class.
pub mod code {
    pub const OK: u32 = 0;
    /// Payload could not be decoded into a transaction.
    pub const DECODE_ERROR: u32 = 1;
    /// Pre-execution validation (ante check) failed.
    pub const VALIDATION_ERROR: u32 = 2;
    /// Execution itself failed.
    pub const EXEC_ERROR: u32 = 3;
}

/// A single log/event record emitted by a transaction.
///
/// `index` and `tx_index` are assigned during settlement: asynchronous
/// completion order does not match the deterministic position each record
/// must carry in the block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub address: Address,
    pub topics: Vec<Hash>,
    pub data: Vec<u8>,
    /// Block-wide log index, assigned at settlement.
    pub index: u64,
    /// Position among the block's result-producing transactions, assigned at
    /// settlement.
    pub tx_index: u64,
}

/// Delivery response for one transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliverResult {
    pub code: u32,
    pub data: Vec<u8>,
    pub log: String,
    pub gas_wanted: Gas,
    pub gas_used: Gas,
}

impl DeliverResult {
    pub fn ok(data: Vec<u8>, log: String, gas_wanted: Gas, gas_used: Gas) -> Self {
        Self {
            code: code::OK,
            data,
            log,
            gas_wanted,
            gas_used,
        }
    }

    /// Error response. Carries the gas bookkeeping the failed attempt
    /// reported (zero for decode/validation failures).
    pub fn error(code: u32, log: impl Into<String>, gas_wanted: Gas, gas_used: Gas) -> Self {
        Self {
            code,
            data: Vec::new(),
            log: log.into(),
            gas_wanted,
            gas_used,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.code == code::OK
    }
}
