//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::domain::errors::EngineError;

/// Engine configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Fixed worker-thread count, independent of transaction count.
    pub workers: usize,
    /// State key of the fee-collector balance. Excluded from conflict
    /// detection and reconciled once at settlement.
    pub fee_collector_key: Vec<u8>,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.workers == 0 {
            return Err(EngineError::InvalidConfig("workers must be >= 1".into()));
        }
        if self.fee_collector_key.is_empty() {
            return Err(EngineError::InvalidConfig(
                "fee_collector_key must not be empty".into(),
            ));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workers: 16,
            fee_collector_key: b"fee_collector".to_vec(),
        }
    }
}
