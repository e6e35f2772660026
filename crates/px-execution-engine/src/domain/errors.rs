//! Error types for the execution engine.
//!
//! Conflicts are deliberately absent: a conflict is a scheduling event, not
//! an error. Decode and validation failures are per-task and surface only
//! inside the positional response array. Only `EngineError` ever reaches the
//! block-execution caller.

use thiserror::Error;

use px_snapshot_store::StoreError;

/// Fatal, block-aborting failures.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A scheduler channel disconnected before the batch completed. Means a
    /// worker panicked; the block cannot be trusted.
    #[error("scheduler channel disconnected before completion")]
    SchedulerDisconnected,

    /// Committed-overlay flush or lock failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The fee-collector adjustment could not be applied at settlement.
    #[error("fee collector update failed: {0}")]
    FeeCollector(String),

    /// Rejected configuration.
    #[error("invalid engine config: {0}")]
    InvalidConfig(String),
}

/// Payload could not be decoded into an executable transaction.
#[derive(Debug, Error)]
#[error("decode failed: {0}")]
pub struct DecodeError(pub String);

/// Per-task execution failure reported by the executor collaborator.
#[derive(Debug, Error)]
pub enum ExecError {
    /// Pre-execution validation (ante check) failed: recorded on the task,
    /// consumes no gas, contributes no state, excluded from fee settlement.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Execution failed after validation passed: the error response carries
    /// the reported gas, the fee still settles, no state is committed.
    #[error("execution failed: {reason}")]
    Failed {
        reason: String,
        gas_wanted: u64,
        gas_used: u64,
    },
}

/// Failure applying the net fee adjustment. Escalated to
/// [`EngineError::FeeCollector`].
#[derive(Debug, Error)]
#[error("{0}")]
pub struct FeeUpdateError(pub String);
