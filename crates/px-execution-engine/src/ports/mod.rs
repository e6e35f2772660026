//! Collaborator ports.
//!
//! The engine does not know what a transaction *means*. Transaction
//! semantics, fee policy, and receipt encoding are supplied by the embedding
//! node through these traits; the engine only schedules, validates, and
//! commits.

use shared_types::{Fee, TxParties};

use px_snapshot_store::{OverlayBatch, StateWriter};

use crate::domain::entities::{ExecContext, ExecOutcome};
use crate::domain::errors::{DecodeError, ExecError, FeeUpdateError};

/// Payload → executable transaction.
pub trait TxDecoder<Tx>: Send + Sync {
    fn decode(&self, payload: &[u8]) -> Result<Tx, DecodeError>;
}

/// Sender/recipient extraction, used only for dependency grouping.
pub trait PartyExtractor<Tx>: Send + Sync {
    fn parties(&self, tx: &Tx) -> Option<TxParties>;
}

/// Fee charged by a transaction and whether it is value-transfer-shaped
/// (transfer-shaped transactions participate in chaining and log fixup).
pub trait FeeExtractor<Tx>: Send + Sync {
    fn fee(&self, tx: &Tx) -> (Fee, bool);
}

/// Executes one transaction against a private overlay. All side effects must
/// go through `state`; nothing is visible outside until the merge loop
/// commits the sealed result.
pub trait TxExecutor<Tx>: Send + Sync {
    fn execute(
        &self,
        ctx: &ExecContext,
        tx: &Tx,
        state: &mut OverlayBatch,
    ) -> Result<ExecOutcome, ExecError>;
}

/// Applies the block's net fee adjustment to the fee-collection account,
/// writing through the committed overlay. Failure aborts the block.
pub trait FeeCollectorUpdater: Send + Sync {
    fn update(&self, state: &mut dyn StateWriter, net_fee: Fee) -> Result<(), FeeUpdateError>;
}

/// View of one settled task handed to the log-fixup collaborator, in
/// original order, after log indices have been re-derived.
pub struct SettledTask<'a> {
    pub index: usize,
    pub is_transfer: bool,
    /// Position among the block's transfer-shaped transactions.
    pub transfer_index: u32,
    pub ante_err: Option<&'a str>,
    /// `None` when the task produced no result (decode/validation failure).
    pub outcome: Option<&'a ExecOutcome>,
}

/// Re-encodes per-task response data after settlement re-indexing. Returns
/// one byte string per task, positionally aligned; an empty string leaves
/// the original response data untouched.
pub trait LogFixer: Send + Sync {
    fn fix_logs(&self, tasks: &[SettledTask<'_>]) -> Vec<Vec<u8>>;
}
