//! Execution attempts, task slots, and block-level outputs.

use std::sync::Arc;

use shared_types::{Bloom, DeliverResult, Fee, Gas, LogRecord, TxParties};

use px_snapshot_store::SealedBatch;

use crate::stats::BlockStats;

/// Context handed to the executor collaborator for one attempt.
#[derive(Clone, Debug)]
pub struct ExecContext {
    pub block_height: u64,
    pub gas_ceiling: Gas,
    pub tx_index: usize,
    /// True for the synchronous fallback re-execution after a conflict.
    pub is_rerun: bool,
}

/// Successful execution product for one transaction.
#[derive(Clone, Debug, Default)]
pub struct ExecOutcome {
    pub gas_wanted: Gas,
    pub gas_used: Gas,
    pub log: String,
    pub data: Vec<u8>,
    /// Log records; `index`/`tx_index` are re-derived at settlement.
    pub logs: Vec<LogRecord>,
    pub bloom: Bloom,
    /// Unused fee returned to the payer; subtracted at fee reconciliation.
    pub refund_fee: Fee,
}

/// Pre-analysis product per task: decoded transaction plus grouping and fee
/// metadata. Extracted once, before scheduling, in parallel.
pub struct TxMeta<Tx> {
    /// `None` when decoding failed.
    pub tx: Option<Tx>,
    pub decode_err: Option<String>,
    pub fee: Fee,
    pub is_transfer: bool,
    pub parties: Option<TxParties>,
}

/// One speculative (or fallback) execution of one task.
///
/// `sealed` is the immutable effect of the attempt; `None` means the attempt
/// produced no usable overlay (decode/validation/execution failure) and is
/// always treated as conflicting; a broken attempt must never be silently
/// committed.
pub struct ExecutionAttempt {
    pub index: usize,
    pub attempt_seq: u64,
    pub response: DeliverResult,
    pub outcome: Option<ExecOutcome>,
    pub ante_err: Option<String>,
    pub sealed: Option<Arc<SealedBatch>>,
    /// Commit watermark observed when the attempt's base was chosen, or the
    /// chain predecessor's index when speculating on an uncommitted result.
    pub base_watermark: i64,
}

/// Scheduling state of one task. A result whose attempt sequence does not
/// match the slot's live attempt is stale and is discarded on arrival.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskState {
    /// No attempt in flight.
    Idle,
    /// An attempt is executing on a worker (or was just enqueued).
    Running { attempt: u64 },
    /// The in-flight attempt was invalidated before completion; its result
    /// will be discarded and the task re-enqueued fresh.
    Doomed { attempt: u64 },
}

/// Mutable per-task bookkeeping, created at grouping and discarded after
/// settlement.
#[derive(Clone, Debug)]
pub struct TaskSlot {
    pub state: TaskState,
    pub rerun: bool,
    pub is_transfer: bool,
    /// Position among the block's transfer-shaped transactions.
    pub transfer_index: u32,
    pub fee: Fee,
    /// Copied from the committed attempt's outcome.
    pub refund_fee: Fee,
    /// Validation failure of the committed attempt, if any.
    pub ante_err: Option<String>,
}

impl TaskSlot {
    pub fn new(is_transfer: bool, transfer_index: u32, fee: Fee) -> Self {
        Self {
            state: TaskState::Idle,
            rerun: false,
            is_transfer,
            transfer_index,
            fee,
            refund_fee: 0,
            ante_err: None,
        }
    }
}

/// Result of executing one whole block.
#[derive(Clone, Debug)]
pub struct BlockOutput {
    /// One response per input payload, positionally aligned.
    pub responses: Vec<DeliverResult>,
    /// OR-aggregate of the blooms of every result-producing transaction.
    pub bloom: Bloom,
    pub stats: BlockStats,
}

impl BlockOutput {
    pub fn empty() -> Self {
        Self {
            responses: Vec::new(),
            bloom: Bloom::zero(),
            stats: BlockStats::default(),
        }
    }
}
