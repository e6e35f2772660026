//! Settlement pass: fee reconciliation, log re-indexing, and bloom
//! aggregation, after every task has committed.

use shared_types::{Bloom, Fee};

use crate::domain::entities::{ExecOutcome, TaskSlot};
use crate::ports::SettledTask;

/// Net block fee: per-task fee minus refunded remainder, summed over tasks
/// that passed validation. Individual fee writes were skipped from conflict
/// detection; this single figure replaces them.
pub(crate) fn net_fee(slots: &[TaskSlot]) -> Fee {
    slots
        .iter()
        .filter(|slot| slot.ante_err.is_none())
        .map(|slot| slot.fee.saturating_sub(slot.refund_fee))
        .sum()
}

/// Walk committed outcomes in original order, assigning each log record its
/// block-wide index and its owner's position among result-producing tasks.
/// Returns the OR-aggregate bloom of the block.
pub(crate) fn reindex_logs(slots: &[TaskSlot], outcomes: &mut [Option<ExecOutcome>]) -> Bloom {
    let mut block_bloom = Bloom::zero();
    let mut log_index: u64 = 0;
    let mut result_position: u64 = 0;
    for (task, slot) in slots.iter().enumerate() {
        if slot.ante_err.is_some() {
            continue;
        }
        let Some(outcome) = outcomes[task].as_mut() else {
            continue;
        };
        for record in &mut outcome.logs {
            record.index = log_index;
            record.tx_index = result_position;
            log_index += 1;
        }
        block_bloom.accrue(&outcome.bloom);
        result_position += 1;
    }
    block_bloom
}

/// Positional settled view handed to the log-fixup collaborator.
pub(crate) fn settled_view<'a>(
    slots: &'a [TaskSlot],
    outcomes: &'a [Option<ExecOutcome>],
) -> Vec<SettledTask<'a>> {
    slots
        .iter()
        .enumerate()
        .map(|(index, slot)| SettledTask {
            index,
            is_transfer: slot.is_transfer,
            transfer_index: slot.transfer_index,
            ante_err: slot.ante_err.as_deref(),
            outcome: outcomes[index].as_ref(),
        })
        .collect()
}
