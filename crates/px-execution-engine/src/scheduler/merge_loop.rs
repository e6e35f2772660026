//! Serial merge loop: validates, reruns, and commits attempts in original
//! transaction order.

use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;

use tracing::debug;

use shared_types::{code, DeliverResult, Gas};

use crate::domain::entities::{ExecOutcome, ExecutionAttempt, TaskState};
use crate::domain::errors::EngineError;
use crate::scheduler::{execute_task, BlockState, Bookkeeping, ExecEnv, Task};

/// Everything the merge loop accumulated for one block.
pub(crate) struct MergeOutcome {
    /// One response per task, original order.
    pub responses: Vec<DeliverResult>,
    /// Committed outcome per task; `None` for tasks that produced none.
    pub outcomes: Vec<Option<ExecOutcome>>,
    pub gas_used: Gas,
    pub reruns: usize,
}

/// Runs on the block caller's thread. Owns the task sender and the result
/// receiver; dropping it closes the task channel and drains the workers.
pub(crate) struct MergeLoop<Tx> {
    env: Arc<ExecEnv<Tx>>,
    task_tx: Sender<Task>,
    result_rx: Receiver<ExecutionAttempt>,
    fee_collector_key: Vec<u8>,
    responses: Vec<Option<DeliverResult>>,
    outcomes: Vec<Option<ExecOutcome>>,
    gas_used: Gas,
    reruns: usize,
}

impl<Tx> MergeLoop<Tx> {
    pub fn new(
        env: Arc<ExecEnv<Tx>>,
        task_tx: Sender<Task>,
        result_rx: Receiver<ExecutionAttempt>,
        fee_collector_key: Vec<u8>,
    ) -> Self {
        let n = env.metas.len();
        let mut responses = Vec::with_capacity(n);
        responses.resize_with(n, || None);
        let mut outcomes = Vec::with_capacity(n);
        outcomes.resize_with(n, || None);
        Self {
            env,
            task_tx,
            result_rx,
            fee_collector_key,
            responses,
            outcomes,
            gas_used: 0,
            reruns: 0,
        }
    }

    /// Mark a task running under a fresh attempt sequence and hand it to the
    /// pool. A send failure means the workers are gone; the next `recv`
    /// surfaces that as [`EngineError::SchedulerDisconnected`].
    fn enqueue(&self, bk: &mut Bookkeeping, index: usize) {
        bk.attempt_counter += 1;
        let attempt = bk.attempt_counter;
        bk.slots[index].state = TaskState::Running { attempt };
        let _ = self.task_tx.send(Task {
            index,
            attempt_seq: attempt,
        });
    }

    /// Seed the initial schedule: every task with no chain predecessor, which
    /// is the head of each dependency chain plus every independent singleton.
    /// Chain members behind a predecessor start once it produces a result.
    fn seed(&self, state: &BlockState) {
        let mut bk = state.bk();
        for index in 0..self.env.metas.len() {
            if state.plan.prev_of(index).is_none() {
                self.enqueue(&mut bk, index);
            }
        }
    }

    /// Invalidate every chain successor of a rerun task: their speculative
    /// bases are stale. Buffered results are dropped; in-flight attempts are
    /// doomed so their completion re-enqueues them; idle tasks restart now.
    fn invalidate_downstream(&self, bk: &mut Bookkeeping, from: usize) {
        let mut cursor = self.env.state.plan.next_of(from);
        while let Some(index) = cursor {
            bk.attempts[index] = None;
            match bk.slots[index].state {
                TaskState::Running { attempt } => {
                    debug!(index, attempt, "dooming stale in-flight speculation");
                    bk.slots[index].state = TaskState::Doomed { attempt };
                }
                TaskState::Doomed { .. } => {}
                TaskState::Idle => self.enqueue(bk, index),
            }
            cursor = self.env.state.plan.next_of(index);
        }
    }

    /// Receive completions until every task is committed, in order.
    pub fn run(mut self) -> Result<MergeOutcome, EngineError> {
        let n = self.env.metas.len();
        if n == 0 {
            return Ok(self.finish());
        }
        let state = Arc::clone(&self.env.state);
        self.seed(&state);

        loop {
            let arrived = self
                .result_rx
                .recv()
                .map_err(|_| EngineError::SchedulerDisconnected)?;
            let index = arrived.index;
            let mut bk = state.bk();

            match bk.slots[index].state {
                TaskState::Running { attempt } if attempt == arrived.attempt_seq => {
                    bk.slots[index].state = TaskState::Idle;
                }
                TaskState::Doomed { attempt } if attempt == arrived.attempt_seq => {
                    debug!(index, "doomed attempt finished, restarting fresh");
                    bk.slots[index].state = TaskState::Idle;
                    self.enqueue(&mut bk, index);
                    continue;
                }
                _ => {
                    debug!(index, seq = arrived.attempt_seq, "discarding stale attempt");
                    continue;
                }
            }
            if index as i64 <= bk.committed_index {
                continue;
            }
            bk.attempts[index] = Some(arrived);

            // The successor can now speculate on a fresher base.
            if let Some(next) = state.plan.next_of(index) {
                if bk.slots[next].state == TaskState::Idle {
                    bk.attempts[next] = None;
                    self.enqueue(&mut bk, next);
                }
            }

            if index as i64 != bk.committed_index + 1 {
                continue;
            }

            // Drain: commit consecutive buffered tasks from the watermark up.
            loop {
                let at = (bk.committed_index + 1) as usize;
                let Some(attempt) = bk.attempts[at].as_ref() else {
                    break;
                };

                let over_ceiling = self.env.gas_ceiling > 0
                    && self.gas_used + attempt.response.gas_used >= self.env.gas_ceiling;
                let conflicted = match attempt.sealed.as_ref() {
                    None => true,
                    Some(sealed) => state.shared.conflicts(sealed, &self.fee_collector_key),
                };

                if conflicted || over_ceiling {
                    if let TaskState::Running { attempt } = bk.slots[at].state {
                        // A fresher attempt is already in flight; wait for it
                        // rather than rerun a result we know is stale.
                        debug!(index = at, "conflict with rerun in flight, dooming");
                        bk.slots[at].state = TaskState::Doomed { attempt };
                        break;
                    }
                    self.reruns += 1;
                    bk.slots[at].rerun = true;
                    debug!(
                        index = at,
                        conflicted, over_ceiling, "synchronous fallback re-execution"
                    );
                    drop(bk);
                    let fresh = execute_task(
                        &self.env,
                        Task {
                            index: at,
                            attempt_seq: 0,
                        },
                        true,
                    );
                    bk = state.bk();
                    bk.attempts[at] = Some(fresh);
                    self.invalidate_downstream(&mut bk, at);
                }

                // Commit unconditionally: a fallback result ran against the
                // fully committed overlay and cannot conflict.
                let Some(attempt) = bk.attempts[at].take() else {
                    break;
                };
                bk.slots[at].ante_err = attempt.ante_err.clone();
                if let Some(outcome) = attempt.outcome.as_ref() {
                    bk.slots[at].refund_fee = outcome.refund_fee;
                }
                if let Some(sealed) = attempt.sealed.as_ref() {
                    state.shared.merge(sealed)?;
                }
                self.gas_used += attempt.response.gas_used;
                self.responses[at] = Some(attempt.response);
                self.outcomes[at] = attempt.outcome;
                bk.committed_index = at as i64;

                if at + 1 == n {
                    drop(bk);
                    return Ok(self.finish());
                }
                // Make sure the next task is on its way if nothing holds it.
                if bk.attempts[at + 1].is_none() && bk.slots[at + 1].state == TaskState::Idle {
                    self.enqueue(&mut bk, at + 1);
                }
            }
        }
    }

    fn finish(self) -> MergeOutcome {
        let responses = self
            .responses
            .into_iter()
            .map(|r| r.unwrap_or_else(|| DeliverResult::error(code::EXEC_ERROR, "missing response", 0, 0)))
            .collect();
        MergeOutcome {
            responses,
            outcomes: self.outcomes,
            gas_used: self.gas_used,
            reruns: self.reruns,
        }
    }
}
