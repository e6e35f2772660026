//! Fixed worker pool pulling tasks from a shared channel.

use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use tracing::trace;

use px_snapshot_store::OverlayBatch;
use shared_types::{code, DeliverResult, Gas};

use crate::domain::entities::{ExecContext, ExecutionAttempt, TxMeta};
use crate::domain::errors::ExecError;
use crate::ports::TxExecutor;
use crate::scheduler::BlockState;

/// One unit of scheduled work: run attempt `attempt_seq` of task `index`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Task {
    pub index: usize,
    pub attempt_seq: u64,
}

/// Read-only execution environment shared by all workers for one block.
pub(crate) struct ExecEnv<Tx> {
    pub metas: Vec<TxMeta<Tx>>,
    pub executor: Arc<dyn TxExecutor<Tx>>,
    pub state: Arc<BlockState>,
    pub block_height: u64,
    pub gas_ceiling: Gas,
}

/// Run one attempt of one task against a fresh private overlay.
///
/// Used both by workers (speculative attempts) and by the merge loop (the
/// synchronous fallback re-execution, which runs against the committed
/// overlay by construction since every predecessor is already merged).
pub(crate) fn execute_task<Tx>(
    env: &ExecEnv<Tx>,
    task: Task,
    is_rerun: bool,
) -> ExecutionAttempt {
    let (base, base_watermark) = env.state.base_view(task.index);
    let meta = &env.metas[task.index];

    let Some(tx) = meta.tx.as_ref() else {
        let log = meta
            .decode_err
            .clone()
            .unwrap_or_else(|| "undecodable payload".to_string());
        return ExecutionAttempt {
            index: task.index,
            attempt_seq: task.attempt_seq,
            response: DeliverResult::error(code::DECODE_ERROR, log, 0, 0),
            outcome: None,
            ante_err: None,
            sealed: None,
            base_watermark,
        };
    };

    let mut overlay = OverlayBatch::new(base);
    let ctx = ExecContext {
        block_height: env.block_height,
        gas_ceiling: env.gas_ceiling,
        tx_index: task.index,
        is_rerun,
    };
    trace!(
        index = task.index,
        attempt = task.attempt_seq,
        rerun = is_rerun,
        watermark = base_watermark,
        "executing task"
    );

    match env.executor.execute(&ctx, tx, &mut overlay) {
        Ok(outcome) => ExecutionAttempt {
            index: task.index,
            attempt_seq: task.attempt_seq,
            response: DeliverResult::ok(
                outcome.data.clone(),
                outcome.log.clone(),
                outcome.gas_wanted,
                outcome.gas_used,
            ),
            outcome: Some(outcome),
            ante_err: None,
            sealed: Some(Arc::new(overlay.seal())),
            base_watermark,
        },
        Err(ExecError::Validation(reason)) => ExecutionAttempt {
            index: task.index,
            attempt_seq: task.attempt_seq,
            response: DeliverResult::error(code::VALIDATION_ERROR, reason.clone(), 0, 0),
            outcome: None,
            ante_err: Some(reason),
            sealed: None,
            base_watermark,
        },
        Err(ExecError::Failed {
            reason,
            gas_wanted,
            gas_used,
        }) => ExecutionAttempt {
            index: task.index,
            attempt_seq: task.attempt_seq,
            response: DeliverResult::error(code::EXEC_ERROR, reason, gas_wanted, gas_used),
            outcome: None,
            ante_err: None,
            sealed: None,
            base_watermark,
        },
    }
}

/// Fixed pool of executor threads. Workers exit when the task channel
/// closes; results for which no receiver remains are dropped.
pub(crate) struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn spawn<Tx: Send + Sync + 'static>(
        count: usize,
        task_rx: Receiver<Task>,
        result_tx: Sender<ExecutionAttempt>,
        env: Arc<ExecEnv<Tx>>,
    ) -> Self {
        let task_rx = Arc::new(Mutex::new(task_rx));
        let handles = (0..count)
            .map(|_| {
                let task_rx = Arc::clone(&task_rx);
                let result_tx = result_tx.clone();
                let env = Arc::clone(&env);
                thread::spawn(move || loop {
                    // Take the receiver lock only for the recv itself so
                    // other workers can pull while this one executes.
                    let next = {
                        let rx = task_rx.lock().unwrap_or_else(PoisonError::into_inner);
                        rx.recv()
                    };
                    let Ok(task) = next else {
                        break;
                    };
                    let attempt = execute_task(&env, task, false);
                    if result_tx.send(attempt).is_err() {
                        break;
                    }
                })
            })
            .collect();
        Self { handles }
    }

    pub fn join(self) {
        for handle in self.handles {
            // A worker panic already surfaced through the poisoned result
            // path; nothing more to do with it here.
            let _ = handle.join();
        }
    }
}
