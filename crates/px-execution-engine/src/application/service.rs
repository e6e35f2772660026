//! The block executor facade.

use std::sync::mpsc;
use std::sync::{Arc, Mutex, PoisonError};

use rayon::prelude::*;
use tracing::info;

use px_snapshot_store::{SharedOverlay, StateBackend, StateView};
use px_tx_grouping::build_group_plan;
use shared_types::{Gas, StoreKey, TxParties};

use crate::config::EngineConfig;
use crate::domain::entities::{BlockOutput, TaskSlot, TxMeta};
use crate::domain::errors::EngineError;
use crate::ports::{
    FeeCollectorUpdater, FeeExtractor, LogFixer, PartyExtractor, TxDecoder, TxExecutor,
};
use crate::scheduler::{BlockState, ExecEnv, MergeLoop, WorkerPool};
use crate::settlement;
use crate::stats::{BlockStats, ParallelStats};

/// Read-only adapter exposing the durable backend as a plain snapshot view.
struct BaseView(Arc<dyn StateBackend>);

impl StateView for BaseView {
    fn get(&self, ns: StoreKey, key: &[u8]) -> Option<Vec<u8>> {
        self.0.get(ns, key)
    }
}

/// Executes whole blocks. One instance lives for the lifetime of the node;
/// all per-block state is created and dropped inside [`execute_block`].
///
/// [`execute_block`]: BlockExecutor::execute_block
pub struct BlockExecutor<Tx> {
    config: EngineConfig,
    decoder: Arc<dyn TxDecoder<Tx>>,
    parties: Arc<dyn PartyExtractor<Tx>>,
    fees: Arc<dyn FeeExtractor<Tx>>,
    executor: Arc<dyn TxExecutor<Tx>>,
    fee_collector: Arc<dyn FeeCollectorUpdater>,
    log_fixer: Arc<dyn LogFixer>,
    stats: Mutex<ParallelStats>,
}

impl<Tx: Send + Sync + 'static> BlockExecutor<Tx> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: EngineConfig,
        decoder: Arc<dyn TxDecoder<Tx>>,
        parties: Arc<dyn PartyExtractor<Tx>>,
        fees: Arc<dyn FeeExtractor<Tx>>,
        executor: Arc<dyn TxExecutor<Tx>>,
        fee_collector: Arc<dyn FeeCollectorUpdater>,
        log_fixer: Arc<dyn LogFixer>,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            config,
            decoder,
            parties,
            fees,
            executor,
            fee_collector,
            log_fixer,
            stats: Mutex::new(ParallelStats::default()),
        })
    }

    /// Decode and classify one payload. Failures are recorded, never fatal:
    /// the task surfaces as an error response in its original position.
    fn analyze(&self, payload: &[u8]) -> TxMeta<Tx> {
        match self.decoder.decode(payload) {
            Ok(tx) => {
                let (fee, is_transfer) = self.fees.fee(&tx);
                let parties = self.parties.parties(&tx);
                TxMeta {
                    tx: Some(tx),
                    decode_err: None,
                    fee,
                    is_transfer,
                    parties,
                }
            }
            Err(err) => TxMeta {
                tx: None,
                decode_err: Some(err.0),
                fee: 0,
                is_transfer: false,
                parties: None,
            },
        }
    }

    /// Execute one block's payloads against `backend` and flush the final
    /// state back into it. Responses are positionally aligned with the
    /// input; the result is equivalent to sequential execution.
    pub fn execute_block(
        &self,
        backend: Arc<dyn StateBackend>,
        block_height: u64,
        payloads: &[Vec<u8>],
        gas_ceiling: Gas,
    ) -> Result<BlockOutput, EngineError> {
        let n = payloads.len();
        if n == 0 {
            return Ok(BlockOutput::empty());
        }

        // Pre-analysis is embarrassingly parallel.
        let metas: Vec<TxMeta<Tx>> = payloads
            .par_iter()
            .map(|payload| self.analyze(payload))
            .collect();

        let parties: Vec<Option<TxParties>> = metas.iter().map(|m| m.parties).collect();
        let plan = build_group_plan(&parties);
        let groups = plan.group_count();

        let mut transfer_count: u32 = 0;
        let slots: Vec<TaskSlot> = metas
            .iter()
            .map(|meta| {
                let transfer_index = if meta.is_transfer {
                    let position = transfer_count;
                    transfer_count += 1;
                    position
                } else {
                    0
                };
                TaskSlot::new(meta.is_transfer, transfer_index, meta.fee)
            })
            .collect();

        let shared = Arc::new(SharedOverlay::new(Arc::new(BaseView(Arc::clone(&backend)))));
        let state = Arc::new(BlockState::new(Arc::clone(&shared), plan, slots));
        let env = Arc::new(ExecEnv {
            metas,
            executor: Arc::clone(&self.executor),
            state: Arc::clone(&state),
            block_height,
            gas_ceiling,
        });

        let (task_tx, task_rx) = mpsc::channel();
        let (result_tx, result_rx) = mpsc::channel();
        let pool = WorkerPool::spawn(self.config.workers, task_rx, result_tx, Arc::clone(&env));

        // The merge loop runs right here on the caller's thread; its return
        // closes the task channel, which drains the pool.
        let merge = MergeLoop::new(
            Arc::clone(&env),
            task_tx,
            result_rx,
            self.config.fee_collector_key.clone(),
        );
        let merged = merge.run();
        pool.join();
        let mut merged = merged?;

        // Settlement.
        let slots = state.slots_snapshot();
        let net_fee = settlement::net_fee(&slots);
        {
            let mut writer: &SharedOverlay = shared.as_ref();
            self.fee_collector
                .update(&mut writer, net_fee)
                .map_err(|e| EngineError::FeeCollector(e.0))?;
        }
        let bloom = settlement::reindex_logs(&slots, &mut merged.outcomes);
        let settled = settlement::settled_view(&slots, &merged.outcomes);
        for (response, patch) in merged
            .responses
            .iter_mut()
            .zip(self.log_fixer.fix_logs(&settled))
        {
            if !patch.is_empty() {
                response.data = patch;
            }
        }

        // Flush is fatal on failure: the block must not half-apply.
        shared.flush_into(backend.as_ref())?;

        let stats = BlockStats {
            txs: n,
            reruns: merged.reruns,
            groups,
            gas_used: merged.gas_used,
        };
        info!(
            block_height,
            txs = n,
            parallel = stats.parallel(),
            reruns = stats.reruns,
            groups,
            gas_used = stats.gas_used,
            "block executed"
        );
        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record(block_height, &stats);

        Ok(BlockOutput {
            responses: merged.responses,
            bloom,
            stats,
        })
    }

    /// Snapshot of the cumulative concurrency statistics.
    pub fn parallel_stats(&self) -> ParallelStats {
        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
