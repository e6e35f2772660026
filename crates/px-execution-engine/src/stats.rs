//! Per-block and cumulative concurrency statistics.

use serde::{Deserialize, Serialize};

use shared_types::Gas;

/// Blocks below this size are too small for a meaningful parallelism rating
/// and are excluded from best/worst tracking.
const RATING_MIN_TXS: usize = 20;

/// Concurrency outcome of one executed block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockStats {
    /// Number of transactions in the block.
    pub txs: usize,
    /// Tasks that fell back to synchronous re-execution.
    pub reruns: usize,
    /// Dependency groups found at pre-analysis.
    pub groups: usize,
    pub gas_used: Gas,
}

impl BlockStats {
    /// Tasks whose speculative result was committed as-is.
    pub fn parallel(&self) -> usize {
        self.txs.saturating_sub(self.reruns)
    }
}

/// Rating of one block for the cumulative tracker.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlockRating {
    pub height: u64,
    pub txs: usize,
    pub reruns: usize,
}

impl BlockRating {
    /// Fraction of the block committed without a fallback re-execution.
    pub fn parallel_rate(&self) -> f64 {
        if self.txs == 0 {
            1.0
        } else {
            1.0 - self.reruns as f64 / self.txs as f64
        }
    }
}

/// Cumulative statistics across all blocks executed by one engine instance.
#[derive(Clone, Debug, Default)]
pub struct ParallelStats {
    pub blocks: usize,
    pub total_txs: usize,
    pub total_reruns: usize,
    best: Option<BlockRating>,
    worst: Option<BlockRating>,
}

impl ParallelStats {
    pub fn record(&mut self, height: u64, stats: &BlockStats) {
        self.blocks += 1;
        self.total_txs += stats.txs;
        self.total_reruns += stats.reruns;
        if stats.txs < RATING_MIN_TXS {
            return;
        }
        let rating = BlockRating {
            height,
            txs: stats.txs,
            reruns: stats.reruns,
        };
        match self.best {
            Some(best) if best.parallel_rate() >= rating.parallel_rate() => {}
            _ => self.best = Some(rating),
        }
        match self.worst {
            Some(worst) if worst.parallel_rate() <= rating.parallel_rate() => {}
            _ => self.worst = Some(rating),
        }
    }

    pub fn best(&self) -> Option<BlockRating> {
        self.best
    }

    pub fn worst(&self) -> Option<BlockRating> {
        self.worst
    }
}
