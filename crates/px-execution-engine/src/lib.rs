//! # Parallax Execution Engine
//!
//! Optimistic parallel execution of one block's transaction batch.
//!
//! Given the ordered payloads of a block, the engine produces the same final
//! state and per-transaction results as strict sequential execution, but
//! faster: independent transactions run speculatively on a worker pool, and
//! a single merge loop validates each result against the accumulated
//! write-set in original order, re-executing serially only on true data
//! conflicts.
//!
//! ## Architecture
//!
//! - **Domain** (`domain/`): execution attempts, per-task slots and state
//!   machine, contexts and outcomes
//! - **Ports** (`ports/`): the narrow interfaces to external collaborators
//!   (transaction decoding, party extraction, fee extraction, execution,
//!   fee-collector updates, log fixup)
//! - **Scheduler** (`scheduler/`): worker pool, shared block state, and the
//!   merge loop (the conflict resolver and sole committer)
//! - **Settlement** (`settlement`): one-shot fee reconciliation and
//!   deterministic log/receipt re-indexing after the batch completes
//! - **Application** (`application/`): the `BlockExecutor` facade driving a
//!   whole block end to end
//!
//! ## Ordering guarantee
//!
//! Final state and responses are equivalent to executing the batch strictly
//! left to right on the same starting state, regardless of actual completion
//! order. Within a dependency chain, a member never commits before all
//! earlier members.

pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod scheduler;
pub mod settlement;
pub mod stats;

pub use application::service::BlockExecutor;
pub use config::EngineConfig;
pub use domain::entities::{BlockOutput, ExecContext, ExecOutcome, ExecutionAttempt, TxMeta};
pub use domain::errors::{DecodeError, EngineError, ExecError, FeeUpdateError};
pub use ports::{
    FeeCollectorUpdater, FeeExtractor, LogFixer, PartyExtractor, SettledTask, TxDecoder,
    TxExecutor,
};
pub use stats::{BlockStats, ParallelStats};
