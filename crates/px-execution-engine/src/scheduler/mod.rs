//! Scheduling: worker pool, shared block state, and the merge loop.

pub mod block_state;
pub mod merge_loop;
pub mod worker_pool;

pub(crate) use block_state::{BlockState, Bookkeeping};
pub(crate) use merge_loop::MergeLoop;
pub(crate) use worker_pool::{execute_task, ExecEnv, Task, WorkerPool};
