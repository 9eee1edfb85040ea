//! # Worker Thread Pool
//!
//! This module provides [`Pool`], a fixed-size set of OS worker threads fed
//! by an unbounded FIFO task queue, with a sharded result registry for
//! collecting the outputs of awaitable tasks.
//!
//! ## Key Concepts
//! - Submission: closures enter the queue and receive a monotonically
//!   increasing [`TaskId`]; the sentinel [`TaskId::NONE`] signals rejection
//! - Waiting: [`Pool::wait`] blocks until the matching result is published
//!   or the pool is torn down
//! - Shutdown: [`Pool::join`] drains the queue and joins every worker;
//!   [`Pool::destroy`] additionally releases blocked waiters
//!
//! ## Lock Discipline
//! The queue and the registry each have their own mutex/condvar pair. No
//! thread ever holds both, and no task executes while either is held.

mod config;
mod error;
mod queue;
mod registry;
mod task;
mod worker;

pub use config::PoolConfig;
pub use error::PoolError;
pub use task::{TaskId, TaskOutput, Thunk};

use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use tracing::{error, info, warn};

use queue::TaskQueue;
use registry::ResultRegistry;
use worker::{Worker, WorkerStatus};

/// Lifecycle status of a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolStatus {
    /// Accepting submissions and executing tasks
    Running,

    /// No longer accepting; workers are draining or have drained the queue
    Draining,

    /// Torn down; waiters released, no results added or read
    Terminated,
}

/// Snapshot of pool state for monitoring.
#[derive(Debug, Clone)]
pub struct PoolMetrics {
    /// Number of worker threads started
    pub pool_size: usize,

    /// Tasks queued but not yet picked up
    pub queue_length: usize,

    /// Published results not yet consumed by a wait
    pub pending_results: usize,

    /// Workers currently executing a task
    pub active_workers: usize,

    /// Current lifecycle status
    pub status: PoolStatus,
}

/// A fixed-size worker thread pool with awaitable task results.
///
/// Tasks are opaque closures; the pool never inspects the closure or its
/// output. Submission order is dispatch order (strict FIFO per worker
/// availability). There is no cancellation: once queued, a task always runs
/// to completion, and shutdown waits for in-flight work.
///
/// # Lifecycle
/// ```text
/// new -> submit*/wait* -> join -> destroy
/// ```
/// `join` is idempotent and implied by `destroy`; `destroy` is implied by
/// `Drop`, so a pool can never leak threads. After `join`, submissions are
/// rejected with [`TaskId::NONE`] but already-queued tasks still run. After
/// `destroy`, [`Pool::wait`] returns `None`.
#[derive(Debug)]
pub struct Pool {
    /// Number of workers actually started
    pool_size: usize,

    queue: Arc<TaskQueue>,
    registry: Arc<ResultRegistry>,

    /// Join handles, taken by the first call to `join`
    workers: Mutex<Vec<JoinHandle<()>>>,

    /// Per-worker status words for metrics
    worker_statuses: Vec<Arc<AtomicUsize>>,
}

impl Pool {
    /// Creates a pool and starts its worker threads.
    ///
    /// Fails with [`PoolError::InvalidPoolSize`] when `config.pool_size` is
    /// zero, and with [`PoolError::SpawnFailed`] when no worker thread at
    /// all could be started — in that case everything is rolled back and no
    /// pool is returned. Starting fewer threads than requested (but at
    /// least one) yields a degraded-but-usable pool and logs a warning.
    pub fn new(config: PoolConfig) -> Result<Pool, PoolError> {
        if config.pool_size < 1 {
            return Err(PoolError::InvalidPoolSize {
                requested: config.pool_size,
            });
        }

        let queue = Arc::new(TaskQueue::new());
        let registry = Arc::new(ResultRegistry::new(config.pool_size));

        let mut handles = Vec::with_capacity(config.pool_size);
        let mut statuses = Vec::with_capacity(config.pool_size);
        let mut spawn_err = None;

        for worker_id in 0..config.pool_size {
            let worker = Worker::new(worker_id, Arc::clone(&queue), Arc::clone(&registry));
            let status = worker.status_handle();
            match worker.spawn(&config.thread_name_prefix) {
                Ok(handle) => {
                    handles.push(handle);
                    statuses.push(status);
                }
                Err(e) => {
                    spawn_err = Some(e);
                    break;
                }
            }
        }

        if handles.is_empty() {
            // Roll back: no thread started, so closing the shared state is
            // all the cleanup there is.
            queue.close();
            registry.tear_down();
            let e = spawn_err.expect("no handles implies a spawn error");
            return Err(PoolError::SpawnFailed(e));
        }

        if let Some(e) = spawn_err {
            warn!(
                started = handles.len(),
                requested = config.pool_size,
                error = %e,
                "started fewer worker threads than requested"
            );
        }

        let pool_size = handles.len();
        info!(pool_size, "thread pool started");

        Ok(Pool {
            pool_size,
            queue,
            registry,
            workers: Mutex::new(handles),
            worker_statuses: statuses,
        })
    }

    /// Creates a pool with `pool_size` workers and default configuration.
    pub fn with_threads(pool_size: usize) -> Result<Pool, PoolError> {
        Pool::new(PoolConfig::with_pool_size(pool_size))
    }

    /// Submits a closure for execution and returns its id.
    ///
    /// Safe to call concurrently from any number of threads. When
    /// `awaitable` is true the closure's output is published for a later
    /// [`wait`](Pool::wait); otherwise it is dropped after execution.
    ///
    /// Returns [`TaskId::NONE`] when the pool no longer accepts work (after
    /// [`join`](Pool::join) or [`destroy`](Pool::destroy)); the queue is
    /// untouched in that case. Callers must check for the sentinel before
    /// waiting on the id.
    pub fn submit<F, R>(&self, f: F, awaitable: bool) -> TaskId
    where
        F: FnOnce() -> R + Send + 'static,
        R: Any + Send + 'static,
    {
        let thunk: Thunk = Box::new(move || Box::new(f()) as TaskOutput);
        self.queue.enqueue(thunk, awaitable)
    }

    /// Blocks until the result for `id` is available and consumes it.
    ///
    /// Returns `None` when the pool is torn down before (or while) the
    /// result could be observed. Each published result is returned exactly
    /// once; a second wait on the same id behaves like a wait on an unknown
    /// id.
    ///
    /// # Hazard
    /// Waiting on a non-awaitable id, on [`TaskId::NONE`], or on an id that
    /// was never submitted blocks until [`destroy`](Pool::destroy). The
    /// pool does not detect this caller error.
    pub fn wait(&self, id: TaskId) -> Option<TaskOutput> {
        self.registry.take(id)
    }

    /// Stops accepting submissions, then blocks until every worker has
    /// drained the queue and exited. Idempotent: a second call finds no
    /// handles left and returns immediately.
    pub fn join(&self) {
        self.queue.close();

        let handles = {
            let mut workers = self.workers.lock().unwrap();
            std::mem::take(&mut *workers)
        };
        for handle in handles {
            if let Err(e) = handle.join() {
                // Workers catch task panics; reaching this means the worker
                // itself died (e.g. a poisoned lock).
                error!(?e, "worker thread panicked");
            }
        }
    }

    /// Shuts the pool down: joins all workers, then tears down the result
    /// registry, releasing any thread still blocked in [`wait`](Pool::wait)
    /// with `None`. Idempotent; also run by `Drop`.
    ///
    /// This must be the last operation on the pool. Submissions after
    /// `destroy` return [`TaskId::NONE`] and waits return `None`.
    pub fn destroy(&self) {
        self.join();
        if !self.registry.is_torn_down() {
            self.registry.tear_down();
            info!("thread pool destroyed");
        }
    }

    /// Number of worker threads started.
    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Current lifecycle status.
    pub fn status(&self) -> PoolStatus {
        if self.registry.is_torn_down() {
            PoolStatus::Terminated
        } else if !self.queue.is_accepting() {
            PoolStatus::Draining
        } else {
            PoolStatus::Running
        }
    }

    /// Snapshot of pool state.
    pub fn metrics(&self) -> PoolMetrics {
        let active_workers = self
            .worker_statuses
            .iter()
            .filter(|s| s.load(Ordering::Relaxed) == WorkerStatus::Running as usize)
            .count();
        PoolMetrics {
            pool_size: self.pool_size,
            queue_length: self.queue.len(),
            pending_results: self.registry.pending(),
            active_workers,
            status: self.status(),
        }
    }
}

impl Drop for Pool {
    fn drop(&mut self) {
        self.destroy();
    }
}
