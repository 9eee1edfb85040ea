use std::fmt;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use tracing::{debug, error};

use super::queue::TaskQueue;
use super::registry::ResultRegistry;

/// Status codes for worker state, published through an atomic word so the
/// pool can report them in metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerStatus {
    /// Worker is idle or blocked waiting for work
    Idle = 0,

    /// Worker is executing a task
    Running = 1,

    /// Worker has drained the queue and returned
    Exited = 2,
}

/// # Worker Thread Implementation
///
/// One worker runs per pool thread. Each worker loops over the shared task
/// queue, executes tasks outside any lock, and publishes outputs of
/// awaitable tasks into the result registry.
///
/// ## Loop States
/// 1. Idle: blocked on the queue's condition variable (queue empty, pool
///    accepting)
/// 2. Running: task popped, queue lock released, thunk executing — a slow or
///    blocking task can never stall submission or other workers' dequeues
/// 3. Publishing: awaitable output inserted into the registry, waiters woken
/// 4. Exited: queue empty and pool no longer accepting, thread returns
///
/// ## Panic Isolation
/// The thunk runs under `catch_unwind`; a panicking task is logged and
/// discarded, and the worker keeps draining the queue. The panicked task
/// publishes nothing, so a wait on its id resolves only at teardown.
pub(crate) struct Worker {
    /// Index within the pool, used for the thread name
    id: usize,

    queue: Arc<TaskQueue>,
    registry: Arc<ResultRegistry>,

    /// Current worker status, shared with the pool for metrics
    status: Arc<AtomicUsize>,
}

impl fmt::Debug for Worker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Worker")
            .field("id", &self.id)
            .field("status", &self.status.load(Ordering::Relaxed))
            .finish()
    }
}

impl Worker {
    pub fn new(id: usize, queue: Arc<TaskQueue>, registry: Arc<ResultRegistry>) -> Self {
        Self {
            id,
            queue,
            registry,
            status: Arc::new(AtomicUsize::new(WorkerStatus::Idle as usize)),
        }
    }

    /// Shared handle to this worker's status word.
    pub fn status_handle(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.status)
    }

    /// Starts the worker's OS thread.
    pub fn spawn(self, name_prefix: &str) -> io::Result<JoinHandle<()>> {
        std::thread::Builder::new()
            .name(format!("{}-{}", name_prefix, self.id))
            .spawn(move || self.run_loop())
    }

    /// Main worker loop: dequeue, execute, publish, repeat until the queue
    /// reports no more work.
    fn run_loop(self) {
        debug!(worker = self.id, "worker started");

        while let Some(task) = self.queue.dequeue() {
            self.status
                .store(WorkerStatus::Running as usize, Ordering::Relaxed);

            let task_id = task.id;
            let awaitable = task.awaitable;
            let thunk = task.thunk;

            match panic::catch_unwind(AssertUnwindSafe(thunk)) {
                Ok(output) => {
                    if awaitable {
                        self.registry.publish(task_id, output);
                    }
                    // Non-awaitable outputs are dropped here, keeping the
                    // registry from growing for fire-and-forget work.
                }
                Err(payload) => {
                    let msg = if let Some(s) = payload.downcast_ref::<String>() {
                        s.clone()
                    } else if let Some(s) = payload.downcast_ref::<&str>() {
                        s.to_string()
                    } else {
                        "unknown panic".to_string()
                    };
                    error!(worker = self.id, task = %task_id, panic = %msg, "task panicked");
                }
            }

            self.status
                .store(WorkerStatus::Idle as usize, Ordering::Relaxed);
        }

        self.status
            .store(WorkerStatus::Exited as usize, Ordering::Relaxed);
        debug!(worker = self.id, "worker exiting");
    }
}
