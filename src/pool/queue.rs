use std::collections::VecDeque;
use std::fmt;
use std::sync::{Condvar, Mutex};

use super::task::{Task, TaskId, Thunk};

/// State guarded by the queue mutex.
///
/// `accepting` and `next_id` live under the same lock as the deque so that
/// enqueue, id assignment, and the accept-state transition are observed
/// atomically by `dequeue`: a worker that sees the queue empty re-checks
/// `accepting` without releasing the lock and can never miss a task.
struct QueueState {
    tasks: VecDeque<Task>,
    accepting: bool,
    next_id: u64,
}

/// Unbounded FIFO of submitted-but-not-yet-started tasks.
///
/// Shared by all submitters and all workers, guarded by a single mutex and
/// condition variable pair distinct from the result registry's. Workers
/// block in [`dequeue`](TaskQueue::dequeue) while the queue is empty and the
/// pool still accepts work; once [`close`](TaskQueue::close) has been called
/// and the queue has drained, `dequeue` returns `None` and the worker exits.
pub(crate) struct TaskQueue {
    state: Mutex<QueueState>,
    cond: Condvar,
}

impl fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock().unwrap();
        f.debug_struct("TaskQueue")
            .field("len", &state.tasks.len())
            .field("accepting", &state.accepting)
            .field("next_id", &state.next_id)
            .finish()
    }
}

impl TaskQueue {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                tasks: VecDeque::new(),
                accepting: true,
                next_id: 1,
            }),
            cond: Condvar::new(),
        }
    }

    /// Appends a task at the tail and assigns its id.
    ///
    /// Returns [`TaskId::NONE`] without touching the queue when the pool no
    /// longer accepts work. Id assignment happens under the queue lock, so
    /// ids handed out by concurrent submitters are strictly increasing
    /// (until wraparound, which is not prevented).
    pub fn enqueue(&self, thunk: Thunk, awaitable: bool) -> TaskId {
        let mut state = self.state.lock().unwrap();
        if !state.accepting {
            return TaskId::NONE;
        }

        let id = TaskId(state.next_id);
        state.next_id = state.next_id.wrapping_add(1);
        state.tasks.push_back(Task {
            id,
            thunk,
            awaitable,
        });
        drop(state);

        // One task, one worker.
        self.cond.notify_one();
        id
    }

    /// Removes and returns the task at the head, blocking while the queue is
    /// empty and the pool is accepting.
    ///
    /// Returns `None` once the queue is empty and the pool has stopped
    /// accepting work: the terminal "no more work" signal for a worker.
    pub fn dequeue(&self) -> Option<Task> {
        let mut state = self.state.lock().unwrap();
        loop {
            if let Some(task) = state.tasks.pop_front() {
                return Some(task);
            }
            if !state.accepting {
                return None;
            }
            state = self.cond.wait(state).unwrap();
        }
    }

    /// Stops accepting new work and wakes every blocked worker so it can
    /// observe the transition. Idempotent.
    pub fn close(&self) {
        let mut state = self.state.lock().unwrap();
        if !state.accepting {
            return;
        }
        state.accepting = false;
        drop(state);
        self.cond.notify_all();
    }

    pub fn is_accepting(&self) -> bool {
        self.state.lock().unwrap().accepting
    }

    /// Snapshot of the number of queued tasks.
    pub fn len(&self) -> usize {
        self.state.lock().unwrap().tasks.len()
    }
}
