use std::collections::HashMap;
use std::fmt;
use std::sync::{Condvar, Mutex};

use super::task::{TaskId, TaskOutput};

struct RegistryState {
    shards: Vec<HashMap<TaskId, TaskOutput>>,
    torn_down: bool,
}

/// Sharded store of computed results for awaitable tasks.
///
/// Workers publish into the shard `id mod shard_count`; callers of
/// [`take`](ResultRegistry::take) remove and consume an entry exactly once.
/// The shard count is fixed at the pool size to spread chain length across
/// workers. A single mutex and condition variable guard the whole store —
/// distinct from the task queue's pair, and never held while a task
/// executes.
///
/// # Teardown
/// `torn_down` lives under the registry lock. [`tear_down`](
/// ResultRegistry::tear_down) sets it and broadcasts, which releases every
/// blocked waiter; after that no entry is added or read.
pub(crate) struct ResultRegistry {
    state: Mutex<RegistryState>,
    cond: Condvar,
    shard_count: usize,
}

impl fmt::Debug for ResultRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock().unwrap();
        f.debug_struct("ResultRegistry")
            .field("shard_count", &self.shard_count)
            .field("pending", &state.shards.iter().map(HashMap::len).sum::<usize>())
            .field("torn_down", &state.torn_down)
            .finish()
    }
}

impl ResultRegistry {
    pub fn new(shard_count: usize) -> Self {
        Self {
            state: Mutex::new(RegistryState {
                shards: (0..shard_count).map(|_| HashMap::new()).collect(),
                torn_down: false,
            }),
            cond: Condvar::new(),
            shard_count,
        }
    }

    fn shard_index(&self, id: TaskId) -> usize {
        (id.as_u64() % self.shard_count as u64) as usize
    }

    /// Stores the output of an awaitable task and wakes all waiters.
    ///
    /// All waiters are woken rather than one because each waiter is looking
    /// for a specific id; whoever finds its entry consumes it, the rest go
    /// back to sleep. Outputs arriving after teardown are dropped.
    pub fn publish(&self, id: TaskId, value: TaskOutput) {
        let shard = self.shard_index(id);
        let mut state = self.state.lock().unwrap();
        if state.torn_down {
            return;
        }
        state.shards[shard].insert(id, value);
        drop(state);
        self.cond.notify_all();
    }

    /// Removes and returns the entry for `id`, blocking until it appears or
    /// the registry is torn down (`None`).
    ///
    /// An id that will never be published — non-awaitable, the sentinel, or
    /// never submitted — blocks until teardown. The registry cannot tell
    /// "not yet published" from "never will be".
    pub fn take(&self, id: TaskId) -> Option<TaskOutput> {
        let shard = self.shard_index(id);
        let mut state = self.state.lock().unwrap();
        loop {
            if state.torn_down {
                return None;
            }
            if let Some(value) = state.shards[shard].remove(&id) {
                return Some(value);
            }
            state = self.cond.wait(state).unwrap();
        }
    }

    /// Marks the registry terminal and releases every blocked waiter.
    /// Idempotent.
    pub fn tear_down(&self) {
        let mut state = self.state.lock().unwrap();
        if state.torn_down {
            return;
        }
        state.torn_down = true;
        drop(state);
        self.cond.notify_all();
    }

    pub fn is_torn_down(&self) -> bool {
        self.state.lock().unwrap().torn_down
    }

    /// Snapshot of the number of unconsumed results across all shards.
    pub fn pending(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.shards.iter().map(HashMap::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn publish_then_take_consumes_exactly_once() {
        let registry = ResultRegistry::new(4);
        registry.publish(TaskId(7), Box::new(42u32));

        let value = registry.take(TaskId(7)).unwrap();
        assert_eq!(*value.downcast::<u32>().unwrap(), 42);
        assert_eq!(registry.pending(), 0);
    }

    #[test]
    fn take_blocks_until_published() {
        let registry = Arc::new(ResultRegistry::new(2));
        let waiter = {
            let registry = Arc::clone(&registry);
            thread::spawn(move || registry.take(TaskId(3)))
        };

        thread::sleep(Duration::from_millis(50));
        registry.publish(TaskId(3), Box::new("done"));

        let value = waiter.join().unwrap().unwrap();
        assert_eq!(*value.downcast::<&str>().unwrap(), "done");
    }

    #[test]
    fn tear_down_releases_blocked_waiter() {
        let registry = Arc::new(ResultRegistry::new(2));
        let waiter = {
            let registry = Arc::clone(&registry);
            thread::spawn(move || registry.take(TaskId(99)))
        };

        thread::sleep(Duration::from_millis(50));
        registry.tear_down();
        assert!(waiter.join().unwrap().is_none());
    }

    #[test]
    fn publish_after_tear_down_is_dropped() {
        let registry = ResultRegistry::new(2);
        registry.tear_down();
        registry.publish(TaskId(1), Box::new(1u8));
        assert_eq!(registry.pending(), 0);
        assert!(registry.take(TaskId(1)).is_none());
    }

    #[test]
    fn ids_land_in_their_shard() {
        let registry = ResultRegistry::new(3);
        for raw in 1..=6u64 {
            registry.publish(TaskId(raw), Box::new(raw));
        }
        assert_eq!(registry.pending(), 6);
        for raw in 1..=6u64 {
            let value = registry.take(TaskId(raw)).unwrap();
            assert_eq!(*value.downcast::<u64>().unwrap(), raw);
        }
    }
}
