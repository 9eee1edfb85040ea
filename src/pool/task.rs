use std::any::Any;
use std::fmt;

/// Opaque output of an executed task.
///
/// The pool never inspects, copies, or validates task outputs; the submitter
/// downcasts to the concrete type it expects.
pub type TaskOutput = Box<dyn Any + Send + 'static>;

/// An executable unit of work: a closure capturing its own arguments.
pub type Thunk = Box<dyn FnOnce() -> TaskOutput + Send + 'static>;

/// Identifier assigned to a task at submission.
///
/// Ids are pool-scoped and monotonically increasing, starting at 1. The
/// value 0 is the reserved sentinel [`TaskId::NONE`] meaning "no task /
/// submission rejected". Uniqueness holds for the lifetime of the pool
/// except for wraparound past `u64::MAX`, which is not prevented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub(crate) u64);

impl TaskId {
    /// Sentinel id returned by a rejected or failed submission.
    pub const NONE: TaskId = TaskId(0);

    /// Whether this id is the rejection sentinel.
    pub fn is_none(&self) -> bool {
        self.0 == 0
    }

    /// Raw integer value of the id.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A submitted, not-yet-executed task.
///
/// Created under the queue lock at submission, moved out of the queue by
/// exactly one worker, then consumed by execution. Never mutated.
pub(crate) struct Task {
    /// Id handed back to the submitter
    pub id: TaskId,

    /// The work itself
    pub thunk: Thunk,

    /// Whether the output should be published to the result registry
    pub awaitable: bool,
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("awaitable", &self.awaitable)
            .finish()
    }
}
