// Thunkpool Worker Thread Pool
//
// This crate provides a fixed-size pool of OS worker threads that execute
// submitted closures ("thunks") asynchronously. Tasks submitted as awaitable
// publish their result into a sharded registry from which the submitter can
// later collect it with a blocking wait.

pub mod logging;
pub mod pool;

// Re-export commonly used types
pub use pool::{Pool, PoolConfig, PoolError, PoolMetrics, PoolStatus, TaskId, TaskOutput, Thunk};
