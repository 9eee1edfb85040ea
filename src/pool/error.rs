use std::io;
use thiserror::Error;

/// Errors raised while constructing a [`Pool`](crate::pool::Pool).
///
/// Submission rejection is not an error in this taxonomy: `submit` reports
/// it through the [`TaskId::NONE`](crate::pool::TaskId::NONE) sentinel, and
/// a wait interrupted by teardown reports it by returning `None`.
#[derive(Error, Debug)]
pub enum PoolError {
    #[error("pool requires at least one worker thread (requested {requested})")]
    InvalidPoolSize { requested: usize },

    #[error("failed to start any worker thread: {0}")]
    SpawnFailed(#[source] io::Error),
}
