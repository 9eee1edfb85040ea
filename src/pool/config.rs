/// Configuration for a [`Pool`](crate::pool::Pool).
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Number of worker threads. Must be at least 1.
    pub pool_size: usize,

    /// Prefix for worker thread names; the worker index is appended.
    pub thread_name_prefix: String,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            pool_size: num_cpus::get(),
            thread_name_prefix: "thunkpool-worker".to_string(),
        }
    }
}

impl PoolConfig {
    /// Configuration with an explicit pool size and default naming.
    pub fn with_pool_size(pool_size: usize) -> Self {
        Self {
            pool_size,
            ..Default::default()
        }
    }
}
