// Logging for thunkpool
//
// Built on the `tracing` ecosystem. The pool itself only emits events
// (worker lifecycle at DEBUG, pool lifecycle at INFO, task panics at
// ERROR); embedders that want to see them can install their own subscriber
// or use the initializers below.

use std::sync::Once;
use tracing::{Level, Subscriber};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Configuration for the logging subscriber installed by [`init`].
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level to display
    pub level: Level,
    /// Whether to emit JSON instead of human-readable lines
    pub json_format: bool,
    /// Whether to include file and line information
    pub show_file_line: bool,
    /// Whether to include thread name/id
    pub show_thread_info: bool,
    /// Whether to include timestamps
    pub show_time: bool,
    /// Target filter expressions ("target=level,target2=level2,...")
    pub target_filters: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json_format: false,
            show_file_line: true,
            show_thread_info: true,
            show_time: true,
            target_filters: None,
        }
    }
}

// Only the first initialization takes effect.
static INIT: Once = Once::new();

/// Installs a global tracing subscriber with the given configuration.
///
/// Safe to call multiple times; only the first call takes effect. The
/// `RUST_LOG` environment variable is honored and can override `level`.
pub fn init(config: LogConfig) {
    INIT.call_once(|| {
        let mut env_filter = EnvFilter::from_default_env().add_directive(config.level.into());

        if let Some(filters) = config.target_filters {
            for filter in filters.split(',') {
                if let Ok(directive) = filter.parse() {
                    env_filter = env_filter.add_directive(directive);
                }
            }
        }

        let fmt_layer = fmt::layer()
            .with_ansi(atty::is(atty::Stream::Stdout))
            .with_file(config.show_file_line)
            .with_line_number(config.show_file_line)
            .with_thread_names(config.show_thread_info)
            .with_thread_ids(config.show_thread_info);

        let registry = tracing_subscriber::registry().with(env_filter);

        let subscriber: Box<dyn Subscriber + Send + Sync> = if config.json_format {
            Box::new(registry.with(fmt::layer().json().flatten_event(true)))
        } else if config.show_time {
            Box::new(registry.with(fmt_layer))
        } else {
            Box::new(registry.with(fmt_layer.without_time()))
        };

        if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
            eprintln!("error setting global tracing subscriber: {}", err);
        }
    });
}

/// Initializes logging with defaults: INFO level, human-readable console
/// output.
pub fn init_default() {
    init(LogConfig::default());
}

/// Initializes logging for tests: WARN level, compact output without
/// timestamps or thread noise.
pub fn init_test() {
    init(LogConfig {
        level: Level::WARN,
        json_format: false,
        show_file_line: true,
        show_thread_info: false,
        show_time: false,
        target_filters: None,
    });
}

// Re-export the most commonly used tracing macros for convenience
pub use tracing::{debug, error, info, trace, warn};
