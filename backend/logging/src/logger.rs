//! Structured logging
//!
//! Wraps `tracing`: console output, plus a daily-rolling NDJSON file when
//! a log directory is configured. Level comes from `RUST_LOG` with a
//! configurable fallback.

use std::path::PathBuf;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// How the global logger is set up.
#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Fallback level filter when `RUST_LOG` is unset (e.g. "info").
    pub level: String,
    /// Directory for the rolling NDJSON file; console-only when `None`.
    pub log_dir: Option<PathBuf>,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: None,
        }
    }
}

/// Initialize the global structured logger. Safe to call more than once;
/// later calls are no-ops.
pub fn init_logging(options: &LogOptions) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&options.level));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(true);

    match &options.log_dir {
        Some(dir) => {
            // Rolling file appender: NDJSON in `<dir>/botkit.log.YYYY-MM-DD`
            let file_appender = RollingFileAppender::new(Rotation::DAILY, dir, "botkit.log");
            let file_layer = fmt::layer()
                .json()
                .with_writer(file_appender)
                .with_ansi(false);
            let _ = tracing_subscriber::registry()
                .with(env_filter)
                .with(console_layer)
                .with(file_layer)
                .try_init();
        }
        None => {
            let _ = tracing_subscriber::registry()
                .with(env_filter)
                .with(console_layer)
                .try_init();
        }
    }
}
