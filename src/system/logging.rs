//! Logging initialization
//!
//! Installs the global tracing subscriber from the `[logging]` config
//! section: console output by default, an append-only file or a daily
//! rotated file set when `file` is configured, text or JSON formatting.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Initialize the logging system
///
/// Called once at startup, before anything logs. The returned
/// `WorkerGuard` flushes the non-blocking writer and must be held for
/// the lifetime of the process. Panics if the log file cannot be opened
/// or a subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> WorkerGuard {
    let log_file = config.file.as_deref().filter(|f| !f.is_empty());

    let writer: Box<dyn std::io::Write + Send + Sync> = match log_file {
        Some(path) if config.enable_rotation => {
            Box::new(daily_appender(path, config.max_backups))
        }
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .expect("Failed to open log file");
            Box::new(file)
        }
        None => Box::new(std::io::stdout()),
    };

    let (non_blocking_writer, guard) = tracing_appender::non_blocking(writer);

    let subscriber_builder = tracing_subscriber::fmt()
        .with_writer(non_blocking_writer)
        .with_env_filter(EnvFilter::new(config.level.clone()))
        .with_ansi(log_file.is_none());

    if config.format == "json" {
        subscriber_builder.json().init();
    } else {
        subscriber_builder.init();
    }

    guard
}

/// Daily-rotated appender next to the configured log path, keeping
/// `max_backups` files
fn daily_appender(path: &str, max_backups: u32) -> rolling::RollingFileAppender {
    let path = std::path::Path::new(path);
    let dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
    let prefix = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("iplocator");

    rolling::Builder::new()
        .rotation(rolling::Rotation::DAILY)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .max_log_files(max_backups as usize)
        .build(dir)
        .expect("Failed to create rolling log appender")
}
