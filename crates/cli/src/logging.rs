//! Logging setup for the seqscan binary

use std::path::Path;

use seqscan::Config;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

/// Parse log level from config string
fn parse_log_level(level: &str) -> LevelFilter {
  match level.to_lowercase().as_str() {
    "off" => LevelFilter::OFF,
    "error" => LevelFilter::ERROR,
    "warn" => LevelFilter::WARN,
    "info" => LevelFilter::INFO,
    "debug" => LevelFilter::DEBUG,
    "trace" => LevelFilter::TRACE,
    _ => LevelFilter::INFO,
  }
}

/// Initialize logging from the `[logging]` section.
///
/// Without a log file, events go to stderr with colors. With one, they go to
/// that file only (no ANSI). `RUST_LOG` overrides the configured level.
///
/// Returns the guard that must be kept alive for the duration of the program
pub fn init_logging(config: &Config) -> Option<WorkerGuard> {
  let logging = &config.logging;

  let env_filter = EnvFilter::builder()
    .with_default_directive(parse_log_level(&logging.level).into())
    .from_env_lossy();

  let Some(path) = logging.file.as_deref() else {
    init_console_logging(env_filter);
    return None;
  };

  let Some(file_name) = path.file_name() else {
    init_console_logging(env_filter);
    return None;
  };
  let log_dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));

  if std::fs::create_dir_all(log_dir).is_err() {
    // Fall back to console-only logging
    init_console_logging(env_filter);
    return None;
  }

  let file_appender = tracing_appender::rolling::never(log_dir, file_name);
  let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

  tracing_subscriber::fmt()
    .with_env_filter(env_filter)
    .with_target(true)
    .with_ansi(false)
    .with_writer(file_writer)
    .init();

  Some(guard)
}

fn init_console_logging(env_filter: EnvFilter) {
  tracing_subscriber::fmt()
    .with_env_filter(env_filter)
    .with_target(false)
    .with_ansi(true)
    .with_writer(std::io::stderr)
    .init();
}
