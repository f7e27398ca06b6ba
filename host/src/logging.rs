//! Subscriber setup. stdout carries the method channel, so console logs go
//! to stderr; an optional daily-rolling file mirrors them without ANSI.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::HostError;

/// Log file name prefix inside `log_dir`.
pub const LOG_FILE_PREFIX: &str = "biocipher-host.log";

/// Effective filter directive for a configured level and `-v` count.
#[must_use]
pub fn effective_level(configured: &str, verbose: u8) -> &str {
    match verbose {
        0 => configured,
        1 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` overrides the level when set. Keep the returned guard alive
/// for the life of the process or buffered file lines are lost.
///
/// # Errors
///
/// Returns `HostError::Logging` if the filter is invalid, the log directory
/// cannot be used, or a global subscriber is already installed.
pub fn init(level: &str, log_dir: Option<&Path>) -> Result<Option<WorkerGuard>, HostError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| HostError::Logging(format!("invalid log level {level:?}: {e}")))?,
    };

    let console = fmt::layer().with_writer(std::io::stderr).with_target(false);

    let (file, guard) = match log_dir {
        Some(dir) => {
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(LOG_FILE_PREFIX)
                .build(dir)
                .map_err(|e| {
                    HostError::Logging(format!("cannot log to {}: {e}", dir.display()))
                })?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| HostError::Logging(e.to_string()))?;

    Ok(guard)
}
