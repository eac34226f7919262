//! Structured logging with tracing
//!
//! Installs the global subscriber: an `EnvFilter` (the `TIERCACHE_LOG`
//! environment variable overrides the configured level), plain or JSON
//! output on stdout, and an optional daily-rolling file.

use crate::constants::{LOG_FILE_DEFAULT_STEM, LOG_FILTER_ENV};
use std::ffi::OsStr;
use std::path::Path;
use tiercache_domain::error::{Error, Result};
use tracing::{Level, info, warn};
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

// Re-export LoggingConfig for convenience
pub use crate::config::LoggingConfig;

/// Initialize logging with the provided configuration
///
/// Fails when the level is invalid or a global subscriber is already set.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let level = parse_log_level(&config.level)?;
    let filter =
        EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(&config.level));

    let file_appender = config.file_output.as_ref().map(|path| {
        tracing_appender::rolling::daily(
            path.parent().unwrap_or_else(|| Path::new(".")),
            path.file_stem()
                .unwrap_or_else(|| OsStr::new(LOG_FILE_DEFAULT_STEM)),
        )
    });

    // Layer types differ per format, hence the separate branches
    let installed = if config.json_format {
        let stdout = fmt::layer().json().with_target(true).with_thread_names(true);
        let registry = Registry::default().with(filter);
        match file_appender {
            Some(appender) => {
                let file = fmt::layer()
                    .json()
                    .with_writer(appender)
                    .with_ansi(false)
                    .with_target(true);
                registry.with(stdout).with(file).try_init()
            }
            None => registry.with(stdout).try_init(),
        }
    } else {
        let stdout = fmt::layer().with_target(true).with_thread_names(true);
        let registry = Registry::default().with(filter);
        match file_appender {
            Some(appender) => {
                let file = fmt::layer()
                    .with_writer(appender)
                    .with_ansi(false)
                    .with_target(true);
                registry.with(stdout).with(file).try_init()
            }
            None => registry.with(stdout).try_init(),
        }
    };
    installed
        .map_err(|e| Error::configuration_with_source("Failed to install log subscriber", e))?;

    info!("Logging initialized with level: {}", level);
    Ok(())
}

/// Parse log level string to tracing Level
pub fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(Error::configuration(format!(
            "Invalid log level: {level}. Use trace, debug, info, warn, or error"
        ))),
    }
}

/// Log configuration loading status
pub fn log_config_loaded(config_path: &Path, success: bool) {
    if success {
        info!("Configuration loaded from {}", config_path.display());
    } else {
        warn!("Configuration file not found: {}", config_path.display());
    }
}
