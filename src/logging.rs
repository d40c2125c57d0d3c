//! Structured logging and tracing for EnergyMuffin
//!
//! This module provides logging with support for structured context fields,
//! daily log rotation, and integration with the tracing ecosystem.

use crate::config::LoggingConfig;
use crate::error::{MuffinError, Result};
use once_cell::sync::OnceCell;
use std::path::Path;
use std::sync::Once;
use tracing::{Level, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod structured;

pub use structured::{LogContext, StructuredLogger, get_logger, get_logger_with_context};

// Keep the non-blocking worker guard alive for the entire process lifetime
static LOG_GUARD: OnceCell<WorkerGuard> = OnceCell::new();
static INIT_ONCE: Once = Once::new();
static INIT_ERROR: OnceCell<String> = OnceCell::new();

/// Initialize logging system based on configuration
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    INIT_ONCE.call_once(|| {
        let init_result = (|| -> Result<()> {
            let level = parse_log_level(&config.level)?;
            let filter = build_env_filter(level);

            if should_use_console_only() {
                init_console_only_logging(filter, config.json_format, level);
                return Ok(());
            }

            init_file_logging(config, filter, level)
        })();

        if let Err(e) = init_result {
            let _ = INIT_ERROR.set(e.to_string());
        }
    });

    if let Some(err) = INIT_ERROR.get() {
        return Err(MuffinError::config(err.clone()));
    }
    Ok(())
}

fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "energymuffin={},tower_http={},reqwest=warn,hyper=warn",
            level, level
        )
        .into()
    })
}

fn should_use_console_only() -> bool {
    cfg!(test) || std::env::var_os("ENERGYMUFFIN_DISABLE_FILE_LOG").is_some()
}

fn console_layer<S>(json_format: bool, level: Level) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a> + 'static,
{
    let base = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false);
    if json_format {
        base.json()
            .with_filter(LevelFilter::from_level(level))
            .boxed()
    } else {
        base.with_filter(LevelFilter::from_level(level)).boxed()
    }
}

fn init_console_only_logging(filter: EnvFilter, json_format: bool, level: Level) {
    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer(json_format, level))
        .init();

    info!("Logging initialized - level: {:?}, console-only", level);
}

fn init_file_logging(config: &LoggingConfig, filter: EnvFilter, level: Level) -> Result<()> {
    let file_appender = rolling::Builder::new()
        .rotation(rolling::Rotation::DAILY)
        .filename_prefix("energymuffin")
        .filename_suffix("log")
        .max_log_files(config.backup_count.max(1) as usize)
        .build({
            // If config.file is a file path, use its parent dir; otherwise treat as dir
            let p = Path::new(&config.file);
            if p.extension().is_some() {
                p.parent().unwrap_or(p)
            } else {
                p
            }
        })
        .map_err(|e| MuffinError::io(format!("Failed to create log file appender: {}", e)))?;

    let (non_blocking_appender, guard) = non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    let file_layer = {
        let base = fmt::layer()
            .with_writer(non_blocking_appender)
            .with_ansi(false)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false);
        if config.json_format {
            base.json()
                .with_filter(LevelFilter::from_level(level))
                .boxed()
        } else {
            base.with_filter(LevelFilter::from_level(level)).boxed()
        }
    };

    let subscriber = tracing_subscriber::registry().with(filter).with(file_layer);

    if config.console_output {
        subscriber
            .with(console_layer(config.json_format, level))
            .init();
    } else {
        subscriber.init();
    }

    info!(
        "Logging initialized - level: {:?}, file: {}",
        level, config.file
    );
    Ok(())
}

/// Parse log level string to tracing Level
pub fn parse_log_level(level_str: &str) -> Result<Level> {
    match level_str.to_uppercase().as_str() {
        "TRACE" => Ok(Level::TRACE),
        "DEBUG" => Ok(Level::DEBUG),
        "INFO" => Ok(Level::INFO),
        "WARN" | "WARNING" => Ok(Level::WARN),
        "ERROR" => Ok(Level::ERROR),
        _ => Err(MuffinError::config(format!(
            "Invalid log level: {}",
            level_str
        ))),
    }
}
