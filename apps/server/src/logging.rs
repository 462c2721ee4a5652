//! Logging initialization for ggtable binaries
//!
//! Supports configuration-based logging with file rotation, JSON formatting,
//! and `RUST_LOG` overrides.

use std::fs;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Keeps the non-blocking file writer flushing.
/// Must be kept alive for the duration of the program.
pub struct LoggingGuard {
    _file_guard: Option<tracing_appender::non_blocking::WorkerGuard>,
}

/// Initialize logging from `LoggingConfig`.
///
/// Console output is JSON or human-readable; a rolling file copy in the same
/// format is added when `file_enabled` is set. `RUST_LOG` takes precedence
/// over the configured level.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<LoggingGuard> {
    let (file_writer, file_guard) = if config.file_enabled {
        let (writer, guard) = tracing_appender::non_blocking(file_appender(config)?);
        (Some(writer), Some(guard))
    } else {
        (None, None)
    };

    let registry = tracing_subscriber::registry().with(build_env_filter(config));
    if config.json {
        let console = fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_writer(std::io::stdout);
        let file = file_writer.map(|writer| {
            fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(false)
                .with_writer(writer)
        });
        registry.with(console).with(file).try_init()?;
    } else {
        let console = fmt::layer().with_target(true).with_writer(std::io::stdout);
        let file = file_writer.map(|writer| {
            fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(writer)
        });
        registry.with(console).with(file).try_init()?;
    }

    tracing::info!(
        level = %config.level,
        json = config.json,
        file_enabled = config.file_enabled,
        "Logging initialized"
    );

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

fn build_env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.level)))
}

fn default_directives(level: &str) -> String {
    // sqlx logs every statement at info
    format!(
        "ggtable={level},ggtable_server={level},ggtable_query={level},\
         tower_http=debug,sqlx=warn"
    )
}

fn rotation(name: &str) -> Rotation {
    match name {
        "hourly" => Rotation::HOURLY,
        "minutely" => Rotation::MINUTELY,
        "never" => Rotation::NEVER,
        _ => Rotation::DAILY,
    }
}

fn file_appender(config: &LoggingConfig) -> anyhow::Result<RollingFileAppender> {
    fs::create_dir_all(&config.file_directory)?;

    let schedule = rotation(&config.file_rotation);
    let prefix = if schedule == Rotation::NEVER {
        format!("{}.log", config.file_prefix)
    } else {
        config.file_prefix.clone()
    };

    Ok(RollingFileAppender::new(
        schedule,
        &config.file_directory,
        prefix,
    ))
}

/// Stderr-only logging driven by `RUST_LOG`.
///
/// For the command-line client, whose stdout carries the JSON result.
pub fn init_simple_logging() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ggtable=warn,ggtable_query=info,sqlx=warn".into()),
        )
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
