//! Tracing configuration for Beauty Rating
//!
//! Installs the global `tracing-subscriber` registry:
//!
//! - **Console layer**: writes to stderr, since stdout carries command output
//! - **File layer**: non-blocking `beauty-rating.log` in the logs directory
//! - **Environment filter**: `RUST_LOG` wins; otherwise debug in dev builds,
//!   info in release builds
//!
//! `log` records emitted by the adapters are captured through the
//! subscriber's `tracing-log` bridge.

use std::{fs, io, path::Path, sync::OnceLock};

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{fmt, fmt::writer::BoxMakeWriter, prelude::*, registry};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

const LOG_FILE_NAME: &str = "beauty-rating.log";

/// Check if running in development environment
fn is_development() -> bool {
    cfg!(debug_assertions)
}

/// Build the default filter directives for tracing
fn build_filter_directives(is_dev: bool) -> Vec<String> {
    vec![
        if is_dev { "debug" } else { "info" }.to_string(),
        "hyper=warn".to_string(),
        "reqwest=info".to_string(),
        "rustls=warn".to_string(),
        if is_dev { "br_infra=debug" } else { "br_infra=info" }.to_string(),
    ]
}

/// Initialize the tracing subscriber
///
/// `logs_dir` is created if missing. When the file writer cannot be set up
/// logging continues on stderr only.
///
/// ## Errors / 错误
///
/// Returns `Err` if a global subscriber is already registered.
pub fn init_tracing_subscriber(logs_dir: &Path) -> anyhow::Result<()> {
    let is_dev = is_development();

    // Step 1: Build environment filter
    let filter_directives = build_filter_directives(is_dev);
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter_directives.join(",")));

    // Step 2: Create writers
    let console_writer: BoxMakeWriter = BoxMakeWriter::new(io::stderr);
    let file_writer = match build_file_writer(logs_dir) {
        Ok(writer) => Some(writer),
        Err(err) => {
            eprintln!("Failed to initialize file logging, falling back to stderr: {err}");
            None
        }
    };

    // Step 3: Create fmt layers
    // "2025-01-15 10:30:45.123 INFO [file.rs:42] [target] message"
    let console_layer = fmt::layer()
        .with_timer(fmt::time::ChronoUtc::new(
            "%Y-%m-%d %H:%M:%S%.3f".to_string(),
        ))
        .with_level(true)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .with_ansi(cfg!(not(test)))
        .with_writer(console_writer);

    let file_layer = file_writer.map(|writer| {
        fmt::layer()
            .with_timer(fmt::time::ChronoUtc::new(
                "%Y-%m-%d %H:%M:%S%.3f".to_string(),
            ))
            .with_level(true)
            .with_file(true)
            .with_line_number(true)
            .with_target(true)
            .with_ansi(false)
            .with_writer(writer)
    });

    // Step 4: Register the global subscriber
    let subscriber = registry().with(env_filter).with(console_layer);

    if let Some(layer) = file_layer {
        subscriber.with(layer).try_init()?;
    } else {
        subscriber.try_init()?;
    }

    Ok(())
}

fn build_file_writer(logs_dir: &Path) -> anyhow::Result<NonBlocking> {
    fs::create_dir_all(logs_dir)?;

    let file_appender = tracing_appender::rolling::never(logs_dir, LOG_FILE_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    LOG_GUARD
        .set(guard)
        .map_err(|_| anyhow::anyhow!("Tracing log guard already initialized"))?;

    Ok(non_blocking)
}
