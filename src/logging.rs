//! Logging setup.
//!
//! Logs go to stderr and to a daily-rotating file. `RUST_LOG` overrides the
//! default `info` filter.
//!
//! ```no_run
//! use tablesight::{config::PipelineConfig, logging};
//!
//! logging::init(&PipelineConfig::default()).expect("Failed to initialize logging");
//! tracing::info!("pipeline started");
//! ```

use crate::config::PipelineConfig;
use anyhow::{Context as _, Result};
use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _};

/// Resolves the log directory and creates it if needed.
///
/// Uses `config.log_dir` when set, otherwise the platform data directory:
/// - Windows: `%APPDATA%/tablesight/logs`
/// - macOS: `~/Library/Application Support/tablesight/logs`
/// - Linux: `~/.local/share/tablesight/logs`
pub fn get_log_dir(config: &PipelineConfig) -> Result<PathBuf> {
    let log_dir = match &config.log_dir {
        Some(dir) => dir.clone(),
        None => dirs::data_dir()
            .context("Failed to determine data directory")?
            .join("tablesight")
            .join("logs"),
    };

    if !log_dir.exists() {
        std::fs::create_dir_all(&log_dir)
            .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;
    }

    Ok(log_dir)
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Returns error if the log directory or the file appender cannot be created.
pub fn init(config: &PipelineConfig) -> Result<()> {
    let log_dir = get_log_dir(config)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(10)
        .filename_prefix("tablesight")
        .filename_suffix("log")
        .build(&log_dir)
        .context("Failed to create log file appender")?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .context("Failed to create env filter")?;

    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact();

    let file_layer = fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false)
        .with_writer(file_appender);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::debug!(log_dir = %log_dir.display(), "Logging initialized");

    Ok(())
}
