use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::config::{LogLevel, PluginSettings};

/// Configuration for the logging system
pub struct LogConfig {
    /// Directory where log files will be stored
    pub log_dir: PathBuf,
    /// Prefix for log file names
    pub file_prefix: String,
    /// Maximum number of log files to keep (rotation)
    pub max_files: usize,
    /// Level used when `RUST_LOG` is unset
    pub default_level: LogLevel,
}

impl Default for LogConfig {
    fn default() -> Self {
        let log_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".gh-attach")
            .join("logs");

        Self {
            log_dir,
            file_prefix: "gh-attach".to_string(),
            max_files: 5,
            default_level: LogLevel::Info,
        }
    }
}

impl LogConfig {
    /// Default locations with the level chosen in the plugin settings
    pub fn from_settings(settings: &PluginSettings) -> Self {
        Self {
            default_level: settings.log_level,
            ..Self::default()
        }
    }
}

/// Initialize the logging system with both file and stdout output
///
/// # Log Targets
/// - `uploader` - per-file upload lifecycle
/// - `uploader::storage` - object-storage POSTs
/// - `api::assets` - repository lookup, policy and completion calls
/// - `plugin` - drop/paste handling and note rewriting
/// - `config` - settings load/save
///
/// ```bash
/// RUST_LOG=uploader=debug,api::assets=trace
/// ```
///
/// The session cookie is never recorded by any target.
pub fn init_logging(config: LogConfig) -> Result<LogGuard> {
    std::fs::create_dir_all(&config.log_dir).context("Failed to create log directory")?;

    let file_appender = tracing_appender::rolling::RollingFileAppender::builder()
        .rotation(tracing_appender::rolling::Rotation::DAILY)
        .filename_prefix(&config.file_prefix)
        .filename_suffix("log")
        .max_log_files(config.max_files)
        .build(&config.log_dir)
        .context("Failed to create file appender")?;

    // The guard MUST be kept alive for the entire plugin lifetime
    let (non_blocking_file, worker_guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_level.as_str()));

    let file_layer = fmt::layer()
        .json()
        .with_writer(non_blocking_file)
        .with_target(true)
        .with_thread_ids(true)
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
        .with_filter(env_filter.clone());

    let stdout_layer = fmt::layer()
        .compact()
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .with_ansi(true)
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stdout_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::info!(
        target: "plugin",
        log_dir = %config.log_dir.display(),
        max_files = config.max_files,
        "Logging system initialized"
    );

    Ok(LogGuard {
        _worker_guard: worker_guard,
    })
}

/// Guard that ensures logs are flushed before exit
pub struct LogGuard {
    _worker_guard: tracing_appender::non_blocking::WorkerGuard,
}

impl Drop for LogGuard {
    fn drop(&mut self) {
        tracing::info!(target: "plugin", "Flushing logs before shutdown");
    }
}
