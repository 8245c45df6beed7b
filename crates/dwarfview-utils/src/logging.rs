//! # Logging Utilities
//!
//! Logging infrastructure for dwarfview using `tracing`.
//!
//! The logical view itself is written to stdout, so every log record goes to
//! stderr (and optionally to a file). Logging is diagnostic output for people
//! working on the tool; user-facing warnings are reported separately by the
//! command line front end.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dwarfview_utils::init_logging;
//!
//! // Reads RUST_LOG, DWARFVIEW_LOG_FORMAT and DWARFVIEW_LOG_FILE
//! let _guard = init_logging().expect("Failed to initialize logging");
//!
//! tracing::debug!("building logical view");
//! ```
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Set log level filter (e.g., `RUST_LOG=debug`, `RUST_LOG=dwarfview_core=trace`)
//! - `DWARFVIEW_LOG_FORMAT`: Set output format (`json` or `pretty`, default: `pretty`)
//! - `DWARFVIEW_LOG_FILE`: Optional path to a log file (if not set, logs only to stderr)

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{env, io};

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::{self};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Environment variable selecting the log format.
pub const LOG_FORMAT_ENV: &str = "DWARFVIEW_LOG_FORMAT";

/// Environment variable naming an optional log file.
pub const LOG_FILE_ENV: &str = "DWARFVIEW_LOG_FILE";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat
{
    /// Pretty-printed, human-readable format (default)
    #[default]
    Pretty,
    /// JSON format, one record per line
    Json,
}

impl FromStr for LogFormat
{
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "pretty" | "dev" | "development" => Ok(LogFormat::Pretty),
            "json" | "prod" | "production" => Ok(LogFormat::Json),
            _ => Err(LoggingError::InvalidFormat(s.to_string())),
        }
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel
{
    /// Error level
    Error,
    /// Warning level (default)
    Warn,
    /// Info level
    Info,
    /// Debug level
    Debug,
    /// Trace level (most verbose)
    Trace,
}

impl From<LogLevel> for Level
{
    fn from(level: LogLevel) -> Self
    {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

impl FromStr for LogLevel
{
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "error" | "err" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" | "dbg" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(LoggingError::InvalidLevel(s.to_string())),
        }
    }
}

/// Resolved logging configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggingConfig
{
    /// Explicit level; takes precedence over `RUST_LOG`.
    pub level: Option<LogLevel>,
    pub format: LogFormat,
    pub file: Option<PathBuf>,
}

impl LoggingConfig
{
    /// Build a configuration from the `DWARFVIEW_*` environment variables.
    ///
    /// An unparseable `DWARFVIEW_LOG_FORMAT` falls back to [`LogFormat::Pretty`].
    #[must_use]
    pub fn from_env() -> Self
    {
        let format = env::var(LOG_FORMAT_ENV)
            .ok()
            .and_then(|s| LogFormat::from_str(&s).ok())
            .unwrap_or_default();
        let file = env::var(LOG_FILE_ENV).ok().filter(|s| !s.is_empty()).map(PathBuf::from);

        Self {
            level: None,
            format,
            file,
        }
    }

    /// Override the level, e.g. from a `--log-level` flag.
    #[must_use]
    pub fn with_level(mut self, level: Option<LogLevel>) -> Self
    {
        if level.is_some() {
            self.level = level;
        }
        self
    }

    fn env_filter(&self) -> EnvFilter
    {
        // Priority:
        // 1. Explicit level (from the command line)
        // 2. RUST_LOG, which allows per-crate filters like "dwarfview_core=trace"
        // 3. WARN
        if let Some(level) = self.level {
            return EnvFilter::new(Level::from(level).to_string());
        }
        match env::var("RUST_LOG") {
            Ok(rust_log) => EnvFilter::try_new(rust_log).unwrap_or_else(|_| EnvFilter::new(Level::WARN.to_string())),
            Err(_) => EnvFilter::new(Level::WARN.to_string()),
        }
    }
}

/// Keeps the background file writer alive.
///
/// Dropping the guard flushes any buffered records, so hold it until the
/// program exits.
#[must_use = "dropping the guard stops file logging"]
#[derive(Debug, Default)]
pub struct LoggingGuard
{
    _file: Option<WorkerGuard>,
}

/// Initialize logging from the environment.
///
/// ## Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging() -> Result<LoggingGuard, LoggingError>
{
    init_logging_with_config(&LoggingConfig::from_env())
}

/// Initialize logging with an explicit level and format.
///
/// ## Example
///
/// ```rust,no_run
/// use dwarfview_utils::{LogFormat, LogLevel, init_logging_with_level};
///
/// let _guard = init_logging_with_level(LogLevel::Debug, LogFormat::Pretty)
///     .expect("Failed to initialize logging");
/// ```
///
/// ## Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging_with_level(level: LogLevel, format: LogFormat) -> Result<LoggingGuard, LoggingError>
{
    let config = LoggingConfig {
        level: Some(level),
        format,
        file: env::var(LOG_FILE_ENV).ok().map(PathBuf::from),
    };
    init_logging_with_config(&config)
}

/// Initialize logging from a resolved [`LoggingConfig`].
///
/// ## Errors
///
/// Returns an error if a global subscriber is already installed or the log
/// file cannot be opened.
pub fn init_logging_with_config(config: &LoggingConfig) -> Result<LoggingGuard, LoggingError>
{
    let mut layers = vec![format_layer(config.format, io::stderr, true)];
    let mut guard = LoggingGuard::default();

    if let Some(file_path) = &config.file {
        let (non_blocking, worker) = tracing_appender::non_blocking(file_appender(file_path)?);
        layers.push(format_layer(config.format, non_blocking, false));
        guard._file = Some(worker);
    }

    Registry::default()
        .with(layers.with_filter(config.env_filter()))
        .try_init()
        .map_err(|err| LoggingError::InitializationFailed(err.to_string()))?;
    Ok(guard)
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// One output layer in the configured format. ANSI colours only go to the
/// console.
fn format_layer<W>(format: LogFormat, writer: W, ansi: bool) -> BoxedLayer
where
    W: for<'w> fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_timer(ChronoUtc::rfc_3339())
        .with_writer(writer);

    match format {
        LogFormat::Pretty => layer.with_ansi(ansi).boxed(),
        LogFormat::Json => layer.json().with_current_span(true).with_span_list(true).boxed(),
    }
}

// A single log file per run; the user picks the name.
fn file_appender(file_path: &Path) -> Result<RollingFileAppender, LoggingError>
{
    let directory = file_path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let name = file_path.file_name().unwrap_or_default().to_string_lossy().into_owned();
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name)
        .build(directory)
        .map_err(|err| LoggingError::FileError(io::Error::other(err)))
}

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError
{
    /// Invalid log format
    #[error("Invalid log format: {0}. Use 'pretty' or 'json'")]
    InvalidFormat(String),

    /// Invalid log level
    #[error("Invalid log level: {0}. Use 'error', 'warn', 'info', 'debug', or 'trace'")]
    InvalidLevel(String),

    /// Failed to initialize logging
    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),

    /// The log file could not be opened
    #[error("File logging error: {0}")]
    FileError(#[from] io::Error),
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_log_format_from_str()
    {
        assert_eq!(LogFormat::from_str("pretty").unwrap(), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("json").unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::from_str("dev").unwrap(), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("PROD").unwrap(), LogFormat::Json);
        assert!(matches!(LogFormat::from_str("xml"), Err(LoggingError::InvalidFormat(_))));
    }

    #[test]
    fn test_log_level_from_str()
    {
        assert_eq!(LogLevel::from_str("error").unwrap(), LogLevel::Error);
        assert_eq!(LogLevel::from_str("warning").unwrap(), LogLevel::Warn);
        assert_eq!(LogLevel::from_str("info").unwrap(), LogLevel::Info);
        assert_eq!(LogLevel::from_str("dbg").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("trace").unwrap(), LogLevel::Trace);
        assert!(matches!(LogLevel::from_str("loud"), Err(LoggingError::InvalidLevel(_))));
    }

    #[test]
    fn test_log_level_to_tracing_level()
    {
        assert_eq!(Level::from(LogLevel::Error), Level::ERROR);
        assert_eq!(Level::from(LogLevel::Warn), Level::WARN);
        assert_eq!(Level::from(LogLevel::Info), Level::INFO);
        assert_eq!(Level::from(LogLevel::Debug), Level::DEBUG);
        assert_eq!(Level::from(LogLevel::Trace), Level::TRACE);
    }

    #[test]
    fn test_config_explicit_level_wins()
    {
        let config = LoggingConfig::default().with_level(Some(LogLevel::Trace));
        assert_eq!(config.level, Some(LogLevel::Trace));

        let unchanged = config.clone().with_level(None);
        assert_eq!(unchanged, config);
    }

    #[test]
    fn test_config_defaults_to_pretty_without_file()
    {
        let config = LoggingConfig::default();
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.level.is_none());
        assert!(config.file.is_none());
    }
}
