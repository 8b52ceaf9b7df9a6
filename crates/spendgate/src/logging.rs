//! # Logging Infrastructure
//!
//! Structured logging with `tracing` for the `spendgate` binary.
//!
//! Log output goes to stderr so command output on stdout stays machine-readable.
//! An optional file sink rotates daily via `tracing-appender`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use spendgate::logging::{init_logging, LogConfig};
//!
//! let _guard = init_logging(&LogConfig::default()).expect("Failed to initialize logging");
//! tracing::info!("Application started");
//! ```

use std::path::PathBuf;

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Error type for logging initialization failures.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// Failed to create log file or directory
    #[error("Failed to create log file: {0}")]
    FileCreation(String),
    /// Failed to initialize the subscriber
    #[error("Failed to initialize logging: {0}")]
    SubscriberInit(String),
    /// Invalid configuration
    #[error("Invalid log configuration: {0}")]
    InvalidConfig(String),
}

/// Minimum severity of messages that will be logged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    /// trace, debug, info, warn, error
    Trace,
    /// debug, info, warn, error
    Debug,
    /// info, warn, error
    #[default]
    Info,
    /// warn, error
    Warn,
    /// error only
    Error,
}

impl LogLevel {
    /// Convert to tracing Level.
    #[must_use]
    pub const fn as_tracing_level(self) -> Level {
        match self {
            Self::Trace => Level::TRACE,
            Self::Debug => Level::DEBUG,
            Self::Info => Level::INFO,
            Self::Warn => Level::WARN,
            Self::Error => Level::ERROR,
        }
    }

    /// Directive string for the env filter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable multi-line format.
    #[default]
    Pretty,
    /// JSON structured format, one object per line.
    Json,
    /// Compact single-line format.
    Compact,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pretty => write!(f, "pretty"),
            Self::Json => write!(f, "json"),
            Self::Compact => write!(f, "compact"),
        }
    }
}

/// Configuration for the logging system.
///
/// # Example
///
/// ```
/// use spendgate::logging::{LogConfig, LogFormat, LogLevel};
///
/// let config = LogConfig {
///     level: LogLevel::Debug,
///     format: LogFormat::Json,
///     ..Default::default()
/// };
/// assert!(config.file_path.is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    /// Minimum severity. Ignored when `RUST_LOG` is set.
    pub level: LogLevel,

    /// Output format for log messages.
    pub format: LogFormat,

    /// Optional log file, rotated daily. The directory is created if missing.
    pub file_path: Option<PathBuf>,
}

/// Guard that flushes file logs on drop.
///
/// Keep it alive for the lifetime of the program.
pub struct LogGuard {
    guard: Option<tracing_appender::non_blocking::WorkerGuard>,
}

impl LogGuard {
    const fn new(guard: Option<tracing_appender::non_blocking::WorkerGuard>) -> Self {
        Self { guard }
    }
}

impl std::fmt::Debug for LogGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogGuard")
            .field("has_file_guard", &self.guard.is_some())
            .finish()
    }
}

/// Builds the env filter, preferring `RUST_LOG` over the configured level.
fn build_filter(level: LogLevel) -> Result<EnvFilter, LogError> {
    match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) if !directives.trim().is_empty() => {
            EnvFilter::try_new(directives).map_err(|e| LogError::InvalidConfig(e.to_string()))
        }
        _ => EnvFilter::try_new(level.as_str()).map_err(|e| LogError::InvalidConfig(e.to_string())),
    }
}

/// Initialize the global tracing subscriber.
///
/// # Errors
///
/// Returns [`LogError`] if:
/// - The log file directory cannot be created
/// - The subscriber cannot be initialized (e.g., already initialized)
pub fn init_logging(config: &LogConfig) -> Result<LogGuard, LogError> {
    let filter = build_filter(config.level)?;

    let (file_writer, guard) = if let Some(ref path) = config.file_path {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => std::path::Path::new("."),
        };
        std::fs::create_dir_all(dir)
            .map_err(|e| LogError::FileCreation(format!("{}: {}", dir.display(), e)))?;

        let filename = path
            .file_name()
            .and_then(|s| s.to_str())
            .ok_or_else(|| LogError::InvalidConfig("Invalid log file name".to_string()))?;

        let file_appender = tracing_appender::rolling::daily(dir, filename);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        (Some(non_blocking), Some(guard))
    } else {
        (None, None)
    };

    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.format {
        LogFormat::Pretty => {
            let stderr_layer = fmt::layer()
                .pretty()
                .with_writer(std::io::stderr)
                .with_target(true);
            let file_layer = file_writer.map(|writer| {
                fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_target(true)
            });
            registry.with(stderr_layer).with(file_layer).try_init()
        }
        LogFormat::Json => {
            let stderr_layer = fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_current_span(true);
            let file_layer = file_writer
                .map(|writer| fmt::layer().json().with_writer(writer).with_target(true));
            registry.with(stderr_layer).with(file_layer).try_init()
        }
        LogFormat::Compact => {
            let stderr_layer = fmt::layer()
                .compact()
                .with_writer(std::io::stderr)
                .with_target(true);
            let file_layer = file_writer.map(|writer| {
                fmt::layer()
                    .compact()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_target(true)
            });
            registry.with(stderr_layer).with(file_layer).try_init()
        }
    };

    result.map_err(|e| LogError::SubscriberInit(e.to_string()))?;

    Ok(LogGuard::new(guard))
}

/// Generate a new correlation ID: 32 lowercase hex characters.
///
/// # Example
///
/// ```
/// use spendgate::logging::new_correlation_id;
///
/// let id = new_correlation_id();
/// assert_eq!(id.len(), 32);
/// assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
/// ```
#[must_use]
pub fn new_correlation_id() -> String {
    use std::fmt::Write;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let counter = COUNTER.fetch_add(1, Ordering::Relaxed);

    // Only the low 64 bits matter.
    #[allow(clippy::cast_possible_truncation)]
    let seed = (nanos as u64) ^ counter.rotate_left(32) ^ u64::from(std::process::id());

    // splitmix64 scramble; not cryptographic
    let mut state = seed;
    let mut next = || {
        state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    };

    let mut hex = String::with_capacity(32);
    for word in [next(), next()] {
        // write! to String is infallible
        let _ = write!(hex, "{word:016x}");
    }
    hex
}

/// Convert a `-v` count to a [`LogLevel`].
///
/// | Verbosity | Level |
/// |-----------|-------|
/// | 0         | Warn  |
/// | 1         | Info  |
/// | 2         | Debug |
/// | 3+        | Trace |
#[must_use]
pub const fn verbosity_to_level(verbosity: u8) -> LogLevel {
    match verbosity {
        0 => LogLevel::Warn,
        1 => LogLevel::Info,
        2 => LogLevel::Debug,
        _ => LogLevel::Trace,
    }
}
