//! Structured logging setup using tracing
//!
//! Console output is always on; a JSON file layer with rotation is added when
//! `logging.local_enabled` is set. Each export runs inside an [`export_span`],
//! so file records carry the image, format, bucket and (once submitted) the
//! task id of the export they belong to.

use crate::config::LoggingConfig;
use crate::domain::{ExportError, ExportRequest, Result};
use tracing::{field, Level, Span};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// File name of the rolling JSON log inside `logging.local_path`
pub const LOG_FILE_NAME: &str = "vmexport.log";

/// Name of the span wrapping one export
pub const EXPORT_SPAN: &str = "export";

/// HTTP stack crates that are only interesting when something breaks
const QUIET_DEPENDENCIES: &[&str] = &["reqwest", "hyper", "rustls"];

/// Guard that must be kept alive for the duration of the program
/// to ensure logs are flushed properly
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

impl LoggingGuard {
    fn new(file_guard: Option<WorkerGuard>) -> Self {
        Self {
            _file_guard: file_guard,
        }
    }
}

/// Initialize the logging system
///
/// `RUST_LOG` takes precedence over `log_level_str` when set.
///
/// # Example
///
/// ```no_run
/// use vmexport::logging::init_logging;
/// use vmexport::config::LoggingConfig;
///
/// let config = LoggingConfig::default();
/// let _guard = init_logging("info", &config).expect("Failed to initialize logging");
/// ```
pub fn init_logging(log_level_str: &str, config: &LoggingConfig) -> Result<LoggingGuard> {
    let log_level = parse_log_level(log_level_str)?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(log_level)));

    let mut layers = Vec::new();

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_filter(env_filter.clone());

    layers.push(console_layer.boxed());

    let file_guard = if config.local_enabled {
        let rotation = parse_rotation(&config.local_rotation);

        std::fs::create_dir_all(&config.local_path).map_err(|e| {
            ExportError::Configuration(format!(
                "Failed to create log directory {}: {}",
                config.local_path, e
            ))
        })?;

        let file_appender = RollingFileAppender::new(rotation, &config.local_path, LOG_FILE_NAME);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        // Flat records with the enclosing export span's fields alongside
        let file_layer = tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(false)
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(non_blocking)
            .with_filter(env_filter);

        layers.push(file_layer.boxed());
        Some(guard)
    } else {
        None
    };

    tracing_subscriber::registry().with(layers).init();

    tracing::debug!(
        level = %log_level,
        local_enabled = config.local_enabled,
        local_path = %config.local_path,
        rotation = %config.local_rotation,
        "Logging initialized"
    );

    Ok(LoggingGuard::new(file_guard))
}

/// Span for one export, `task_id` is recorded once the service assigns it
///
/// # Example
///
/// ```
/// use vmexport::config::{validate, RawExportConfig};
/// use vmexport::logging::export_span;
///
/// let request = validate(&RawExportConfig {
///     image_id: "ami-1".to_string(),
///     disk_image_format: "vmdk".to_string(),
///     s3_bucket_name: "exports".to_string(),
///     ..Default::default()
/// })
/// .unwrap();
///
/// let span = export_span(&request);
/// span.record("task_id", "export-ami-1");
/// ```
pub fn export_span(request: &ExportRequest) -> Span {
    tracing::info_span!(
        EXPORT_SPAN,
        image_id = %request.image_id(),
        format = %request.disk_image_format(),
        bucket = %request.destination().bucket,
        task_id = field::Empty,
    )
}

/// Filter used when `RUST_LOG` is unset: our crate at `level`, the HTTP
/// stack at warn unless `level` is already stricter
fn default_directives(level: Level) -> String {
    let dependency_level = if level < Level::WARN { level } else { Level::WARN };
    std::iter::once(format!("vmexport={level}"))
        .chain(
            QUIET_DEPENDENCIES
                .iter()
                .map(|krate| format!("{krate}={dependency_level}")),
        )
        .collect::<Vec<_>>()
        .join(",")
}

fn parse_rotation(rotation: &str) -> Rotation {
    match rotation {
        "hourly" => Rotation::HOURLY,
        "never" => Rotation::NEVER,
        _ => Rotation::DAILY,
    }
}

/// Parse log level from string
fn parse_log_level(level_str: &str) -> Result<Level> {
    match level_str.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(ExportError::Configuration(format!(
            "Invalid log level: {level_str}. Must be one of: trace, debug, info, warn, error"
        ))),
    }
}
