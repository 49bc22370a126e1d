//! Structured logging for bindery.
//!
//! Binding stages log through `tracing`; this module installs a
//! `tracing-subscriber` fmt layer that writes them as JSON (production) or
//! in the pretty human-readable format (development).
//!
//! # Example
//!
//! ```rust,ignore
//! use bindery_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development())?;
//!
//! tracing::debug!(binding = "json", errors = 0, "request bound");
//! ```

use crate::error::TelemetryError;
use crate::TelemetryResult;
use bindery_config::{LogFormat, LoggingSection};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Whether logging is enabled.
    pub enabled: bool,

    /// Filter directive (e.g., "info", "bindery_middleware=trace").
    pub level: String,

    /// Whether to output JSON format.
    pub json_format: bool,

    /// Whether to emit ANSI colors (pretty format only).
    pub ansi: bool,

    /// Whether to include file/line info.
    pub file_line_info: bool,

    /// Whether to include target (module path).
    pub include_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::production()
    }
}

impl LogConfig {
    /// Creates a development configuration with human-readable output.
    #[must_use]
    pub fn development() -> Self {
        Self {
            enabled: true,
            level: "debug".to_string(),
            json_format: false,
            ansi: true,
            file_line_info: true,
            include_target: true,
        }
    }

    /// Creates a production configuration with JSON output.
    #[must_use]
    pub fn production() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            json_format: true,
            ansi: false,
            file_line_info: false,
            include_target: true,
        }
    }
}

impl From<&LoggingSection> for LogConfig {
    fn from(section: &LoggingSection) -> Self {
        let base = match section.format {
            LogFormat::Json => Self::production(),
            LogFormat::Pretty => Self::development(),
        };
        Self {
            level: section.level.clone(),
            ansi: section.ansi_enabled,
            ..base
        }
    }
}

/// Initializes the global logging subscriber.
///
/// # Errors
///
/// Returns an error if the level is not a valid filter directive or a global
/// subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = create_env_filter(&config.level)?;

    if config.json_format {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_file(config.file_line_info)
            .with_line_number(config.file_line_info)
            .with_target(config.include_target)
            .with_filter(filter);

        tracing_subscriber::registry()
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .pretty()
            .with_ansi(config.ansi)
            .with_file(config.file_line_info)
            .with_line_number(config.file_line_info)
            .with_target(config.include_target)
            .with_filter(filter);

        tracing_subscriber::registry()
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    }

    Ok(())
}

/// Creates an env filter from a directive string.
///
/// # Errors
///
/// Returns error if the directive is invalid.
pub fn create_env_filter(filter: &str) -> TelemetryResult<EnvFilter> {
    EnvFilter::try_new(filter).map_err(|e| TelemetryError::InvalidFilter {
        filter: filter.to_string(),
        reason: e.to_string(),
    })
}

/// Standard log field names used by binding stages.
pub mod fields {
    /// Encoding of the binding stage (`json`, `yaml`, `form`, `multipart_form`).
    pub const BINDING: &str = "binding";

    /// Request ID field name.
    pub const REQUEST_ID: &str = "request_id";

    /// Number of errors collected for the request.
    pub const ERRORS: &str = "errors";

    /// Form key being mapped.
    pub const KEY: &str = "key";

    /// Multipart field name.
    pub const FIELD: &str = "field";

    /// Error message field name.
    pub const ERROR: &str = "error";
}
