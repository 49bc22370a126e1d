//! Structured logging for bindery.
//!
//! Library crates only emit `tracing` events. Applications call
//! [`init_logging`] once at startup to install a subscriber, usually from the
//! loaded configuration:
//!
//! ```rust,ignore
//! use bindery_config::ConfigLoader;
//! use bindery_telemetry::{init_logging, LogConfig};
//!
//! let config = ConfigLoader::new().with_env_prefix("BINDERY").load()?;
//! init_logging(&LogConfig::from(&config.logging))?;
//! ```

#![doc(html_root_url = "https://docs.rs/bindery-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, fields, init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
