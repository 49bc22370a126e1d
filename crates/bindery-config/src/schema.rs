//! Configuration section types.
//!
//! Each section maps to one table of the configuration file.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default memory ceiling for multipart file parts (10 MiB).
pub const DEFAULT_MAX_MEMORY: u64 = 10 << 20;

/// Default ceiling for url-encoded bodies (10 MiB).
pub const DEFAULT_MAX_FORM_SIZE: u64 = 10 << 20;

/// Binding limits shared by every binding stage.
///
/// # Example
///
/// ```
/// use bindery_config::BindingSection;
///
/// let section = BindingSection::default();
/// assert_eq!(section.max_memory, 10 * 1024 * 1024);
/// assert!(section.spill_dir.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BindingSection {
    /// Memory ceiling for multipart file parts, in bytes.
    #[serde(default = "default_max_memory")]
    pub max_memory: u64,

    /// Ceiling for url-encoded request bodies, in bytes.
    #[serde(default = "default_max_form_size")]
    pub max_form_size: u64,

    /// Directory for spilled uploads; the system temporary directory if unset.
    #[serde(default)]
    pub spill_dir: Option<PathBuf>,
}

impl Default for BindingSection {
    fn default() -> Self {
        Self {
            max_memory: default_max_memory(),
            max_form_size: default_max_form_size(),
            spill_dir: None,
        }
    }
}

fn default_max_memory() -> u64 {
    DEFAULT_MAX_MEMORY
}

fn default_max_form_size() -> u64 {
    DEFAULT_MAX_FORM_SIZE
}

/// Log output format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs (production).
    #[default]
    Json,
    /// Human-readable pretty format (development).
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include ANSI color codes in output.
    #[serde(default)]
    pub ansi_enabled: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            ansi_enabled: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_section_defaults_fill_missing_fields() {
        let section: BindingSection = toml::from_str("max_memory = 1024").unwrap();
        assert_eq!(section.max_memory, 1024);
        assert_eq!(section.max_form_size, DEFAULT_MAX_FORM_SIZE);
    }

    #[test]
    fn test_binding_section_rejects_unknown_fields() {
        let result: Result<BindingSection, _> = toml::from_str("max_memroy = 1");
        assert!(result.is_err());
    }

    #[test]
    fn test_log_format_deserialize() {
        let format: LogFormat = serde_json::from_str(r#""pretty""#).unwrap();
        assert_eq!(format, LogFormat::Pretty);

        let result: Result<LogFormat, _> = serde_json::from_str(r#""xml""#);
        assert!(result.is_err());
    }
}
