//! The root configuration type.

use serde::{Deserialize, Serialize};

use crate::{BindingSection, ConfigError, LogFormat, LoggingSection};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Complete bindery configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use bindery_config::BinderyConfig;
///
/// let config = BinderyConfig::default();
/// assert_eq!(config.binding.max_form_size, 10 * 1024 * 1024);
/// assert_eq!(config.logging.level, "info");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct BinderyConfig {
    /// Binding limits.
    #[serde(default)]
    pub binding: BindingSection,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSection,
}

impl BinderyConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a ceiling is zero or the log
    /// level is not one of `trace`, `debug`, `info`, `warn` or `error`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.binding.max_memory == 0 {
            return Err(ConfigError::invalid_value(
                "binding.max_memory",
                "must be greater than zero",
            ));
        }

        if self.binding.max_form_size == 0 {
            return Err(ConfigError::invalid_value(
                "binding.max_form_size",
                "must be greater than zero",
            ));
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::invalid_value(
                "logging.level",
                format!("unknown log level: {}", self.logging.level),
            ));
        }

        Ok(())
    }

    /// Development preset: pretty, colored debug logs.
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.logging.ansi_enabled = true;
        config
    }

    /// Production preset: JSON info logs.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();
        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;
        config.logging.ansi_enabled = false;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(BinderyConfig::default().validate().is_ok());
    }

    #[test]
    fn test_presets() {
        let dev = BinderyConfig::development();
        assert_eq!(dev.logging.level, "debug");
        assert_eq!(dev.logging.format, LogFormat::Pretty);
        assert!(dev.validate().is_ok());

        let prod = BinderyConfig::production();
        assert_eq!(prod.logging.format, LogFormat::Json);
        assert!(!prod.logging.ansi_enabled);
    }

    #[test]
    fn test_zero_ceiling_rejected() {
        let mut config = BinderyConfig::default();
        config.binding.max_memory = 0;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("binding.max_memory"));
    }

    #[test]
    fn test_unknown_log_level_rejected() {
        let mut config = BinderyConfig::default();
        config.logging.level = "verbose".to_string();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("verbose"));
    }

    #[test]
    fn test_unknown_section_rejected() {
        let result: Result<BinderyConfig, _> = toml::from_str("[server]\nport = 80\n");
        assert!(result.is_err());
    }
}
