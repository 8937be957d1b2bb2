//! Configuration validation
//!
//! Only values this crate interprets itself are checked here. Connection
//! details such as hosts and credentials are left to the redis client.

use crate::config::error::ConfigError;
use crate::config::settings::{
    CacheBackend, CacheConfig, LockConfig, LoggerSettings, RedisCacheConfig, Settings,
};

/// Valid log levels
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Valid log formats
const VALID_LOG_FORMATS: &[&str] = &["full", "compact", "json"];

impl LoggerSettings {
    /// Validate logger settings
    ///
    /// # Validation Rules
    /// - Log level must be one of: trace, debug, info, warn, error
    /// - Log format must be one of: full, compact, json
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::validation(
                "logger.level",
                format!(
                    "'{}' is not a log level, expected one of: {}",
                    self.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            ));
        }

        if !VALID_LOG_FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigError::validation(
                "logger.format",
                format!(
                    "'{}' is not a log format, expected one of: {}",
                    self.format,
                    VALID_LOG_FORMATS.join(", ")
                ),
            ));
        }

        Ok(())
    }
}

impl RedisCacheConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::validation(
                "cache.redis.host",
                "Redis host is required when the redis backend is selected.",
            ));
        }

        if self.pool_size == 0 {
            return Err(ConfigError::validation(
                "cache.redis.pool_size",
                "Pool size must be greater than 0.",
            ));
        }

        if self.connection_timeout == 0 {
            return Err(ConfigError::validation(
                "cache.redis.connection_timeout",
                "Connection timeout must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }
}

impl LockConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::validation(
                "cache.lock.poll_interval_ms",
                "Lock poll interval must be greater than 0 milliseconds.",
            ));
        }
        Ok(())
    }
}

impl CacheConfig {
    /// Validate cache settings
    ///
    /// Redis connection details are only checked when the redis backend is
    /// selected. A zero pool size is rejected regardless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.backend == CacheBackend::Redis {
            self.redis.validate()?;
        } else if self.redis.pool_size == 0 {
            return Err(ConfigError::validation(
                "cache.redis.pool_size",
                "Pool size must be greater than 0.",
            ));
        }

        self.lock.validate()
    }
}

impl Settings {
    /// Validate all configuration settings
    ///
    /// Returns the first validation error encountered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.logger.validate()?;
        self.cache.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_field(result: Result<(), ConfigError>, expected: &str) {
        let err = result.unwrap_err();
        assert_eq!(err.field(), Some(expected), "unexpected error: {err}");
    }

    #[test]
    fn test_default_settings_are_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_logger_levels_case_insensitive() {
        for level in ["trace", "DEBUG", "Info", "warn", "error"] {
            let settings = LoggerSettings {
                level: level.to_string(),
                ..Default::default()
            };
            assert!(settings.validate().is_ok(), "level should be valid: {level}");
        }
    }

    #[test]
    fn test_logger_invalid_level() {
        let settings = LoggerSettings {
            level: "verbose".to_string(),
            ..Default::default()
        };
        assert_field(settings.validate(), "logger.level");
    }

    #[test]
    fn test_logger_invalid_format() {
        let settings = LoggerSettings {
            format: "pretty".to_string(),
            ..Default::default()
        };
        assert_field(settings.validate(), "logger.format");
    }

    #[test]
    fn test_redis_checked_when_selected() {
        let mut config = CacheConfig {
            backend: CacheBackend::Redis,
            ..Default::default()
        };
        config.redis.host = " ".to_string();
        assert_field(config.validate(), "cache.redis.host");

        config.redis.host = "localhost".to_string();
        config.redis.connection_timeout = 0;
        assert_field(config.validate(), "cache.redis.connection_timeout");
    }

    #[test]
    fn test_redis_host_ignored_for_memory_backend() {
        let mut config = CacheConfig::default();
        config.redis.host = String::new();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_pool_size_always_rejected() {
        let mut config = CacheConfig::default();
        config.redis.pool_size = 0;
        assert_field(config.validate(), "cache.redis.pool_size");
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let mut settings = Settings::default();
        settings.cache.lock.poll_interval_ms = 0;
        assert_field(settings.validate(), "cache.lock.poll_interval_ms");
    }
}
