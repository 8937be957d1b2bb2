//! Runtime configuration for the console logger

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::Level;

use crate::logger::error::LoggerError;

/// Console logger configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// Level name or an `EnvFilter` directive such as `stash=debug,redis=warn`
    pub level: String,
    pub format: LogFormat,
    /// Colors are only emitted when stderr is a terminal
    pub colored: bool,
}

impl LoggerConfig {
    /// Parse the level string into a `tracing::Level` when it is a plain level name
    pub fn parse_level(&self) -> Result<Level, LoggerError> {
        self.level
            .trim()
            .parse::<Level>()
            .map_err(|_| LoggerError::config(format!("invalid log level '{}'", self.level)))
    }

    /// Replace the level, used for `-v` / `-q` style overrides
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level.to_string().to_lowercase();
        self
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
            colored: true,
        }
    }
}

/// Log format options
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full" => Ok(LogFormat::Full),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            _ => Err(LoggerError::format(format!(
                "invalid log format '{s}', valid formats are: full, compact, json"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_str() {
        assert_eq!("full".parse::<LogFormat>().unwrap(), LogFormat::Full);
        assert_eq!("COMPACT".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert_eq!("Json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("pretty".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_parse_level() {
        let config = LoggerConfig {
            level: "WARN".to_string(),
            ..Default::default()
        };
        assert_eq!(config.parse_level().unwrap(), Level::WARN);

        let config = LoggerConfig {
            level: "stash=debug".to_string(),
            ..Default::default()
        };
        assert!(config.parse_level().is_err());
    }

    #[test]
    fn test_with_level_override() {
        let config = LoggerConfig::default().with_level(Level::TRACE);
        assert_eq!(config.level, "trace");
    }
}
