//! Merges command-line overrides into file based configuration

use std::path::Path;

use super::parser::Cli;
use crate::config::error::ConfigError;
use crate::config::{ConfigLoader, Settings};

/// Applies CLI overrides on top of loaded settings
///
/// Command-line flags take precedence over every configuration source.
pub struct ConfigurationMerger {
    base_config: Settings,
}

impl ConfigurationMerger {
    pub fn new(base_config: Settings) -> Self {
        Self { base_config }
    }

    /// Load settings for the given CLI invocation.
    ///
    /// `--config` switches the loader to single file mode and `--env`
    /// replaces the environment read from `STASH_APP_ENV`.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let mut loader = ConfigLoader::new()?;

        if let Some(path) = cli.config.as_deref() {
            Self::validate_config_file_access(path)?;
            loader = loader.with_file(path);
        }
        if let Some(env) = cli.env {
            loader = loader.with_environment(env.into());
        }

        Ok(Self::new(loader.load()?))
    }

    fn validate_config_file_access(path: &Path) -> Result<(), ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::validation(
                "config_file",
                format!("Configuration file does not exist or is not a file: '{}'", path.display()),
            ));
        }

        std::fs::File::open(path).map(|_| ()).map_err(|e| {
            ConfigError::validation(
                "config_file",
                format!("Cannot read configuration file '{}': {}", path.display(), e),
            )
        })
    }

    /// Apply CLI overrides and validate the result
    pub fn merge_cli_args(&self, cli: &Cli) -> Result<Settings, ConfigError> {
        let mut config = self.base_config.clone();

        if cli.verbose {
            config.logger.level = "debug".to_string();
        } else if cli.quiet {
            config.logger.level = "error".to_string();
        }

        if let Some(backend) = cli.backend {
            config.cache.backend = backend.into();
        }
        if let Some(ref store) = cli.store {
            config.cache.store = store.clone();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn config(&self) -> &Settings {
        &self.base_config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheBackend;
    use clap::Parser;

    #[test]
    fn test_no_flags_keeps_base_config() {
        let merger = ConfigurationMerger::new(Settings::default());
        let cli = Cli::try_parse_from(["stash", "get", "k"]).unwrap();
        let merged = merger.merge_cli_args(&cli).unwrap();
        assert_eq!(&merged, merger.config());
    }

    #[test]
    fn test_verbose_and_quiet_levels() {
        let merger = ConfigurationMerger::new(Settings::default());

        let cli = Cli::try_parse_from(["stash", "--verbose", "get", "k"]).unwrap();
        assert_eq!(merger.merge_cli_args(&cli).unwrap().logger.level, "debug");

        let cli = Cli::try_parse_from(["stash", "--quiet", "get", "k"]).unwrap();
        assert_eq!(merger.merge_cli_args(&cli).unwrap().logger.level, "error");
    }

    #[test]
    fn test_backend_and_store_overrides() {
        let merger = ConfigurationMerger::new(Settings::default());
        let cli = Cli::try_parse_from([
            "stash", "--backend", "redis", "--store", "sessions", "has", "k",
        ])
        .unwrap();
        let merged = merger.merge_cli_args(&cli).unwrap();
        assert_eq!(merged.cache.backend, CacheBackend::Redis);
        assert_eq!(merged.cache.store, "sessions");
    }

    #[test]
    fn test_merged_config_is_validated() {
        let mut base = Settings::default();
        base.cache.redis.host = String::new();
        let merger = ConfigurationMerger::new(base);

        let cli = Cli::try_parse_from(["stash", "--backend", "redis", "get", "k"]).unwrap();
        assert!(merger.merge_cli_args(&cli).is_err());
    }

    #[test]
    fn test_missing_config_file_is_rejected() {
        let err = ConfigurationMerger::validate_config_file_access(Path::new(
            "/definitely/not/here.toml",
        ))
        .unwrap_err();
        assert_eq!(err.field(), Some("config_file"));
    }
}
