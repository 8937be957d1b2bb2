//! Command-line interface for stash
//!
//! - Argument parsing with clap
//! - Configuration merging (CLI args + config files)
//! - Command handlers for key/value and lock operations

pub mod config_merger;
pub mod executor;
pub mod handlers;
pub mod parser;

pub use config_merger::ConfigurationMerger;
pub use executor::execute_command;
pub use handlers::CommandOutput;
pub use parser::{Cli, Commands};

use anyhow::Context;

use crate::config::Settings;
use crate::logger::init_logger;

/// Load configuration for this invocation and apply CLI overrides
pub fn load_and_merge_config(cli: &Cli) -> anyhow::Result<Settings> {
    let merger = ConfigurationMerger::from_cli(cli).context("failed to load configuration")?;
    merger
        .merge_cli_args(cli)
        .context("invalid configuration after applying command-line overrides")
}

/// Install the global logger described by `settings`
pub fn init_logger_from_settings(settings: &Settings) -> anyhow::Result<()> {
    let config = settings.logger.clone().into_logger_config();
    init_logger(&config).context("failed to initialize logger")
}
