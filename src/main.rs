use std::process::ExitCode;

use clap::Parser;
use stash::cli::{Cli, execute_command, init_logger_from_settings, load_and_merge_config};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let settings = load_and_merge_config(&cli)?;
    init_logger_from_settings(&settings)?;

    tracing::debug!(
        backend = ?settings.cache.backend,
        store = %settings.cache.store,
        "configuration loaded"
    );

    let output = execute_command(&cli, settings).await?;
    for line in &output.lines {
        println!("{line}");
    }

    Ok(if output.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
