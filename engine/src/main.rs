// Oopsie task assistant
// Main entry point for the oopsie binary

use std::process::ExitCode;

use clap::Parser;
use oopsie_engine::cli::{Cli, Command, ConfigAction};
use oopsie_engine::config::Config;
use oopsie_engine::handlers::{
    handle_ask, handle_chat, handle_config_path, handle_config_show, OutputFormat,
};
use oopsie_engine::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration (or use custom path if provided)
    let config = if let Some(config_path) = &cli.config {
        Config::load_from_path(config_path)?
    } else {
        Config::load_or_create()?
    };

    // --log wins over the configured level, RUST_LOG wins over both
    let log_level = cli.log.as_deref().unwrap_or(&config.core.log_level);
    init_telemetry(log_level);

    let version = env!("CARGO_PKG_VERSION");
    let commit = env!("GIT_COMMIT_HASH");
    let timestamp = env!("BUILD_TIMESTAMP");

    tracing::debug!("Oopsie v{} ({} - {})", version, commit, timestamp);

    // Determine output format
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    // Handle commands
    match cli.command {
        Command::Chat { user } => handle_chat(user, &config).await?,

        Command::Ask { text, user } => return handle_ask(text, user, &config, format).await,

        Command::Config { action } => match action.unwrap_or_default() {
            ConfigAction::Show => handle_config_show(&config, format)?,
            ConfigAction::Path => handle_config_path(cli.config.as_deref())?,
        },
    }

    Ok(ExitCode::SUCCESS)
}
