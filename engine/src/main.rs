// Persona quiz engine
// Main entry point for the persona binary

use clap::Parser;
use persona_engine::cli::{Cli, Command};
use persona_engine::config::Config;
use persona_engine::handlers::{
    handle_actions, handle_doctor, handle_serve, handle_turn, OutputFormat,
};
use persona_engine::telemetry::init_telemetry_with_level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration (or use custom path if provided)
    let config = if let Some(config_path) = &cli.config {
        Config::load_from_path(config_path)?
    } else {
        Config::load_or_create()?
    };

    // --log wins over the configured level; RUST_LOG wins over both
    let log_level = cli.log.as_deref().unwrap_or(&config.core.log_level);
    init_telemetry_with_level(log_level);

    let version = env!("CARGO_PKG_VERSION");
    let commit = env!("GIT_COMMIT_HASH");
    let timestamp = env!("BUILD_TIMESTAMP");

    tracing::info!("Persona Engine v{} ({} - {})", version, commit, timestamp);

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    match cli.command {
        Command::Serve { host, port } => {
            tracing::info!("Starting fulfillment webhook...");
            handle_serve(&config, host, port).await
        }

        Command::Turn { request, seed } => {
            tracing::info!("Running one turn from {}", request.display());
            handle_turn(&config, &request, seed, format).await
        }

        Command::Actions => handle_actions(format),

        Command::Doctor => {
            tracing::info!("Running diagnostics...");
            handle_doctor(&config, format).await
        }
    }
}
