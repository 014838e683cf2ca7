use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use poolscout::application::{Cli, CommandExecutor};
use poolscout::shared::config::ConfigLoader;
use poolscout::shared::logging::init_tracing;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!(error = ?e, "Fatal error");
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // A missing .env is fine
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Priority: CLI args > environment > config file > defaults
    let mut config = ConfigLoader::load(cli.config.as_deref()).context("Failed to load configuration")?;
    config.apply_overrides(&cli.command.overrides(cli.json_logs));
    config.validate()?;

    init_tracing(&config.logging)?;
    info!(version = env!("CARGO_PKG_VERSION"), "poolscout starting");
    match ConfigLoader::config_path(cli.config.as_deref()) {
        Some(path) => info!(path = %path.display(), "Loaded config file"),
        None => info!("No config file found, using defaults"),
    }

    CommandExecutor::execute(cli.command, config).await
}
