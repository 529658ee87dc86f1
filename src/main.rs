use anyhow::{Context, Result};
use clap::Parser;
use job_posting::admin_cli::{handle_command, Cli, Command};
use job_posting::core::ConfigManager;
use std::fs::OpenOptions;
use tracing::info;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "job_posting=info,jobposting=info,rocket::server=off";

fn init_logging(config: &ConfigManager) -> Result<()> {
    let file_layer = match &config.environment.log_path {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            Some(
                fmt::layer()
                    .json()
                    .with_writer(file)
                    .with_current_span(false)
                    .with_span_list(false),
            )
        }
        None => None,
    };
    let stdout_layer = file_layer.is_none().then(fmt::layer);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stdout_layer)
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ConfigManager::load()?;
    if let Some(path) = cli.database_path {
        config.environment.database_path = path;
    }
    config.ensure_directories().await?;
    init_logging(&config)?;

    info!("Environment: {}", config.environment_name);
    info!("Database: {}", config.environment.database_path.display());

    handle_command(cli.command.unwrap_or(Command::Serve), &config).await
}
