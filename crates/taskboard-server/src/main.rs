use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use taskboard_core::{AppConfig, StorageBackend};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "taskboard-server")]
#[command(about = "Task board backend with atomic card moves", long_about = None)]
#[command(version)]
struct Args {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Address to listen on, e.g. 0.0.0.0:8017
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,

    /// Storage backend: memory or sqlite
    #[arg(long, value_name = "BACKEND")]
    storage: Option<StorageBackend>,

    /// SQLite database file
    #[arg(long, value_name = "FILE")]
    database: Option<PathBuf>,
}

fn load_config(args: Args) -> Result<AppConfig> {
    let mut config =
        AppConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    config
        .apply_env()
        .context("Invalid TASKBOARD_* environment override")?;

    if let Some(bind) = args.bind {
        config.bind_address = bind;
    }
    if let Some(storage) = args.storage {
        config.storage = storage;
    }
    if let Some(database) = args.database {
        config.database_path = database;
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config(Args::parse())?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!(
        "Starting taskboard server on {} ({:?} storage)",
        config.bind_address,
        config.storage
    );

    taskboard_server::serve(config).await?;
    Ok(())
}
