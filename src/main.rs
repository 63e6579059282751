//! Stockyard admin service
//!
//! Hosts the monitoring, quota and health endpoints and runs the background
//! monitoring jobs.

#![allow(missing_docs)]

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use stockyard::config::LogFormat;
use stockyard::monitoring::BackgroundTasks;
use stockyard::server::HttpServer;
use stockyard::utils::logging::init_logging;
use stockyard::{AppContext, Config};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "stockyard", version, about = "Stockyard observability and quota service")]
struct Cli {
    /// Configuration file path; environment variables are used when omitted
    #[arg(short, long, env = "STOCKYARD_CONFIG")]
    config: Option<PathBuf>,

    /// Override the admin bind host
    #[arg(long)]
    host: Option<String>,

    /// Override the admin bind port
    #[arg(short, long)]
    port: Option<u16>,

    /// Log output format: pretty or json
    #[arg(long)]
    log_format: Option<LogFormat>,
}

async fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = Config::from_file(path)
                .await
                .with_context(|| format!("loading {}", path.display()))?;
            config.apply_env_overrides()?;
            config
        }
        None => Config::from_env()?,
    };

    if let Some(host) = &cli.host {
        config.app.server.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.app.server.port = port;
    }
    if let Some(format) = cli.log_format {
        config.app.logging.format = format;
    }
    config.validate()?;
    Ok(config)
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli).await?;
    init_logging(&config.app.logging)?;
    info!(version = stockyard::VERSION, "Starting Stockyard");

    let context = AppContext::build(config)
        .await
        .context("building application context")?;
    let tasks = BackgroundTasks::start(context.monitoring.clone(), context.background_jobs());

    let server = HttpServer::new(&context).bind()?;
    let handle = server.handle();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown signal received");
                handle.stop(true).await;
            }
            Err(e) => error!(error = %e, "Failed to listen for Ctrl-C"),
        }
    });

    if let Err(e) = server.await {
        error!(error = %e, "HTTP server exited with an error");
    }
    tasks.shutdown().await;

    info!("Stockyard stopped");
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Environment defaults first; a missing .env is not an error.
    let _ = dotenvy::dotenv();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Display keeps the context chain readable
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
