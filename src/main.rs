//! API starter service.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ─────────────▶ middleware ─▶ validation ─▶ handler ─▶ envelope ─▶ Client Response
//!                        │                          │
//!                        ▼                          ▼
//!                  ┌───────────┐            ┌──────────────┐
//!                  │  tracing  │            │    Logger    │──▶ console
//!                  │ (tower)   │            │              │──▶ collector (HTTP)
//!                  └───────────┘            └──────────────┘
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use api_starter::config::{load_config, AppConfig, Environment};
use api_starter::lifecycle::{shutdown_signal, Application, Shutdown};
use api_starter::observability::logging::init_tracing;

#[derive(Parser)]
#[command(name = "api-starter")]
#[command(about = "JSON API service with envelopes, validation and collector-backed logging", long_about = None)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, env = "API_STARTER_CONFIG")]
    config: Option<PathBuf>,

    /// Override the configured environment
    #[arg(short, long)]
    environment: Option<Environment>,

    /// Override the bind address
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path).with_context(|| format!("loading {}", path.display()))?,
        None => AppConfig::default(),
    };
    if let Some(environment) = cli.environment {
        config.environment = environment;
    }
    if let Some(bind) = cli.bind {
        config.server.bind_address = bind;
    }

    init_tracing(&config.logging);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment,
        bind_address = %config.server.bind_address,
        request_timeout_secs = config.server.request_timeout_secs,
        collector_enabled = config.collector.enabled,
        "Configuration loaded"
    );

    let app = Application::build(config).await?;
    let logger = app.logger().clone();

    let shutdown = Shutdown::new();
    let server = tokio::spawn(app.run(shutdown.subscribe()));

    shutdown_signal().await;
    shutdown.trigger();

    server.await.context("server task panicked")??;
    logger.log("Shutdown complete", ());
    Ok(())
}
