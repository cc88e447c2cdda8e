//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the collector and logger from configuration
//! - Assemble the HTTP server
//! - Bind the listener
//!
//! # Design Decisions
//! - Fail fast: an invalid collector endpoint or a busy port aborts startup
//! - Binding happens in `build`, so `local_addr` is known before serving
//!   (tests bind port 0)

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::AppConfig;
use crate::http::HttpServer;
use crate::lifecycle::ShutdownSignal;
use crate::observability::http_collector::CollectorError;
use crate::observability::{build_collector, Logger};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Failed to initialise collector: {0}")]
    Collector(#[from] CollectorError),

    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// A bound, ready-to-serve application.
pub struct Application {
    server: HttpServer,
    listener: TcpListener,
    logger: Logger,
}

impl Application {
    /// Build with a logger derived from `config`.
    pub async fn build(config: AppConfig) -> Result<Self, StartupError> {
        let collector = build_collector(&config)?;
        let logger = Logger::from_config(&config, collector);

        let mut runtime = serde_json::Map::new();
        runtime.insert("version".into(), env!("CARGO_PKG_VERSION").into());
        runtime.insert("environment".into(), config.environment.as_str().into());
        logger.collector().set_context("runtime", runtime);

        Self::with_logger(config, logger).await
    }

    /// Build with a caller-supplied logger.
    pub async fn with_logger(config: AppConfig, logger: Logger) -> Result<Self, StartupError> {
        let address = config.server.bind_address.clone();
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|source| StartupError::Bind { address, source })?;

        let server = HttpServer::new(config, logger.clone());
        Ok(Self { server, listener, logger })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Serve until `shutdown` fires.
    pub async fn run(self, shutdown: ShutdownSignal) -> std::io::Result<()> {
        let config = self.server.config();
        self.logger.log(
            "Application started",
            serde_json::json!({
                "address": self.listener.local_addr()?.to_string(),
                "environment": config.environment.as_str(),
            }),
        );
        self.server.run(self.listener, shutdown).await
    }
}
