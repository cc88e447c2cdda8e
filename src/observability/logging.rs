//! Framework diagnostics via `tracing`.
//!
//! # Responsibilities
//! - Initialize the `tracing` subscriber for framework-level events
//!   (startup, request traces, collector delivery failures)
//! - Honor `RUST_LOG` over the configured filter
//!
//! # Design Decisions
//! - Application events go through `Logger`, not `tracing`
//! - Safe to call more than once; later calls are no-ops

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Initialize the global `tracing` subscriber.
pub fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.filter));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_ansi(config.console_colors))
        .try_init();
}
