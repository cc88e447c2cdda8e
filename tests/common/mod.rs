//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tokio::task::JoinHandle;
use tower::ServiceExt;

use api_starter::config::{AppConfig, Environment};
use api_starter::lifecycle::{Application, Shutdown};
use api_starter::observability::{BufferConsole, Logger, LoggerSettings, MemoryCollector};
use api_starter::HttpServer;

/// Config for in-process tests: test environment, collector forwarding on,
/// diagnostics exposed.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.environment = Environment::Test;
    config.server.bind_address = "127.0.0.1:0".to_string();
    config.collector.enabled = true;
    config.collector.logging_enabled = true;
    config.logging.console_colors = false;
    config.response.expose_diagnostics = Some(true);
    config
}

/// Logger writing to memory, plus handles to what it recorded.
pub struct Captured {
    pub logger: Logger,
    pub console: Arc<BufferConsole>,
    pub collector: Arc<MemoryCollector>,
}

pub fn captured_logger(config: &AppConfig) -> Captured {
    let console = Arc::new(BufferConsole::new());
    let collector = Arc::new(MemoryCollector::new());
    let logger = Logger::new(LoggerSettings::from_config(config))
        .with_console(console.clone())
        .with_collector(collector.clone());
    Captured {
        logger,
        console,
        collector,
    }
}

/// Fully layered router plus the captured logger outputs.
pub fn test_app() -> (Router, Captured) {
    test_app_with(test_config())
}

pub fn test_app_with(config: AppConfig) -> (Router, Captured) {
    let captured = captured_logger(&config);
    let server = HttpServer::new(config, captured.logger.clone());
    (server.router(), captured)
}

pub fn json_request(method: Method, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Drive one request through `router`; an empty body decodes as `Value::Null`.
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, body)
}

/// A real server on an ephemeral port.
pub struct RunningApp {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<std::io::Result<()>>,
}

impl RunningApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

pub async fn spawn_app(config: AppConfig) -> RunningApp {
    let captured = captured_logger(&config);
    let app = Application::with_logger(config, captured.logger).await.unwrap();
    let addr = app.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let handle = tokio::spawn(app.run(shutdown.subscribe()));

    RunningApp {
        addr,
        shutdown,
        handle,
    }
}
