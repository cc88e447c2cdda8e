//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (request ID, tracing, panic capture, timeout, body limit)
//! - Turn unmatched routes and middleware failures into error envelopes
//! - Serve on a listener until the shutdown signal fires
//!
//! # Middleware Order (outermost first)
//! ```text
//! SetRequestId → Trace → PropagateRequestId → ScopeRequestId → CatchPanic → HandleError → Timeout → BodyLimit → routes
//! ```

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::extract::{DefaultBodyLimit, FromRef, State};
use axum::http::{HeaderMap, Method, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{BoxError, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::http::envelope::{
    build_error, build_success, EnvelopeSettings, ErrorEnvelope, ErrorOptions, SuccessEnvelope, SuccessOptions,
};
use crate::http::error::{ApiError, INTERNAL_ERROR_MESSAGE};
use crate::http::pagination::PaginatedOptions;
use crate::http::request::{
    current_request_id, propagate_request_id_layer, request_id_from_headers, scope_request_id, set_request_id_layer,
    RequestId,
};
use crate::http::status::StatusKey;
use crate::lifecycle::ShutdownSignal;
use crate::notes::{self, NoteStore};
use crate::observability::Logger;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub logger: Logger,
    pub notes: NoteStore,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, logger: Logger) -> Self {
        Self {
            config,
            logger,
            notes: NoteStore::new(),
        }
    }

    /// Success options preloaded with the request id and timestamp setting.
    pub fn success_options<T>(&self, request_id: &RequestId) -> SuccessOptions<T> {
        SuccessOptions::new()
            .include_timestamp(self.config.response.include_timestamp)
            .request_id(request_id.0.clone())
    }

    pub fn paginated_options(&self, request_id: &RequestId) -> PaginatedOptions {
        PaginatedOptions::new()
            .include_timestamp(self.config.response.include_timestamp)
            .request_id(request_id.0.clone())
    }

    pub fn error_options(&self, request_id: &RequestId) -> ErrorOptions {
        EnvelopeSettings::from_ref(self).error_options(request_id.0.clone())
    }

    /// Convert a handler error into its envelope.
    ///
    /// Internal errors are logged (and forwarded to the collector) and only
    /// carry a `stack` when diagnostics are exposed.
    pub fn error(&self, error: ApiError, request_id: &RequestId) -> ErrorEnvelope {
        let mut options = self.error_options(request_id);

        if error.is_internal() {
            self.logger.error(
                &error.to_string(),
                json!({ "requestId": request_id.0, "detail": error.diagnostics() }),
            );
            if self.config.expose_diagnostics() {
                options = options.stack(error.diagnostics());
            }
        } else {
            tracing::debug!(
                request_id = ?request_id.0,
                status = %error.status(),
                error = %error,
                "Request rejected"
            );
        }

        error.into_envelope(options)
    }
}

impl FromRef<AppState> for EnvelopeSettings {
    fn from_ref(state: &AppState) -> Self {
        Self {
            include_timestamp: state.config.response.include_timestamp,
        }
    }
}

/// HTTP server for the API.
pub struct HttpServer {
    router: Router,
    config: Arc<AppConfig>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: AppConfig, logger: Logger) -> Self {
        let config = Arc::new(config);
        let state = AppState::new(config.clone(), logger.clone());
        let router = apply_middleware(build_routes(state), &config, logger);
        Self { router, config }
    }

    /// The fully layered router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Serve on `listener` until `shutdown` fires, then drain in-flight requests.
    pub async fn run(self, listener: TcpListener, mut shutdown: ShutdownSignal) -> std::io::Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            environment = %self.config.environment,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Application routes with fallbacks, without middleware.
pub fn build_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(notes::routes())
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(state)
}

/// Wrap `router` in the standard middleware stack.
pub fn apply_middleware(router: Router, config: &AppConfig, logger: Logger) -> Router {
    let settings = EnvelopeSettings {
        include_timestamp: config.response.include_timestamp,
    };
    let expose = config.expose_diagnostics();
    let timeout = Duration::from_secs(config.server.request_timeout_secs);

    let on_panic = move |panic: Box<dyn Any + Send + 'static>| -> Response {
        let detail = panic_message(panic.as_ref());
        let request_id = current_request_id();
        logger.error(
            "Unhandled panic while serving request",
            json!({ "panic": detail, "requestId": request_id }),
        );

        let mut options = settings.error_options(request_id);
        if expose {
            options = options.stack(detail);
        }
        build_error(StatusKey::InternalServerError, INTERNAL_ERROR_MESSAGE, options).into_response()
    };

    let on_middleware_error = move |headers: HeaderMap, error: BoxError| async move {
        let options = settings.error_options(request_id_from_headers(&headers));
        if error.is::<tower::timeout::error::Elapsed>() {
            build_error(StatusKey::RequestTimeout, "Request timed out", options)
        } else {
            tracing::error!(error = %error, "Unhandled middleware error");
            build_error(StatusKey::InternalServerError, INTERNAL_ERROR_MESSAGE, options)
        }
    };

    router
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        .layer(
            ServiceBuilder::new()
                .layer(set_request_id_layer())
                .layer(TraceLayer::new_for_http())
                .layer(propagate_request_id_layer())
                .layer(axum::middleware::from_fn(scope_request_id))
                .layer(CatchPanicLayer::custom(on_panic))
                .layer(HandleErrorLayer::new(on_middleware_error))
                .timeout(timeout),
        )
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}

async fn health(State(state): State<AppState>, request_id: RequestId) -> SuccessEnvelope<Value> {
    build_success(
        state
            .success_options(&request_id)
            .message("Service is healthy")
            .data(json!({
                "status": "ok",
                "version": env!("CARGO_PKG_VERSION"),
                "environment": state.config.environment.as_str(),
            })),
    )
}

async fn not_found(State(state): State<AppState>, request_id: RequestId, method: Method, uri: Uri) -> ErrorEnvelope {
    build_error(
        StatusKey::NotFound,
        format!("Route {} {} not found", method, uri.path()),
        state.error_options(&request_id),
    )
}

async fn method_not_allowed(State(state): State<AppState>, request_id: RequestId, method: Method) -> ErrorEnvelope {
    build_error(
        StatusKey::MethodNotAllowed,
        format!("Method {} is not allowed on this route", method),
        state.error_options(&request_id),
    )
}
