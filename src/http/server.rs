//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create an Axum Router whose single fallback feeds every request to the dispatcher
//! - Wire up middleware (panic recovery, optional access log)
//! - Serve until shutdown is signalled
//! - Record self-metrics per request
//!
//! # Design Decisions
//! - Method-agnostic: only the path is looked at
//! - Producers may block on procfs, so dispatch runs on the blocking pool
//! - Any fault reaching this layer still answers with a plain-text 500,
//!   including a producer that outlives `request_timeout_secs`

use std::any::Any;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{Request, Uri},
    response::{IntoResponse, Response},
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tower_http::{
    catch_panic::CatchPanicLayer,
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::ExporterConfig;
use crate::dispatch::{Dispatcher, ResponseEnvelope};
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::observability::tracing::make_request_span;

/// Error type for server operations.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Server task failed: {0}")]
    Task(String),
}

/// Application state injected into the handler.
#[derive(Clone)]
struct AppState {
    dispatcher: Dispatcher,
    self_metrics: bool,
    request_timeout: Duration,
}

/// HTTP server exposing the telemetry endpoints.
pub struct ExporterServer {
    router: Router,
    config: ExporterConfig,
}

impl ExporterServer {
    pub fn new(config: ExporterConfig, dispatcher: Dispatcher) -> Self {
        let state = AppState {
            dispatcher,
            self_metrics: config.observability.self_metrics,
            request_timeout: Duration::from_secs(config.listener.request_timeout_secs),
        };
        let router = Self::build_router(&config, state);

        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ExporterConfig, state: AppState) -> Router {
        let router = Router::new()
            .fallback(dispatch_handler)
            .with_state(state)
            .layer(CatchPanicLayer::custom(panic_response));

        if config.listener.access_log {
            router.layer(
                TraceLayer::new_for_http()
                    .make_span_with(|request: &Request<Body>| make_request_span(request))
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            )
        } else {
            router
        }
    }

    /// Serve on `listener` until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            access_log = self.config.listener.access_log,
            "Telemetry exporter listening"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("Telemetry exporter stopped");
        Ok(())
    }
}

/// A server running in the background of the host process.
pub struct ExporterHandle {
    local_addr: SocketAddr,
    shutdown: Shutdown,
    task: JoinHandle<Result<(), ServerError>>,
}

impl ExporterHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop the server and wait for it to finish.
    pub async fn shutdown(self) -> Result<(), ServerError> {
        self.shutdown.trigger();
        self.task
            .await
            .map_err(|e| ServerError::Task(e.to_string()))?
    }
}

/// Bind the configured address and serve in a background task.
pub async fn spawn(config: ExporterConfig, dispatcher: Dispatcher) -> Result<ExporterHandle, ServerError> {
    let address = config.listener.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| ServerError::Bind { address, source })?;
    let local_addr = listener.local_addr()?;

    let shutdown = Shutdown::new();
    let server = ExporterServer::new(config, dispatcher);
    let task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    Ok(ExporterHandle {
        local_addr,
        shutdown,
        task,
    })
}

async fn dispatch_handler(State(state): State<AppState>, uri: Uri) -> Response {
    let start = Instant::now();
    let route = metrics::route_label(uri.path());

    let dispatcher = state.dispatcher.clone();
    let path = uri.path().to_string();
    let task = tokio::task::spawn_blocking(move || dispatcher.dispatch(&path));

    // The blocking task cannot be cancelled; on timeout it finishes unobserved.
    let envelope = match tokio::time::timeout(state.request_timeout, task).await {
        Ok(Ok(envelope)) => envelope,
        Ok(Err(e)) => {
            tracing::error!(path = %uri.path(), error = %e, "Dispatch task failed");
            ResponseEnvelope::internal_error()
        }
        Err(_) => {
            tracing::error!(
                path = %uri.path(),
                timeout_secs = state.request_timeout.as_secs(),
                "Snapshot producer timed out"
            );
            ResponseEnvelope::internal_error()
        }
    };

    if state.self_metrics {
        metrics::record_request(route, envelope.status.as_u16(), start);
    }

    envelope.into_response()
}

fn panic_response(_panic: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!("Request handler panicked");
    ResponseEnvelope::internal_error().into_response()
}
