//! Path → response dispatch.
//!
//! # Responsibilities
//! - Select the route for a request path
//! - Invoke the matching snapshot producer
//! - Wrap the result into a `ResponseEnvelope`
//!
//! # Design Decisions
//! - Producers are injected, never reached through globals
//! - A producer error becomes a 500 for that request only (fail-fast)
//! - Per-thread observation gaps are not errors; the producer reports nulls

use std::sync::Arc;

use crate::collectors::{
    CollectorError, MetricsRegistry, ProcThreadInspector, ProcessRuntimeStats, RuntimeStats,
    ThreadInspector,
};
use crate::dispatch::response::{ResponseEnvelope, APPLICATION_JSON, TEXT_PLAIN};
use crate::dispatch::route::Route;

/// Stateless dispatcher over a fixed route table.
///
/// Cheap to clone; all producers are shared.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<dyn MetricsRegistry>,
    runtime: Arc<dyn RuntimeStats>,
    threads: Arc<dyn ThreadInspector>,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<dyn MetricsRegistry>,
        runtime: Arc<dyn RuntimeStats>,
        threads: Arc<dyn ThreadInspector>,
    ) -> Self {
        Self {
            registry,
            runtime,
            threads,
        }
    }

    /// Dispatcher using the given registry and the default process producers.
    pub fn with_registry(registry: Arc<dyn MetricsRegistry>) -> Self {
        Self::new(
            registry,
            Arc::new(ProcessRuntimeStats::new()),
            Arc::new(ProcThreadInspector::new()),
        )
    }

    /// Map a request path to a response. Never fails.
    pub fn dispatch(&self, path: &str) -> ResponseEnvelope {
        let Some(route) = Route::from_path(path) else {
            tracing::debug!(path = %path, "No route matched");
            return ResponseEnvelope::not_found();
        };

        match self.handle(route) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::error!(route = route.name(), error = %e, "Snapshot producer failed");
                ResponseEnvelope::internal_error()
            }
        }
    }

    fn handle(&self, route: Route) -> Result<ResponseEnvelope, CollectorError> {
        match route {
            Route::Ping => Ok(ResponseEnvelope::ok(TEXT_PLAIN, "pong")),
            Route::Metrics => {
                let snapshot = self.registry.snapshot()?;
                Ok(ResponseEnvelope::ok(snapshot.content_type, snapshot.body))
            }
            Route::GcStats => {
                let stats = self.runtime.snapshot()?;
                Ok(ResponseEnvelope::ok(APPLICATION_JSON, serde_json::to_vec(&stats)?))
            }
            Route::Threads => {
                let threads = self.threads.list_threads()?;
                Ok(ResponseEnvelope::ok(APPLICATION_JSON, serde_json::to_vec(&threads)?))
            }
        }
    }
}
