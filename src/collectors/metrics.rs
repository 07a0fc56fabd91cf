//! Prometheus-backed metrics registry.
//!
//! Wraps a `PrometheusHandle` from `metrics-exporter-prometheus`. Anything
//! recorded through the `metrics` facade while the recorder is installed
//! shows up in the rendered snapshot.

use axum::body::Bytes;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use super::{CollectorError, MetricsRegistry, MetricsSnapshot};

/// Content type of the Prometheus text exposition format.
pub const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Registry that renders the Prometheus text exposition format.
#[derive(Clone)]
pub struct PrometheusRegistry {
    handle: PrometheusHandle,
}

impl PrometheusRegistry {
    /// Install the Prometheus recorder as the process-wide `metrics` recorder.
    ///
    /// Fails if another global recorder is already installed.
    pub fn install() -> Result<Self, CollectorError> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .map_err(|e| CollectorError::Unavailable(e.to_string()))?;

        tracing::info!("Prometheus recorder installed");
        Ok(Self { handle })
    }

    /// Wrap an existing handle, e.g. one from a locally scoped recorder.
    pub fn from_handle(handle: PrometheusHandle) -> Self {
        Self { handle }
    }
}

impl MetricsRegistry for PrometheusRegistry {
    fn snapshot(&self) -> Result<MetricsSnapshot, CollectorError> {
        Ok(MetricsSnapshot {
            content_type: EXPOSITION_CONTENT_TYPE.to_string(),
            body: Bytes::from(self.handle.render()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_renders_counter() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let registry = PrometheusRegistry::from_handle(recorder.handle());

        ::metrics::with_local_recorder(&recorder, || {
            ::metrics::counter!("jobs_processed_total").increment(7);
        });

        let snapshot = registry.snapshot().unwrap();
        let text = String::from_utf8(snapshot.body.to_vec()).unwrap();

        assert_eq!(snapshot.content_type, EXPOSITION_CONTENT_TYPE);
        assert!(text.lines().any(|l| l == "jobs_processed_total 7"), "got: {}", text);
    }

    #[test]
    fn test_empty_registry_renders_empty_body() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let registry = PrometheusRegistry::from_handle(recorder.handle());

        let snapshot = registry.snapshot().unwrap();
        assert!(snapshot.body.iter().all(|b| b.is_ascii_whitespace()));
    }
}
