//! Shared utilities for integration tests.

use std::sync::Arc;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusRecorder};
use telemetry_exporter::collectors::PrometheusRegistry;
use telemetry_exporter::{spawn, Dispatcher, ExporterConfig, ExporterHandle};

/// Start an exporter on an ephemeral loopback port backed by a local recorder.
///
/// Returns the recorder so tests can record into exactly the registry being served.
pub async fn start_exporter() -> (ExporterHandle, PrometheusRecorder) {
    let recorder = PrometheusBuilder::new().build_recorder();
    let registry = PrometheusRegistry::from_handle(recorder.handle());

    let mut config = ExporterConfig::default();
    config.listener.host = "127.0.0.1".into();
    config.listener.port = 0;

    let handle = spawn(config, Dispatcher::with_registry(Arc::new(registry)))
        .await
        .expect("exporter failed to start");

    (handle, recorder)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

pub struct Reply {
    pub status: u16,
    pub content_type: String,
    pub body: String,
}

pub async fn get(handle: &ExporterHandle, path: &str) -> Reply {
    let res = client()
        .get(format!("http://{}{}", handle.local_addr(), path))
        .send()
        .await
        .expect("exporter unreachable");

    let status = res.status().as_u16();
    let content_type = res
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let body = res.text().await.unwrap();

    Reply {
        status,
        content_type,
        body,
    }
}

/// Minimal reader for the text exposition format: `name{labels} value` → (series, value).
#[allow(dead_code)]
pub fn parse_exposition(text: &str) -> Vec<(String, f64)> {
    text.lines()
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .filter_map(|l| {
            let (series, value) = l.rsplit_once(' ')?;
            Some((series.to_string(), value.parse().ok()?))
        })
        .collect()
}

/// Number of live threads in this process right now.
#[allow(dead_code)]
pub fn live_thread_count() -> usize {
    std::fs::read_dir("/proc/self/task")
        .map(|d| d.count())
        .unwrap_or(0)
}
