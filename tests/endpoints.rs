//! End-to-end tests for the telemetry endpoints over real TCP.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};

mod common;

#[tokio::test]
async fn test_ping() {
    let (exporter, _recorder) = common::start_exporter().await;

    let first = common::get(&exporter, "/ping").await;
    let second = common::get(&exporter, "/ping").await;

    assert_eq!(first.status, 200);
    assert_eq!(first.content_type, "text/plain");
    assert_eq!(first.body, "pong");
    assert_eq!((first.status, first.content_type, first.body), (second.status, second.content_type, second.body));

    exporter.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_unknown_paths_are_404() {
    let (exporter, _recorder) = common::start_exporter().await;

    for path in ["/", "/Ping", "/metrics/", "/gc-stats/extra", "/threads.json", "/health"] {
        let reply = common::get(&exporter, path).await;
        assert_eq!(reply.status, 404, "path {}", path);
        assert_eq!(reply.content_type, "text/plain");
        assert_eq!(reply.body, "Not Found");
    }

    exporter.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_metrics_round_trip() {
    let (exporter, recorder) = common::start_exporter().await;

    metrics::with_local_recorder(&recorder, || {
        metrics::counter!("requests_total").increment(42);
        metrics::gauge!("queue_depth", "queue" => "emails").set(3.0);
    });

    let reply = common::get(&exporter, "/metrics").await;
    assert_eq!(reply.status, 200);
    assert_eq!(reply.content_type, "text/plain; version=0.0.4");
    assert!(reply.body.lines().any(|l| l == "requests_total 42"), "got: {}", reply.body);

    let parsed = common::parse_exposition(&reply.body);
    assert!(parsed.contains(&("requests_total".to_string(), 42.0)));
    assert!(parsed.contains(&(r#"queue_depth{queue="emails"}"#.to_string(), 3.0)));

    exporter.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_gc_stats_is_object() {
    let (exporter, _recorder) = common::start_exporter().await;

    let reply = common::get(&exporter, "/gc-stats").await;
    let value: serde_json::Value = serde_json::from_str(&reply.body).unwrap();

    assert_eq!(reply.status, 200);
    assert_eq!(reply.content_type, "application/json");
    let stats = value.as_object().expect("gc-stats must be a JSON object");
    assert!(stats.contains_key("allocations"));
    assert!(stats.contains_key("uptime_seconds"));
    assert!(stats.values().all(|v| v.is_u64()));

    exporter.shutdown().await.unwrap();
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_threads_lists_named_workers() {
    let (exporter, _recorder) = common::start_exporter().await;

    let (ready_tx, ready_rx) = mpsc::channel::<()>();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let release_rx = Arc::new(Mutex::new(release_rx));

    let workers: Vec<_> = (1..=3)
        .map(|i| {
            let ready = ready_tx.clone();
            let release = release_rx.clone();
            std::thread::Builder::new()
                .name(format!("worker-{}", i))
                .spawn(move || {
                    ready.send(()).unwrap();
                    let _ = release.lock().unwrap().recv();
                })
                .unwrap()
        })
        .collect();
    for _ in 0..3 {
        ready_rx.recv().unwrap();
    }

    // Warm the blocking pool so the thread count is stable across the call.
    common::get(&exporter, "/ping").await;
    let before = common::live_thread_count();
    let reply = common::get(&exporter, "/threads").await;
    let after = common::live_thread_count();

    assert_eq!(reply.status, 200);
    assert_eq!(reply.content_type, "application/json");

    let value: serde_json::Value = serde_json::from_str(&reply.body).unwrap();
    let entries = value.as_array().expect("threads must be a JSON array");

    let low = before.min(after).saturating_sub(1);
    let high = before.max(after) + 1;
    assert!((low..=high).contains(&entries.len()), "{} entries, {}..={} threads", entries.len(), low, high);

    for entry in entries {
        assert!(entry.get("name").is_some());
        assert!(entry.get("backtrace").is_some());
    }
    for i in 1..=3 {
        let name = format!("worker-{}", i);
        assert!(entries.iter().any(|e| e["name"] == name.as_str()), "missing {}", name);
    }

    drop(release_tx);
    for worker in workers {
        worker.join().unwrap();
    }
    exporter.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_shutdown_stops_listening() {
    let (exporter, _recorder) = common::start_exporter().await;
    let addr = exporter.local_addr();

    exporter.shutdown().await.unwrap();

    let result = common::client().get(format!("http://{}/ping", addr)).send().await;
    assert!(result.is_err());
}
