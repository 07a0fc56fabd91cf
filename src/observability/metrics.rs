//! Exporter self-instrumentation.
//!
//! # Metrics
//! - `exporter_requests_total` (counter): requests by route, status
//! - `exporter_request_duration_seconds` (histogram): dispatch latency by route

use std::time::Instant;

use crate::dispatch::Route;

pub const REQUESTS_TOTAL: &str = "exporter_requests_total";
pub const REQUEST_DURATION_SECONDS: &str = "exporter_request_duration_seconds";

/// Route label for a path. Unmatched paths share `unmatched`.
pub fn route_label(path: &str) -> &'static str {
    Route::from_path(path).map_or("unmatched", |r| r.name())
}

pub fn record_request(route: &'static str, status: u16, start: Instant) {
    ::metrics::counter!(REQUESTS_TOTAL, "route" => route, "status" => status.to_string())
        .increment(1);
    ::metrics::histogram!(REQUEST_DURATION_SECONDS, "route" => route)
        .record(start.elapsed().as_secs_f64());
}
