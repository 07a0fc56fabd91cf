//! In-process telemetry endpoint.
//!
//! Serves a liveness probe, a Prometheus metrics snapshot, allocator and
//! runtime counters, and a live thread dump on a single port:
//!
//! | Path        | Body                                   |
//! |-------------|----------------------------------------|
//! | `/ping`     | `pong`                                 |
//! | `/metrics`  | Prometheus text exposition             |
//! | `/gc-stats` | JSON object of runtime counters        |
//! | `/threads`  | JSON array of `{name, backtrace}`      |
//!
//! Anything else is a `404 Not Found`.

pub mod collectors;
pub mod config;
pub mod dispatch;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::ExporterConfig;
pub use dispatch::Dispatcher;
pub use http::{spawn, ExporterHandle, ExporterServer};
pub use lifecycle::Shutdown;
