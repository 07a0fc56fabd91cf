//! Snapshot producers consumed by the dispatcher.
//!
//! # Data Flow
//! ```text
//! Dispatcher
//!     → metrics.rs  (MetricsRegistry: exposition text + content type)
//!     → runtime.rs  (RuntimeStats: allocator / runtime counters)
//!     → threads.rs  (ThreadInspector: live threads + backtraces)
//! ```
//!
//! # Design Decisions
//! - Each producer sits behind a narrow trait so tests can inject doubles
//! - Producers are synchronous; the HTTP layer runs them on the blocking pool
//! - A producer either returns a full snapshot or a `CollectorError`

pub mod metrics;
pub mod runtime;
pub mod threads;

use std::collections::BTreeMap;

use axum::body::Bytes;
use serde::Serialize;
use thiserror::Error;

pub use self::metrics::PrometheusRegistry;
pub use self::runtime::{CountingAllocator, ProcessRuntimeStats};
pub use self::threads::ProcThreadInspector;

/// Errors raised by a snapshot producer.
#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Collector unavailable: {0}")]
    Unavailable(String),

    #[error("Encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A rendered metrics snapshot, ready to send.
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub content_type: String,
    pub body: Bytes,
}

/// One entry of a thread dump.
///
/// Both fields are nullable: the name may be unreadable, and the stack may
/// be unreadable or gone by the time the thread is inspected.
///
/// On Linux `name` is the kernel `comm`: at most 15 bytes, so longer names
/// are truncated, and an unnamed thread reports the `comm` it inherited from
/// the thread that spawned it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreadInfo {
    pub name: Option<String>,
    pub backtrace: Option<Vec<String>>,
}

/// Process-wide metrics registry.
pub trait MetricsRegistry: Send + Sync {
    fn snapshot(&self) -> Result<MetricsSnapshot, CollectorError>;
}

/// Allocator and runtime counters.
pub trait RuntimeStats: Send + Sync {
    fn snapshot(&self) -> Result<BTreeMap<String, u64>, CollectorError>;
}

/// Point-in-time enumeration of live threads.
pub trait ThreadInspector: Send + Sync {
    fn list_threads(&self) -> Result<Vec<ThreadInfo>, CollectorError>;
}
