//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Exporter produces:
//!     → logging.rs (structured log events)
//!     → metrics.rs (its own request counters and latency)
//!     → tracing.rs (request spans with correlation IDs)
//! ```
//!
//! # Design Decisions
//! - Self-metrics go through the `metrics` facade, so they land in the
//!   same registry `/metrics` renders
//! - Route labels are bounded: unmatched paths share one label

pub mod logging;
pub mod metrics;
pub mod tracing;
