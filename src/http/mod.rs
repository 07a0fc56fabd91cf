//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → fallback handler: uri.path() → Dispatcher (blocking pool)
//!     → ResponseEnvelope → HTTP response
//! ```

pub mod server;

pub use server::{spawn, ExporterHandle, ExporterServer, ServerError};
