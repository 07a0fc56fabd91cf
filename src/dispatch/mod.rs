//! Request dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Request path
//!     → route.rs (exact lookup in the fixed route table)
//!     → dispatcher.rs (invoke the matching snapshot producer)
//!     → response.rs (status + content type + body)
//! ```
//!
//! # Design Decisions
//! - Route table is fixed at compile time; lookup is exact and case-sensitive
//! - Dispatch never fails: unmatched paths are a normal 404
//! - A failing producer yields a generic 500, never a dropped connection

pub mod dispatcher;
pub mod response;
pub mod route;

pub use dispatcher::Dispatcher;
pub use response::ResponseEnvelope;
pub use route::{Route, ROUTES};
