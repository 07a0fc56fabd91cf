//! Request spans for access logging.
//!
//! Each request gets a span carrying a fresh UUID v4 request id so the
//! access log lines of one request can be correlated.

use axum::http::Request;
use ::tracing::Span;
use uuid::Uuid;

pub fn make_request_span<B>(request: &Request<B>) -> Span {
    ::tracing::info_span!(
        "request",
        request_id = %Uuid::new_v4(),
        method = %request.method(),
        path = %request.uri().path(),
    )
}
