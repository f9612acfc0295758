//! Response handling.
//!
//! # Responsibilities
//! - Turn the upstream response into the client response
//! - Strip hop-by-hop headers
//!
//! # Design Decisions
//! - The body is streamed chunk by chunk, never buffered
//! - Status and end-to-end headers pass through untouched

use axum::body::Body;
use axum::response::Response;

use crate::http::headers::remove_hop_by_hop;

/// Convert an upstream response into one that can be returned to the client.
pub fn into_client_response(upstream: reqwest::Response) -> Response {
    let status = upstream.status();
    let mut headers = upstream.headers().clone();
    remove_hop_by_hop(&mut headers);

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
