//! Per-request proxy errors.
//!
//! Every failure inside the forwarding pipeline ends up here. None of them are
//! fatal to the process: each is logged by the observer and turned into a
//! terminal client response.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors that can occur while proxying one request.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The inbound body could not be read to completion.
    #[error("failed to read request body: {0}")]
    BodyCapture(#[source] axum::Error),

    /// The forwarding URI could not be built.
    #[error("failed to rewrite request for upstream: {0}")]
    Rewrite(#[from] axum::http::Error),

    /// The outbound request could not be constructed.
    #[error("invalid upstream request: {0}")]
    InvalidRequest(#[source] reqwest::Error),

    /// No response head arrived within the transport deadline.
    #[error("upstream did not respond within {0:?}")]
    Timeout(Duration),

    /// Dialing the upstream failed (refused, unreachable, TLS).
    #[error("failed to connect to upstream: {0}")]
    Connect(#[source] reqwest::Error),

    /// Any other transport failure (reset, protocol error).
    #[error("upstream request failed: {0}")]
    Upstream(#[source] reqwest::Error),
}

impl ProxyError {
    /// Classify a transport error returned by the upstream client.
    pub fn from_transport(error: reqwest::Error, deadline: Duration) -> Self {
        // a dial that hits the connect timeout is a connect failure
        if error.is_connect() {
            ProxyError::Connect(error)
        } else if error.is_timeout() {
            ProxyError::Timeout(deadline)
        } else if error.is_builder() {
            ProxyError::InvalidRequest(error)
        } else {
            ProxyError::Upstream(error)
        }
    }

    /// Status code returned to the client for this failure.
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::BodyCapture(_) => StatusCode::BAD_REQUEST,
            ProxyError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::Rewrite(_)
            | ProxyError::InvalidRequest(_)
            | ProxyError::Connect(_)
            | ProxyError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match status {
            StatusCode::BAD_REQUEST => "Failed to read request body",
            StatusCode::GATEWAY_TIMEOUT => "Upstream request timed out",
            _ => "Upstream request failed",
        };
        (status, message).into_response()
    }
}
