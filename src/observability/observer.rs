//! Pipeline observation hooks.
//!
//! The forwarding pipeline reports every stage through one [`ProxyObserver`],
//! so the whole observability behaviour can be swapped as a unit.

use std::sync::Arc;

use axum::http::{Method, Uri};
use axum::response::Response;

use crate::error::ProxyError;
use crate::http::request::ProxyRequest;
use crate::observability::logging::LogSink;

/// Observer of one request's trip through the proxy.
pub trait ProxyObserver: Send + Sync + 'static {
    /// The inbound request was captured, before any rewrite.
    fn on_request(&self, request: &ProxyRequest);

    /// The request was rewritten and is about to be dispatched.
    fn on_forward(&self, _request: &ProxyRequest) {}

    /// The upstream answered; called before the body is streamed.
    fn on_response(&self, request: &ProxyRequest, response: &Response);

    /// A stage failed; the client gets `error`'s failure response.
    fn on_error(&self, method: &Method, uri: &Uri, error: &ProxyError);
}

/// Writes one structured record per pipeline event to a [`LogSink`].
#[derive(Debug, Clone)]
pub struct LoggingObserver {
    sink: Arc<LogSink>,
}

impl LoggingObserver {
    pub fn new(sink: Arc<LogSink>) -> Self {
        Self { sink }
    }
}

impl ProxyObserver for LoggingObserver {
    fn on_request(&self, request: &ProxyRequest) {
        let body = String::from_utf8_lossy(request.body());
        self.sink.in_scope(|| {
            tracing::info!(
                method = %request.method(),
                url = %request.uri(),
                body = %body,
                "Received request"
            )
        });
    }

    fn on_forward(&self, request: &ProxyRequest) {
        self.sink
            .in_scope(|| tracing::info!(url = %request.uri(), "Forwarding request"));
    }

    fn on_response(&self, request: &ProxyRequest, response: &Response) {
        self.sink.in_scope(|| {
            tracing::info!(
                status = %response.status(),
                url = %request.uri(),
                method = %request.method(),
                "Received response"
            )
        });
    }

    fn on_error(&self, method: &Method, uri: &Uri, error: &ProxyError) {
        self.sink.in_scope(|| {
            tracing::error!(
                method = %method,
                url = %uri,
                error = %error,
                "Proxy error"
            )
        });
    }
}
