//! Pooled upstream transport.
//!
//! # Responsibilities
//! - Own the single connection pool toward the target
//! - Bound dialing, TLS and waiting for the response head with timeouts
//! - Classify failures for the error reporter
//!
//! # Design Decisions
//! - One client for the whole process; cloning shares the pool
//! - Never retries and never follows redirects
//! - The dial budget includes the TLS handshake budget for https targets
//! - The response-head budget starts once the request has a ready
//!   connection, pooled or freshly dialed (see [`crate::net::dial`])

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tokio::time::Instant;

use crate::config::TransportConfig;
use crate::error::ProxyError;
use crate::http::request::ProxyRequest;
use crate::net::dial::{DialProgress, DialState, DialTrackingLayer};
use crate::routing::TargetConfig;

/// Errors raised while building the transport.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to build upstream client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Shared, concurrency-safe dispatcher to the upstream target.
#[derive(Debug, Clone)]
pub struct UpstreamTransport {
    client: reqwest::Client,
    connect_timeout: Duration,
    response_header_timeout: Duration,
}

impl UpstreamTransport {
    /// Build the transport for `target`.
    pub fn new(config: &TransportConfig, target: &TargetConfig) -> Result<Self, TransportError> {
        let connect_timeout = if target.is_tls() {
            config.dial_timeout() + config.tls_handshake_timeout()
        } else {
            config.dial_timeout()
        };
        let response_header_timeout = config.response_header_timeout();

        let mut builder = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .connector_layer(DialTrackingLayer)
            .tcp_keepalive(config.keep_alive())
            .pool_max_idle_per_host(config.max_idle_connections)
            .pool_idle_timeout(config.idle_timeout())
            .redirect(reqwest::redirect::Policy::none())
            .referer(false);
        if !config.honor_env_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build()?;

        tracing::debug!(
            max_idle = config.max_idle_connections,
            idle_timeout_secs = config.idle_timeout_secs,
            connect_timeout = ?connect_timeout,
            response_header_timeout = ?response_header_timeout,
            "Upstream connection pool configured"
        );

        Ok(Self {
            client,
            connect_timeout,
            response_header_timeout,
        })
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn response_header_timeout(&self) -> Duration {
        self.response_header_timeout
    }

    /// Send a rewritten request upstream and wait for the response head.
    ///
    /// The body is replayed from the captured buffer; the response body is
    /// left unread for the caller to stream.
    pub async fn dispatch(&self, request: &ProxyRequest) -> Result<reqwest::Response, ProxyError> {
        let upstream = self
            .client
            .request(request.method().clone(), request.uri().to_string())
            .headers(request.headers().clone())
            .body(request.replay_body())
            .build()
            .map_err(ProxyError::InvalidRequest)?;

        let progress = DialProgress::new();
        let dials = progress.subscribe();
        let exchange = progress.scope(self.client.execute(upstream));

        match self.await_head(exchange, dials).await {
            Some(Ok(response)) => Ok(response),
            Some(Err(e)) => Err(ProxyError::from_transport(e, self.response_header_timeout)),
            None => Err(ProxyError::Timeout(self.response_header_timeout)),
        }
    }

    /// Drive `exchange` until the response head arrives or the header budget,
    /// counted from when the connection became ready, runs out.
    async fn await_head<F: Future>(
        &self,
        exchange: F,
        mut dials: watch::Receiver<DialState>,
    ) -> Option<F::Output> {
        let started = Instant::now();
        tokio::pin!(exchange);
        loop {
            let deadline = dials
                .borrow_and_update()
                .head_deadline(started, self.response_header_timeout);
            let expired = async {
                match deadline {
                    Some(at) => tokio::time::sleep_until(at).await,
                    None => std::future::pending().await,
                }
            };

            tokio::select! {
                output = &mut exchange => return Some(output),
                Ok(()) = dials.changed() => continue,
                _ = expired => return None,
            }
        }
    }
}
