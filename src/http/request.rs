//! Request capture and rewriting.
//!
//! # Responsibilities
//! - Read the inbound body once and keep it replayable
//! - Rewrite scheme, authority, path and Host for the upstream target
//! - Add forwarding headers, strip hop-by-hop headers
//!
//! # Design Decisions
//! - The body is held as `Bytes`; replay hands out a cheap clone so the
//!   logged copy and the forwarded copy are the same buffer
//! - A body that cannot be read aborts the request instead of forwarding a
//!   half-rewritten one

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::header::{self, HeaderMap};
use axum::http::{request, Method, Request, Uri};

use crate::error::ProxyError;
use crate::http::headers::{append_forwarded_for, remove_hop_by_hop};
use crate::routing::TargetConfig;

/// An inbound request whose body has been fully captured.
#[derive(Debug)]
pub struct ProxyRequest {
    parts: request::Parts,
    body: Bytes,
}

impl ProxyRequest {
    /// Read the whole body into memory.
    pub async fn capture(request: Request<Body>) -> Result<Self, ProxyError> {
        let (parts, body) = request.into_parts();
        let body = axum::body::to_bytes(body, usize::MAX)
            .await
            .map_err(ProxyError::BodyCapture)?;
        Ok(Self { parts, body })
    }

    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    pub fn uri(&self) -> &Uri {
        &self.parts.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    /// The captured body, as received from the client.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// A fresh, independently readable copy of the captured body.
    pub fn replay_body(&self) -> Bytes {
        self.body.clone()
    }
}

/// Rewrites captured requests so they address the upstream target.
#[derive(Debug, Clone)]
pub struct Director {
    target: Arc<TargetConfig>,
}

impl Director {
    pub fn new(target: TargetConfig) -> Self {
        Self {
            target: Arc::new(target),
        }
    }

    pub fn target(&self) -> &TargetConfig {
        &self.target
    }

    /// Rewrite `request` in place for the upstream.
    pub fn direct(&self, request: &mut ProxyRequest, client: SocketAddr) -> Result<(), ProxyError> {
        let forward_uri = self.target.forward_uri(&request.parts.uri)?;

        let headers = &mut request.parts.headers;
        remove_hop_by_hop(headers);
        headers.insert(header::HOST, self.target.host_header().clone());
        append_forwarded_for(headers, client.ip());

        request.parts.uri = forward_uri;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::headers::X_FORWARDED_FOR;

    fn client() -> SocketAddr {
        "192.168.1.20:50000".parse().unwrap()
    }

    async fn captured(uri: &str, body: &'static str) -> ProxyRequest {
        let req = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::HOST, "proxy.local:9090")
            .header(header::CONNECTION, "keep-alive")
            .body(Body::from(body))
            .unwrap();
        ProxyRequest::capture(req).await.unwrap()
    }

    #[tokio::test]
    async fn test_capture_keeps_body_replayable() {
        let req = captured("/upload", "payload-bytes").await;
        assert_eq!(req.body().as_ref(), b"payload-bytes");

        let first = req.replay_body();
        let second = req.replay_body();
        assert_eq!(first, second);
        assert_eq!(req.body().as_ref(), b"payload-bytes");
    }

    #[tokio::test]
    async fn test_capture_empty_body() {
        let req = ProxyRequest::capture(Request::new(Body::empty())).await.unwrap();
        assert!(req.body().is_empty());
    }

    #[tokio::test]
    async fn test_direct_rewrites_for_target() {
        let director = Director::new(TargetConfig::parse("https://api.example.com/svc").unwrap());
        let mut req = captured("/x?page=2", "{}").await;

        director.direct(&mut req, client()).unwrap();

        assert_eq!(req.uri().to_string(), "https://api.example.com/svc/x?page=2");
        assert_eq!(req.headers().get(header::HOST).unwrap(), "api.example.com");
        assert!(req.headers().get(header::CONNECTION).is_none());
        assert_eq!(req.headers().get(&X_FORWARDED_FOR).unwrap(), "192.168.1.20");
        assert_eq!(req.method(), Method::POST);
        assert_eq!(req.body().as_ref(), b"{}");
    }
}
