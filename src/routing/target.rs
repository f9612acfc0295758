//! Upstream target definition.
//!
//! # Responsibilities
//! - Parse the target URL given on the command line
//! - Build the forwarding URI for each inbound request
//!
//! # Design Decisions
//! - Only `http` and `https` targets are accepted
//! - The Host header value is computed once at startup
//! - Target query (if any) is prepended to the request query

use std::fmt;
use std::str::FromStr;

use axum::http::header::HeaderValue;
use axum::http::uri::{Authority, Scheme};
use axum::http::Uri;
use thiserror::Error;
use url::Url;

use crate::routing::path::join_paths;

/// Errors raised while parsing the target URL.
#[derive(Debug, Error)]
pub enum TargetError {
    #[error("invalid target URL '{url}': {source}")]
    Parse {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported target scheme '{0}' (expected http or https)")]
    UnsupportedScheme(String),

    #[error("target URL '{0}' has no host")]
    MissingHost(String),

    #[error("target URL '{0}' has an invalid authority")]
    InvalidAuthority(String),
}

/// The single upstream every request is forwarded to.
#[derive(Debug, Clone)]
pub struct TargetConfig {
    scheme: Scheme,
    authority: Authority,
    base_path: String,
    query: Option<String>,
    host_header: HeaderValue,
}

impl TargetConfig {
    /// Parse a target URL such as `https://api.example.com:8443/v1`.
    pub fn parse(raw: &str) -> Result<Self, TargetError> {
        let url = Url::parse(raw).map_err(|source| TargetError::Parse {
            url: raw.to_string(),
            source,
        })?;

        let scheme = match url.scheme() {
            "http" => Scheme::HTTP,
            "https" => Scheme::HTTPS,
            other => return Err(TargetError::UnsupportedScheme(other.to_string())),
        };

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| TargetError::MissingHost(raw.to_string()))?;
        let authority = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        let authority = Authority::from_str(&authority)
            .map_err(|_| TargetError::InvalidAuthority(raw.to_string()))?;
        let host_header = HeaderValue::from_str(authority.as_str())
            .map_err(|_| TargetError::InvalidAuthority(raw.to_string()))?;

        Ok(Self {
            scheme,
            authority,
            base_path: url.path().to_string(),
            query: url.query().filter(|q| !q.is_empty()).map(str::to_string),
            host_header,
        })
    }

    pub fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Value for the outbound `Host` header.
    pub fn host_header(&self) -> &HeaderValue {
        &self.host_header
    }

    /// True when connections to the target negotiate TLS.
    pub fn is_tls(&self) -> bool {
        self.scheme == Scheme::HTTPS
    }

    /// Build the URI an inbound request is forwarded to.
    pub fn forward_uri(&self, original: &Uri) -> Result<Uri, axum::http::Error> {
        let path = join_paths(&self.base_path, original.path());
        let query = match (self.query.as_deref(), original.query()) {
            (Some(target), Some(request)) if !request.is_empty() => {
                Some(format!("{}&{}", target, request))
            }
            (Some(target), _) => Some(target.to_string()),
            (None, Some(request)) if !request.is_empty() => Some(request.to_string()),
            (None, _) => None,
        };
        let path_and_query = match query {
            Some(q) => format!("{}?{}", path, q),
            None => path,
        };

        Uri::builder()
            .scheme(self.scheme.clone())
            .authority(self.authority.clone())
            .path_and_query(path_and_query)
            .build()
    }
}

impl fmt::Display for TargetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}{}", self.scheme, self.authority, self.base_path)?;
        if let Some(query) = &self.query {
            write!(f, "?{}", query)?;
        }
        Ok(())
    }
}
