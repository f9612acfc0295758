//! TCP listener setup.
//!
//! # Responsibilities
//! - Bind loopback or all interfaces depending on configuration
//! - Report the bound address for the startup banner

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::ListenerConfig;

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Failed to bind to address.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

/// Bind the proxy listener described by `config`.
pub async fn bind(config: &ListenerConfig) -> Result<TcpListener, ListenerError> {
    let addr = config.bind_addr();
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ListenerError::Bind { addr, source })?;

    tracing::debug!(
        address = %listener.local_addr().unwrap_or(addr),
        "Listener bound"
    );

    Ok(listener)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_binds_loopback_by_default() {
        let config = ListenerConfig {
            port: 0,
            listen_all: false,
        };
        let listener = bind(&config).await.unwrap();
        assert!(listener.local_addr().unwrap().ip().is_loopback());
    }

    #[tokio::test]
    async fn test_listen_all_binds_unspecified() {
        let config = ListenerConfig {
            port: 0,
            listen_all: true,
        };
        let listener = bind(&config).await.unwrap();
        assert!(listener.local_addr().unwrap().ip().is_unspecified());
    }

    #[tokio::test]
    async fn test_port_in_use() {
        let first = bind(&ListenerConfig { port: 0, listen_all: false }).await.unwrap();
        let port = first.local_addr().unwrap().port();

        let err = bind(&ListenerConfig { port, listen_all: false }).await.unwrap_err();
        assert!(err.to_string().starts_with("Failed to bind 127.0.0.1:"));
    }
}
