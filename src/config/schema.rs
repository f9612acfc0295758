//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::routing::{TargetConfig, TargetError};

/// Root configuration for the proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Upstream target URL (scheme, host and optional base path).
    pub target: String,

    /// Listener configuration (port, interfaces).
    pub listener: ListenerConfig,

    /// Upstream transport tuning.
    pub transport: TransportConfig,

    /// Log sink settings.
    pub logging: LoggingConfig,
}

impl ProxyConfig {
    /// Parse the configured target URL.
    pub fn target(&self) -> Result<TargetConfig, TargetError> {
        TargetConfig::parse(&self.target)
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// TCP port to listen on.
    pub port: u16,

    /// Bind all interfaces instead of loopback only.
    pub listen_all: bool,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            port: 9090,
            listen_all: false,
        }
    }
}

impl ListenerConfig {
    /// Socket address to bind.
    pub fn bind_addr(&self) -> SocketAddr {
        let ip = if self.listen_all {
            IpAddr::V4(Ipv4Addr::UNSPECIFIED)
        } else {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        };
        SocketAddr::new(ip, self.port)
    }

    /// Host name shown in the startup banner.
    pub fn display_host(&self) -> &'static str {
        if self.listen_all {
            "0.0.0.0"
        } else {
            "localhost"
        }
    }
}

/// Upstream transport configuration.
///
/// Applies process-wide; there are no per-request overrides.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportConfig {
    /// TCP connect timeout in seconds.
    pub dial_timeout_secs: u64,

    /// TCP keep-alive probe interval in seconds.
    pub keep_alive_secs: u64,

    /// Budget for the TLS handshake in seconds (TLS targets only).
    pub tls_handshake_timeout_secs: u64,

    /// Budget for the response head once the connection is up, in seconds.
    pub response_header_timeout_secs: u64,

    /// Maximum idle pooled connections toward the target.
    pub max_idle_connections: usize,

    /// Idle pooled connections are closed after this many seconds.
    pub idle_timeout_secs: u64,

    /// Route through `HTTP_PROXY` / `HTTPS_PROXY` when they are set.
    pub honor_env_proxy: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            dial_timeout_secs: 30,
            keep_alive_secs: 30,
            tls_handshake_timeout_secs: 10,
            response_header_timeout_secs: 10,
            max_idle_connections: 100,
            idle_timeout_secs: 90,
            honor_env_proxy: true,
        }
    }
}

impl TransportConfig {
    pub fn dial_timeout(&self) -> Duration {
        Duration::from_secs(self.dial_timeout_secs)
    }

    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }

    pub fn tls_handshake_timeout(&self) -> Duration {
        Duration::from_secs(self.tls_handshake_timeout_secs)
    }

    pub fn response_header_timeout(&self) -> Duration {
        Duration::from_secs(self.response_header_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

/// Log sink configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// JSON lines log file.
    pub file: PathBuf,

    /// Rotate the file once it grows past this many megabytes.
    pub max_size_mb: u64,

    /// Rotated files to keep (0 = keep all).
    pub max_backups: usize,

    /// Minimum level (trace, debug, info, warn, error) or a filter directive.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("logger.log"),
            max_size_mb: 100,
            max_backups: 0,
            level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_mb.saturating_mul(1024 * 1024)
    }
}
