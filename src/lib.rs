//! Logging HTTP proxy library.
//!
//! Forwards every inbound request to a single upstream target and records
//! each request, response and failure as structured log records.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;

pub use config::schema::ProxyConfig;
pub use error::ProxyError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use observability::{LogSink, LoggingObserver, ProxyObserver};
pub use routing::TargetConfig;
