//! Network subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound:
//!     listener.rs (bind loopback or 0.0.0.0) → http server
//!
//! Outbound:
//!     rewritten ProxyRequest
//!     → transport.rs (pooled client, timeouts, env proxy)
//!         → dial.rs (connector layer: reports when a fresh connection is ready)
//!     → upstream target
//! ```
//!
//! # Design Decisions
//! - No connection admission limit; the OS bounds inbound concurrency
//! - A single pool serves every request toward the one target

pub mod dial;
pub mod listener;
pub mod transport;

pub use listener::{bind, ListenerError};
pub use transport::{TransportError, UpstreamTransport};
