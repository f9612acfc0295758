//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum router, HTTP/1 and HTTP/2)
//!     → request.rs (capture body, rewrite for target)
//!     → headers.rs (hop-by-hop removal, X-Forwarded-For)
//!     → [net::transport dispatches upstream]
//!     → response.rs (strip hop-by-hop, stream body)
//!     → Send to client
//! ```

pub mod headers;
pub mod request;
pub mod response;
pub mod server;

pub use request::{Director, ProxyRequest};
pub use server::HttpServer;
