//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Pipeline stages (capture, forward, response, error):
//!     → observer.rs (ProxyObserver hooks)
//!     → logging.rs (LogSink fan-out)
//!         → rotation.rs (size-rotated JSON lines file)
//!         → stdout (colored console lines)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - The sink is an explicit value handed to the server, not captured globally
//! - Both destinations see every record at the same threshold

pub mod logging;
pub mod observer;
pub mod rotation;

pub use logging::{LogSink, LoggingError};
pub use observer::{LoggingObserver, ProxyObserver};
