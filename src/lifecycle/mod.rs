//! Process lifecycle.
//!
//! # Data Flow
//! ```text
//! startup.rs:
//!     ProxyConfig → LogSink (global) → TargetConfig → HttpServer → bind → serve
//!
//! signals.rs:
//!     SIGINT (Ctrl-C) / SIGTERM → Shutdown::trigger
//!
//! shutdown.rs:
//!     watch channel flips → server stops accepting → in-flight requests finish
//! ```
//!
//! # Design Decisions
//! - The log sink comes up before anything that can fail after it
//! - Bind errors surface as startup errors, before the first request
//! - Shutdown is a one-way latch; late subscribers see it immediately

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{Shutdown, ShutdownSignal};
