//! Target addressing subsystem.
//!
//! # Data Flow
//! ```text
//! CLI target URL
//!     → target.rs (parse into TargetConfig, once at startup)
//!
//! Per request:
//!     original URI
//!     → target.rs (swap scheme/authority, merge query)
//!     → path.rs (join base path with request path)
//!     → forwarding URI
//! ```
//!
//! # Design Decisions
//! - Exactly one target per process; no route table
//! - Path joining is syntactic only

pub mod path;
pub mod target;

pub use path::join_paths;
pub use target::{TargetConfig, TargetError};
