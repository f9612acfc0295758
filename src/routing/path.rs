//! Path joining for upstream URIs.
//!
//! # Design Decisions
//! - Purely syntactic: no `..` normalization, no percent-decoding
//! - Exactly one `/` between base and suffix, whatever either side carries

/// Join a target base path and a request path with a single separating slash.
pub fn join_paths(base: &str, suffix: &str) -> String {
    match (base.ends_with('/'), suffix.starts_with('/')) {
        (true, true) => format!("{}{}", base, &suffix[1..]),
        (false, false) => format!("{}/{}", base, suffix),
        _ => format!("{}{}", base, suffix),
    }
}
