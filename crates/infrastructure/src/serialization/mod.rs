//! Deterministic JSON serialization for the session file.
//!
//! Stable output keeps the file byte-identical until the session itself
//! changes:
//! - 2-space indentation
//! - Trailing newline
//! - UTF-8 encoding without BOM

mod json;

pub use json::*;
