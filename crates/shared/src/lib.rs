//! # openconsensus-shared
//!
//! Shared result types and error handling for the openconsensus workspace.
//!
//! This crate provides foundational types that are used across all other crates:
//!
//! - `ErrorEnvelope` and its classification (`ErrorKind`, `ErrorClass`, `ErrorCode`)
//! - The workspace `Result` alias and `ResultExt`, which lifts typed errors
//!   into envelopes
//!
//! No workspace dependencies.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod errors;
pub mod result;

pub use errors::{ErrorClass, ErrorCode, ErrorEnvelope, ErrorKind, ErrorMetadata};
pub use result::{Result, ResultExt};

/// Returns the shared crate version.
#[must_use]
pub const fn shared_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_crate_compiles() {
        assert!(!shared_crate_version().is_empty());
    }

    #[test]
    fn envelope_is_a_std_error() {
        let error: Box<dyn std::error::Error> =
            Box::new(ErrorEnvelope::invalid_argument("name", "blank"));
        assert!(error.to_string().contains("core:invalid_argument"));
    }
}
