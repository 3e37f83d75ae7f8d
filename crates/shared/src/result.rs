//! Result alias and combinators for envelope-returning code.

use crate::errors::ErrorEnvelope;

/// Shared result type used across the workspace.
pub type Result<T, E = ErrorEnvelope> = std::result::Result<T, E>;

/// Lift typed errors into [`ErrorEnvelope`] at a crate boundary.
pub trait ResultExt<T> {
    /// Convert the error side into an envelope.
    fn into_envelope(self) -> Result<T>;

    /// Convert the error side into an envelope and add `key = value` to its metadata.
    fn with_metadata(self, key: &str, value: impl Into<String>) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<ErrorEnvelope>,
{
    fn into_envelope(self) -> Result<T> {
        self.map_err(Into::into)
    }

    fn with_metadata(self, key: &str, value: impl Into<String>) -> Result<T> {
        self.map_err(|error| error.into().with_metadata(key, value))
    }
}
