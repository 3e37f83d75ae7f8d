//! The error envelope every crate converts its typed errors into.
//!
//! Typed enums (`TagError`, `MetricError`, `ResourceError`, config errors)
//! stay close to the code that raises them. At a crate boundary they become
//! an [`ErrorEnvelope`]: a stable `namespace:code` pair, an origin kind, a
//! retry class, a message, and string metadata.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Metadata attached to errors for diagnostics.
pub type ErrorMetadata = BTreeMap<String, String>;

/// Where a failure comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Caller input was rejected: bad names, duplicate registrations, bad config.
    Expected,
    /// The API was used in a way its contract forbids, e.g. scopes closed out of order.
    Invariant,
    /// The environment failed underneath us.
    Unexpected,
}

impl ErrorKind {
    /// Stable lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Expected => "expected",
            Self::Invariant => "invariant",
            Self::Unexpected => "unexpected",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Whether retrying the same call can succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// A later attempt may succeed.
    Retriable,
    /// The same call fails the same way every time.
    NonRetriable,
}

impl ErrorClass {
    /// Returns true when the error is considered retriable.
    #[must_use]
    pub const fn is_retriable(self) -> bool {
        matches!(self, Self::Retriable)
    }

    /// Stable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Retriable => "retriable",
            Self::NonRetriable => "non-retriable",
        }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Stable `namespace:code` identifier, safe to match on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorCode {
    namespace: String,
    code: String,
}

impl ErrorCode {
    /// Create a new error code with a namespace and code.
    pub fn new(namespace: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            code: code.into(),
        }
    }

    /// A required argument was absent or malformed.
    pub fn invalid_argument() -> Self {
        Self::new("core", "invalid_argument")
    }

    /// A metric name collides with one already registered.
    pub fn duplicate_metric_name() -> Self {
        Self::new("metrics", "duplicate_metric_name")
    }

    /// Ambient scopes were closed out of LIFO order.
    pub fn scope_order() -> Self {
        Self::new("tags", "scope_order")
    }

    /// Catch-all for failures with no more specific code.
    pub fn internal() -> Self {
        Self::new("core", "internal")
    }

    /// Returns the namespace portion.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the code identifier.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}:{}", self.namespace, self.code)
    }
}

/// Structured, serializable error shared across crates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Origin of the failure.
    pub kind: ErrorKind,
    /// Retry classification.
    pub class: ErrorClass,
    /// Stable error code.
    pub code: ErrorCode,
    /// Human-readable error message.
    pub message: String,
    /// Additional diagnostic metadata.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: ErrorMetadata,
}

impl ErrorEnvelope {
    fn with_kind(
        kind: ErrorKind,
        class: ErrorClass,
        code: ErrorCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            class,
            code,
            message: message.into(),
            metadata: ErrorMetadata::new(),
        }
    }

    /// Rejected input; never retriable.
    pub fn expected(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::Expected, ErrorClass::NonRetriable, code, message)
    }

    /// Contract violation; never retriable.
    pub fn invariant(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::Invariant, ErrorClass::NonRetriable, code, message)
    }

    /// Environmental failure with the given retry classification.
    pub fn unexpected(code: ErrorCode, message: impl Into<String>, class: ErrorClass) -> Self {
        Self::with_kind(ErrorKind::Unexpected, class, code, message)
    }

    /// `core:invalid_argument` naming the offending argument in metadata.
    pub fn invalid_argument(argument: &str, message: impl Into<String>) -> Self {
        Self::expected(ErrorCode::invalid_argument(), message).with_metadata("argument", argument)
    }

    /// Returns true when the envelope carries `code`.
    #[must_use]
    pub fn has_code(&self, code: &ErrorCode) -> bool {
        &self.code == code
    }

    /// Returns true if the error is an `InvalidArgument` failure.
    #[must_use]
    pub fn is_invalid_argument(&self) -> bool {
        self.has_code(&ErrorCode::invalid_argument())
    }

    /// Returns true if the error is a `DuplicateMetricName` failure.
    #[must_use]
    pub fn is_duplicate_metric_name(&self) -> bool {
        self.has_code(&ErrorCode::duplicate_metric_name())
    }

    /// Metadata value for `key`, if present.
    #[must_use]
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// Attach a single metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for ErrorEnvelope {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "{} {} {}: {}",
            self.kind, self.class, self.code, self.message
        )
    }
}

impl std::error::Error for ErrorEnvelope {}
