//! Registry and instrument failures.

use crate::descriptor::InstrumentKind;
use openconsensus_shared::{ErrorCode, ErrorEnvelope};
use thiserror::Error;

/// Failures raised by the metric registry, instrument builders, and handles.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetricError {
    /// Metric name is empty.
    #[error("metric name must not be empty")]
    InvalidName,
    /// Label key is empty after trimming.
    #[error("label key must not be empty")]
    InvalidLabelKey {
        /// Length of the raw input before trimming.
        input_length: usize,
    },
    /// The same label key appears twice in one schema.
    #[error("label key `{key}` is declared more than once")]
    DuplicateLabelKey {
        /// Repeated key.
        key: String,
    },
    /// A constant label reuses a key from the variable label schema.
    #[error("constant label `{key}` collides with a declared label key")]
    ConstantLabelConflict {
        /// Colliding key.
        key: String,
    },
    /// The final metric name is already registered.
    #[error("metric `{name}` is already registered as {existing}")]
    DuplicateMetricName {
        /// Final, component-prefixed name.
        name: String,
        /// Kind of the instrument holding the name.
        existing: InstrumentKind,
    },
    /// Number of label values does not match the label key schema.
    #[error("expected {expected} label value(s), got {actual}")]
    LabelCountMismatch {
        /// Number of declared label keys.
        expected: usize,
        /// Number of values supplied.
        actual: usize,
    },
    /// Cumulative instruments only move forward.
    #[error("counter increment must be finite and non-negative, got {delta}")]
    InvalidIncrement {
        /// Rejected delta.
        delta: f64,
    },
}

impl MetricError {
    /// Returns true for a rejected duplicate registration.
    #[must_use]
    pub const fn is_duplicate_metric_name(&self) -> bool {
        matches!(self, Self::DuplicateMetricName { .. })
    }

    const fn argument(&self) -> &'static str {
        match self {
            Self::InvalidName | Self::DuplicateMetricName { .. } => "name",
            Self::InvalidLabelKey { .. } | Self::DuplicateLabelKey { .. } => "label_keys",
            Self::ConstantLabelConflict { .. } => "constant_labels",
            Self::LabelCountMismatch { .. } => "label_values",
            Self::InvalidIncrement { .. } => "delta",
        }
    }
}

impl From<MetricError> for ErrorEnvelope {
    fn from(error: MetricError) -> Self {
        let message = error.to_string();
        let argument = error.argument();
        match error {
            MetricError::DuplicateMetricName { name, existing } => {
                Self::expected(ErrorCode::duplicate_metric_name(), message)
                    .with_metadata("name", name)
                    .with_metadata("existing_kind", existing.as_str())
            },
            MetricError::InvalidName => Self::invalid_argument(argument, message),
            MetricError::InvalidLabelKey { input_length } => {
                Self::invalid_argument(argument, message)
                    .with_metadata("input_length", input_length.to_string())
            },
            MetricError::DuplicateLabelKey { key } | MetricError::ConstantLabelConflict { key } => {
                Self::invalid_argument(argument, message).with_metadata("key", key)
            },
            MetricError::LabelCountMismatch { expected, actual } => {
                Self::invalid_argument(argument, message)
                    .with_metadata("expected", expected.to_string())
                    .with_metadata("actual", actual.to_string())
            },
            MetricError::InvalidIncrement { delta } => {
                Self::invalid_argument(argument, message).with_metadata("delta", delta.to_string())
            },
        }
    }
}
