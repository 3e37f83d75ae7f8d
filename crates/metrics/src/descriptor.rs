//! Instrument kinds and metric descriptors.

use crate::labels::{LabelKey, MetricName};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of instruments a registry can build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentKind {
    /// Instantaneous `i64` value that may go up and down.
    GaugeLong,
    /// Instantaneous `f64` value that may go up and down.
    GaugeDouble,
    /// Monotonic `i64` total.
    CounterLong,
    /// Monotonic `f64` total.
    CounterDouble,
}

impl InstrumentKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::GaugeLong,
        Self::GaugeDouble,
        Self::CounterLong,
        Self::CounterDouble,
    ];

    /// Stable snake-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GaugeLong => "gauge_long",
            Self::GaugeDouble => "gauge_double",
            Self::CounterLong => "counter_long",
            Self::CounterDouble => "counter_double",
        }
    }

    /// Point type reported for this kind.
    #[must_use]
    pub const fn descriptor_type(self) -> DescriptorType {
        match self {
            Self::GaugeLong => DescriptorType::GaugeInt64,
            Self::GaugeDouble => DescriptorType::GaugeDouble,
            Self::CounterLong => DescriptorType::CumulativeInt64,
            Self::CounterDouble => DescriptorType::CumulativeDouble,
        }
    }

    /// Returns true for counters, whose series carry a start timestamp.
    #[must_use]
    pub const fn is_cumulative(self) -> bool {
        matches!(self, Self::CounterLong | Self::CounterDouble)
    }
}

impl fmt::Display for InstrumentKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Shape of the points a metric reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DescriptorType {
    /// Instantaneous integer.
    GaugeInt64,
    /// Instantaneous floating point.
    GaugeDouble,
    /// Cumulative integer.
    CumulativeInt64,
    /// Cumulative floating point.
    CumulativeDouble,
}

/// Static description of a registered metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricDescriptor {
    name: MetricName,
    description: Box<str>,
    unit: Box<str>,
    kind: InstrumentKind,
    label_keys: Vec<LabelKey>,
}

impl MetricDescriptor {
    pub(crate) const fn new(
        name: MetricName,
        description: Box<str>,
        unit: Box<str>,
        kind: InstrumentKind,
        label_keys: Vec<LabelKey>,
    ) -> Self {
        Self {
            name,
            description,
            unit,
            kind,
            label_keys,
        }
    }

    /// Final, component-prefixed name.
    #[must_use]
    pub const fn name(&self) -> &MetricName {
        &self.name
    }

    /// Free-form description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Unit of measure, e.g. `ms` or `By`.
    #[must_use]
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Instrument kind.
    #[must_use]
    pub const fn kind(&self) -> InstrumentKind {
        self.kind
    }

    /// Point type.
    #[must_use]
    pub const fn descriptor_type(&self) -> DescriptorType {
        self.kind.descriptor_type()
    }

    /// Label keys, in schema order.
    #[must_use]
    pub fn label_keys(&self) -> &[LabelKey] {
        &self.label_keys
    }

    pub(crate) fn with_extra_keys<'a>(&self, extra: impl IntoIterator<Item = &'a LabelKey>) -> Self {
        let mut descriptor = self.clone();
        descriptor.label_keys.extend(extra.into_iter().cloned());
        descriptor
    }
}
