//! Point-in-time view of a registry's metrics.

use crate::descriptor::MetricDescriptor;
use crate::labels::LabelValue;
use openconsensus_common::{Resource, Timestamp};
use serde::Serialize;

/// A recorded value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// Integer instruments.
    Long(i64),
    /// Floating-point instruments.
    Double(f64),
}

/// A value and the time it was read.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    /// Recorded value.
    pub value: Value,
    /// Read time, from the registry clock.
    pub timestamp: Timestamp,
}

/// One labeled series of a metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeries {
    /// Values lined up with the descriptor's label keys.
    pub label_values: Vec<LabelValue>,
    /// Creation time of a cumulative series; `None` for gauges.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_timestamp: Option<Timestamp>,
    /// Current point.
    pub point: Point,
}

/// A metric with all its series.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    /// Descriptor; constant label keys are appended after the variable ones.
    pub descriptor: MetricDescriptor,
    /// Resource of the owning registry.
    pub resource: Resource,
    /// Series sorted by label values.
    pub time_series: Vec<TimeSeries>,
}

impl Metric {
    /// Find the series with exactly these label values.
    #[must_use]
    pub fn series(&self, label_values: &[LabelValue]) -> Option<&TimeSeries> {
        self.time_series
            .iter()
            .find(|series| series.label_values == label_values)
    }
}
