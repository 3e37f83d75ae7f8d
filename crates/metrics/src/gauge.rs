//! Gauges: instantaneous values that can go up and down.

use crate::instrument::instrument_handle;
use crate::series::{DoubleCell, LongCell};
use std::sync::Arc;

instrument_handle!(
    /// Integer gauge, e.g. queue depth or open connections.
    GaugeLong, LongCell, LongGaugePoint
);

instrument_handle!(
    /// Floating-point gauge, e.g. a ratio or a temperature.
    GaugeDouble, DoubleCell, DoubleGaugePoint
);

/// One series of a [`GaugeLong`].
#[derive(Debug, Clone)]
pub struct LongGaugePoint {
    cell: Arc<LongCell>,
}

impl LongGaugePoint {
    /// Add `delta`, which may be negative.
    pub fn add(&self, delta: i64) {
        self.cell.add(delta);
    }

    /// Replace the value.
    pub fn set(&self, value: i64) {
        self.cell.set(value);
    }

    /// Current value.
    #[must_use]
    pub fn value(&self) -> i64 {
        self.cell.get()
    }
}

/// One series of a [`GaugeDouble`].
#[derive(Debug, Clone)]
pub struct DoubleGaugePoint {
    cell: Arc<DoubleCell>,
}

impl DoubleGaugePoint {
    /// Add `delta`, which may be negative.
    pub fn add(&self, delta: f64) {
        self.cell.add(delta);
    }

    /// Replace the value.
    pub fn set(&self, value: f64) {
        self.cell.set(value);
    }

    /// Current value.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.cell.get()
    }
}
