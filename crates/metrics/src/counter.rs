//! Counters: cumulative totals that only move forward.

use crate::error::MetricError;
use crate::instrument::instrument_handle;
use crate::series::{DoubleCell, LongCell};
use std::sync::Arc;

instrument_handle!(
    /// Integer counter, e.g. requests served.
    CounterLong, LongCell, LongCounterPoint
);

instrument_handle!(
    /// Floating-point counter, e.g. bytes transferred in fractional units.
    CounterDouble, DoubleCell, DoubleCounterPoint
);

/// One series of a [`CounterLong`].
#[derive(Debug, Clone)]
pub struct LongCounterPoint {
    cell: Arc<LongCell>,
}

impl LongCounterPoint {
    /// Add `delta` to the total. The total stops at `i64::MAX`.
    pub fn add(&self, delta: u64) {
        self.cell
            .add_saturating(i64::try_from(delta).unwrap_or(i64::MAX));
    }

    /// Current total.
    #[must_use]
    pub fn value(&self) -> i64 {
        self.cell.get()
    }
}

/// One series of a [`CounterDouble`].
#[derive(Debug, Clone)]
pub struct DoubleCounterPoint {
    cell: Arc<DoubleCell>,
}

impl DoubleCounterPoint {
    /// Add `delta` to the total; negative and non-finite deltas are rejected.
    pub fn add(&self, delta: f64) -> Result<(), MetricError> {
        if !delta.is_finite() || delta < 0.0 {
            return Err(MetricError::InvalidIncrement { delta });
        }
        self.cell.add(delta);
        Ok(())
    }

    /// Current total.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.cell.get()
    }
}
