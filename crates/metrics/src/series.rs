//! Labeled time-series storage shared by every instrument kind.
//!
//! A store owns one atomic cell per distinct tuple of label values. Lookups
//! take the read lock; only creating or removing a series takes the write
//! lock. Updates never lock: they go straight to the cell's atomic.

use crate::descriptor::MetricDescriptor;
use crate::error::MetricError;
use crate::labels::{LabelKey, LabelValue};
use crate::snapshot::{Metric, Point, TimeSeries, Value};
use openconsensus_common::{Clock, Resource, Timestamp};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Atomic storage for one series.
pub(crate) trait Cell: Send + Sync + 'static {
    fn create(start: Option<Timestamp>) -> Self;
    fn value(&self) -> Value;
    fn start(&self) -> Option<Timestamp>;
}

#[derive(Debug)]
pub(crate) struct LongCell {
    value: AtomicI64,
    start: Option<Timestamp>,
}

impl LongCell {
    pub(crate) fn add(&self, delta: i64) {
        self.value.fetch_add(delta, Ordering::AcqRel);
    }

    /// Add `delta`, pinning the total at `i64::MAX` instead of wrapping.
    pub(crate) fn add_saturating(&self, delta: i64) {
        // The closure never returns `None`, so the update always lands.
        let _ = self
            .value
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |value| {
                Some(value.saturating_add(delta))
            });
    }

    pub(crate) fn set(&self, value: i64) {
        self.value.store(value, Ordering::Release);
    }

    pub(crate) fn get(&self) -> i64 {
        self.value.load(Ordering::Acquire)
    }
}

impl Cell for LongCell {
    fn create(start: Option<Timestamp>) -> Self {
        Self {
            value: AtomicI64::new(0),
            start,
        }
    }

    fn value(&self) -> Value {
        Value::Long(self.get())
    }

    fn start(&self) -> Option<Timestamp> {
        self.start
    }
}

/// `f64` stored as its bit pattern.
#[derive(Debug)]
pub(crate) struct DoubleCell {
    bits: AtomicU64,
    start: Option<Timestamp>,
}

impl DoubleCell {
    pub(crate) fn add(&self, delta: f64) {
        // The closure never returns `None`, so the update always lands.
        let _ = self
            .bits
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
                Some((f64::from_bits(bits) + delta).to_bits())
            });
    }

    pub(crate) fn set(&self, value: f64) {
        self.bits.store(value.to_bits(), Ordering::Release);
    }

    pub(crate) fn get(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }
}

impl Cell for DoubleCell {
    fn create(start: Option<Timestamp>) -> Self {
        Self {
            bits: AtomicU64::new(0.0_f64.to_bits()),
            start,
        }
    }

    fn value(&self) -> Value {
        Value::Double(self.get())
    }

    fn start(&self) -> Option<Timestamp> {
        self.start
    }
}

/// Series of one instrument.
#[derive(Debug)]
pub(crate) struct SeriesStore<C> {
    descriptor: MetricDescriptor,
    constant_labels: Vec<(LabelKey, LabelValue)>,
    resource: Arc<Resource>,
    clock: Arc<dyn Clock>,
    series: RwLock<HashMap<Vec<LabelValue>, Arc<C>>>,
}

impl<C: Cell> SeriesStore<C> {
    pub(crate) fn new(
        descriptor: MetricDescriptor,
        constant_labels: Vec<(LabelKey, LabelValue)>,
        resource: Arc<Resource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            descriptor,
            constant_labels,
            resource,
            clock,
            series: RwLock::new(HashMap::new()),
        }
    }

    pub(crate) const fn descriptor(&self) -> &MetricDescriptor {
        &self.descriptor
    }

    pub(crate) fn get_or_create(&self, label_values: &[LabelValue]) -> Result<Arc<C>, MetricError> {
        self.check_arity(label_values)?;
        Ok(self.get_or_insert(label_values))
    }

    pub(crate) fn default_series(&self) -> Arc<C> {
        let unset = vec![LabelValue::unset(); self.descriptor.label_keys().len()];
        self.get_or_insert(&unset)
    }

    pub(crate) fn remove(&self, label_values: &[LabelValue]) -> Result<(), MetricError> {
        self.check_arity(label_values)?;
        self.series
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(label_values);
        Ok(())
    }

    pub(crate) fn clear(&self) {
        self.series
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.series
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub(crate) fn snapshot(&self) -> Metric {
        let timestamp = self.clock.now();
        let mut time_series: Vec<TimeSeries> = self
            .series
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(label_values, cell)| TimeSeries {
                label_values: label_values
                    .iter()
                    .chain(self.constant_labels.iter().map(|(_, value)| value))
                    .cloned()
                    .collect(),
                start_timestamp: cell.start(),
                point: Point {
                    value: cell.value(),
                    timestamp,
                },
            })
            .collect();
        time_series.sort_by(|left, right| left.label_values.cmp(&right.label_values));

        Metric {
            descriptor: self
                .descriptor
                .with_extra_keys(self.constant_labels.iter().map(|(key, _)| key)),
            resource: (*self.resource).clone(),
            time_series,
        }
    }

    fn check_arity(&self, label_values: &[LabelValue]) -> Result<(), MetricError> {
        let expected = self.descriptor.label_keys().len();
        if label_values.len() == expected {
            Ok(())
        } else {
            Err(MetricError::LabelCountMismatch {
                expected,
                actual: label_values.len(),
            })
        }
    }

    fn get_or_insert(&self, label_values: &[LabelValue]) -> Arc<C> {
        if let Some(cell) = self
            .series
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(label_values)
        {
            return Arc::clone(cell);
        }

        let mut series = self.series.write().unwrap_or_else(PoisonError::into_inner);
        let cell = series.entry(label_values.to_vec()).or_insert_with(|| {
            let start = self
                .descriptor
                .kind()
                .is_cumulative()
                .then(|| self.clock.now());
            Arc::new(C::create(start))
        });
        Arc::clone(cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::InstrumentKind;
    use crate::labels::MetricName;
    use openconsensus_common::ZeroTimeClock;
    use std::thread;

    fn store(kind: InstrumentKind, keys: &[&str]) -> Result<SeriesStore<DoubleCell>, MetricError> {
        let label_keys = keys
            .iter()
            .map(LabelKey::parse)
            .collect::<Result<Vec<_>, _>>()?;
        let descriptor = MetricDescriptor::new(
            MetricName::parse("requests")?,
            "".into(),
            "1".into(),
            kind,
            label_keys,
        );
        Ok(SeriesStore::new(
            descriptor,
            Vec::new(),
            Arc::new(Resource::empty()),
            Arc::new(ZeroTimeClock::new()),
        ))
    }

    #[test]
    fn arity_mismatch_creates_nothing() -> Result<(), MetricError> {
        let store = store(InstrumentKind::GaugeDouble, &["method", "status"])?;
        let result = store.get_or_create(&[LabelValue::new("GET")]);
        assert_eq!(
            result.err(),
            Some(MetricError::LabelCountMismatch {
                expected: 2,
                actual: 1
            })
        );
        assert_eq!(store.len(), 0);
        Ok(())
    }

    #[test]
    fn same_labels_share_one_cell() -> Result<(), MetricError> {
        let store = store(InstrumentKind::GaugeDouble, &["method"])?;
        let first = store.get_or_create(&[LabelValue::new("GET")])?;
        let second = store.get_or_create(&[LabelValue::new("GET")])?;
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.len(), 1);
        Ok(())
    }

    #[test]
    fn default_series_uses_unset_values() -> Result<(), MetricError> {
        let store = store(InstrumentKind::GaugeDouble, &["method"])?;
        let default = store.default_series();
        let explicit = store.get_or_create(&[LabelValue::unset()])?;
        assert!(Arc::ptr_eq(&default, &explicit));
        Ok(())
    }

    #[test]
    fn only_cumulative_series_carry_a_start() -> Result<(), MetricError> {
        let gauge = store(InstrumentKind::GaugeDouble, &[])?;
        let counter = store(InstrumentKind::CounterDouble, &[])?;
        assert_eq!(gauge.default_series().start(), None);
        assert_eq!(counter.default_series().start(), Some(Timestamp::ZERO));
        Ok(())
    }

    #[test]
    fn remove_and_clear_drop_series() -> Result<(), MetricError> {
        let store = store(InstrumentKind::GaugeDouble, &["method"])?;
        store.get_or_create(&[LabelValue::new("GET")])?;
        store.get_or_create(&[LabelValue::new("PUT")])?;
        store.remove(&[LabelValue::new("GET")])?;
        assert_eq!(store.len(), 1);
        assert!(store.remove(&[]).is_err());
        store.clear();
        assert_eq!(store.len(), 0);
        Ok(())
    }

    #[test]
    fn concurrent_double_adds_are_not_lost() -> Result<(), MetricError> {
        let store = Arc::new(store(InstrumentKind::CounterDouble, &[])?);
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    let cell = store.default_series();
                    for _ in 0..1_000 {
                        cell.add(0.5);
                    }
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().is_ok());
        }
        assert!((store.default_series().get() - 4_000.0).abs() < f64::EPSILON);
        Ok(())
    }
}
