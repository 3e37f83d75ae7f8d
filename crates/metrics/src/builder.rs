//! Instrument builders handed out by [`MetricRegistry`].

use crate::counter::{CounterDouble, CounterLong};
use crate::error::MetricError;
use crate::gauge::{GaugeDouble, GaugeLong};
use crate::instrument::Instrument;
use crate::labels::{LabelKey, LabelValue, MetricName};
use crate::registry::MetricRegistry;
use std::collections::BTreeMap;
use std::marker::PhantomData;

/// Builder for a [`GaugeLong`].
pub type GaugeLongBuilder<'r> = InstrumentBuilder<'r, GaugeLong>;
/// Builder for a [`GaugeDouble`].
pub type GaugeDoubleBuilder<'r> = InstrumentBuilder<'r, GaugeDouble>;
/// Builder for a [`CounterLong`].
pub type CounterLongBuilder<'r> = InstrumentBuilder<'r, CounterLong>;
/// Builder for a [`CounterDouble`].
pub type CounterDoubleBuilder<'r> = InstrumentBuilder<'r, CounterDouble>;

/// Collects the static shape of an instrument before it is registered.
///
/// Nothing touches the registry until [`InstrumentBuilder::build`].
#[derive(Debug)]
#[must_use = "builders do nothing until `build` is called"]
pub struct InstrumentBuilder<'r, H> {
    registry: &'r MetricRegistry,
    pub(crate) name: MetricName,
    pub(crate) description: String,
    pub(crate) unit: String,
    pub(crate) label_keys: Vec<LabelKey>,
    pub(crate) constant_labels: BTreeMap<LabelKey, LabelValue>,
    _handle: PhantomData<fn() -> H>,
}

impl<'r, H: Instrument> InstrumentBuilder<'r, H> {
    pub(crate) const fn new(registry: &'r MetricRegistry, name: MetricName) -> Self {
        Self {
            registry,
            name,
            description: String::new(),
            unit: String::new(),
            label_keys: Vec::new(),
            constant_labels: BTreeMap::new(),
            _handle: PhantomData,
        }
    }

    /// Set the free-form description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the unit of measure.
    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    /// Set the label key schema. Every series supplies one value per key, in this order.
    pub fn label_keys(mut self, keys: impl IntoIterator<Item = LabelKey>) -> Self {
        self.label_keys = keys.into_iter().collect();
        self
    }

    /// Add labels whose values are the same for every series.
    pub fn constant_labels(
        mut self,
        labels: impl IntoIterator<Item = (LabelKey, LabelValue)>,
    ) -> Self {
        self.constant_labels.extend(labels);
        self
    }

    /// Name as passed to the registry, before component prefixing.
    pub const fn name(&self) -> &MetricName {
        &self.name
    }

    /// Register the instrument and return its handle.
    ///
    /// Fails with [`MetricError::DuplicateMetricName`] when the final name is
    /// taken by any instrument kind, and with an invalid-argument error when
    /// the label schema repeats a key. Either way the registry is unchanged.
    pub fn build(self) -> Result<H, MetricError> {
        let registry = self.registry;
        registry.register(self)
    }
}
