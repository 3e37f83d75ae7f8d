//! The metric registry: name uniqueness and instrument construction.

use crate::builder::{
    CounterDoubleBuilder, CounterLongBuilder, GaugeDoubleBuilder, GaugeLongBuilder,
    InstrumentBuilder,
};
use crate::counter::{CounterDouble, CounterLong};
use crate::descriptor::{InstrumentKind, MetricDescriptor};
use crate::error::MetricError;
use crate::gauge::{GaugeDouble, GaugeLong};
use crate::instrument::Instrument;
use crate::labels::{MetricName, ensure_unique_keys};
use crate::snapshot::Metric;
use openconsensus_common::{Clock, Resource, SystemClock};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A registered instrument, tagged by kind.
#[derive(Debug, Clone)]
pub enum RegisteredInstrument {
    /// An integer gauge.
    GaugeLong(GaugeLong),
    /// A floating-point gauge.
    GaugeDouble(GaugeDouble),
    /// An integer counter.
    CounterLong(CounterLong),
    /// A floating-point counter.
    CounterDouble(CounterDouble),
}

impl RegisteredInstrument {
    /// Kind of the wrapped handle.
    #[must_use]
    pub const fn kind(&self) -> InstrumentKind {
        match self {
            Self::GaugeLong(_) => InstrumentKind::GaugeLong,
            Self::GaugeDouble(_) => InstrumentKind::GaugeDouble,
            Self::CounterLong(_) => InstrumentKind::CounterLong,
            Self::CounterDouble(_) => InstrumentKind::CounterDouble,
        }
    }

    /// Descriptor of the wrapped handle.
    #[must_use]
    pub fn descriptor(&self) -> &MetricDescriptor {
        match self {
            Self::GaugeLong(handle) => handle.descriptor(),
            Self::GaugeDouble(handle) => handle.descriptor(),
            Self::CounterLong(handle) => handle.descriptor(),
            Self::CounterDouble(handle) => handle.descriptor(),
        }
    }

    fn snapshot(&self) -> Metric {
        match self {
            Self::GaugeLong(handle) => handle.snapshot(),
            Self::GaugeDouble(handle) => handle.snapshot(),
            Self::CounterLong(handle) => handle.snapshot(),
            Self::CounterDouble(handle) => handle.snapshot(),
        }
    }
}

/// Registry of uniquely named instruments for one library or application.
///
/// The name table sits behind a single lock that is held across the
/// absence check, handle construction, and insert, so two concurrent builds
/// of the same final name can never both succeed. Recording on a handle
/// never touches the registry.
pub struct MetricRegistry {
    component: Box<str>,
    resource: Arc<Resource>,
    clock: Arc<dyn Clock>,
    instruments: Mutex<BTreeMap<MetricName, RegisteredInstrument>>,
}

impl fmt::Debug for MetricRegistry {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("MetricRegistry")
            .field("component", &self.component)
            .field("resource", &self.resource)
            .field("clock", &self.clock)
            .field("instruments", &self.len())
            .finish()
    }
}

impl MetricRegistry {
    /// Start configuring a registry.
    #[must_use]
    pub fn builder() -> MetricRegistryBuilder {
        MetricRegistryBuilder::default()
    }

    /// Builder for an integer gauge named `name`.
    pub fn gauge_long_builder(
        &self,
        name: impl AsRef<str>,
    ) -> Result<GaugeLongBuilder<'_>, MetricError> {
        self.instrument_builder(name)
    }

    /// Builder for a floating-point gauge named `name`.
    pub fn gauge_double_builder(
        &self,
        name: impl AsRef<str>,
    ) -> Result<GaugeDoubleBuilder<'_>, MetricError> {
        self.instrument_builder(name)
    }

    /// Builder for an integer counter named `name`.
    pub fn counter_long_builder(
        &self,
        name: impl AsRef<str>,
    ) -> Result<CounterLongBuilder<'_>, MetricError> {
        self.instrument_builder(name)
    }

    /// Builder for a floating-point counter named `name`.
    pub fn counter_double_builder(
        &self,
        name: impl AsRef<str>,
    ) -> Result<CounterDoubleBuilder<'_>, MetricError> {
        self.instrument_builder(name)
    }

    /// Component prepended to every metric name; empty for none.
    #[must_use]
    pub fn component(&self) -> &str {
        &self.component
    }

    /// Resource attached to every metric.
    #[must_use]
    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    /// Clock used to timestamp series and snapshots.
    #[must_use]
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Look up an instrument by its final name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<RegisteredInstrument> {
        let name = MetricName::parse(name).ok()?;
        self.lock().get(&name).cloned()
    }

    /// Final names of every registered instrument, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<MetricName> {
        self.lock().keys().cloned().collect()
    }

    /// Number of registered instruments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true when nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Read every registered metric, ordered by name.
    #[must_use]
    pub fn metrics(&self) -> Vec<Metric> {
        let instruments: Vec<RegisteredInstrument> = self.lock().values().cloned().collect();
        instruments.iter().map(RegisteredInstrument::snapshot).collect()
    }

    fn instrument_builder<H: Instrument>(
        &self,
        name: impl AsRef<str>,
    ) -> Result<InstrumentBuilder<'_, H>, MetricError> {
        let name = MetricName::parse(name)?;
        Ok(InstrumentBuilder::new(self, name))
    }

    pub(crate) fn register<H: Instrument>(
        &self,
        builder: InstrumentBuilder<'_, H>,
    ) -> Result<H, MetricError> {
        ensure_unique_keys(&builder.label_keys)?;
        if let Some(key) = builder
            .constant_labels
            .keys()
            .find(|key| builder.label_keys.contains(key))
        {
            return Err(MetricError::ConstantLabelConflict {
                key: key.as_str().to_owned(),
            });
        }

        let name = builder.name.prefixed(&self.component);
        let mut instruments = self.lock();
        if let Some(existing) = instruments.get(&name) {
            let existing = existing.kind();
            tracing::warn!(
                metric = %name,
                kind = %H::KIND,
                existing = %existing,
                "duplicate metric registration rejected"
            );
            return Err(MetricError::DuplicateMetricName {
                name: name.as_str().to_owned(),
                existing,
            });
        }

        let label_count = builder.label_keys.len();
        let descriptor = MetricDescriptor::new(
            name.clone(),
            builder.description.into_boxed_str(),
            builder.unit.into_boxed_str(),
            H::KIND,
            builder.label_keys,
        );
        let handle = H::construct(
            descriptor,
            builder.constant_labels.into_iter().collect(),
            Arc::clone(&self.resource),
            Arc::clone(&self.clock),
        );
        instruments.insert(name.clone(), handle.registered());
        drop(instruments);

        tracing::debug!(
            metric = %name,
            kind = %H::KIND,
            labels = label_count,
            "metric registered"
        );
        Ok(handle)
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<MetricName, RegisteredInstrument>> {
        // Inserts happen in one call after every check passed, so a poisoned
        // table is never half-updated.
        self.instruments
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Configures a [`MetricRegistry`].
#[derive(Debug, Default)]
#[must_use = "builders do nothing until `build` is called"]
pub struct MetricRegistryBuilder {
    component: String,
    resource: Option<Resource>,
    clock: Option<Arc<dyn Clock>>,
}

impl MetricRegistryBuilder {
    /// Prefix every metric name with `component` and `_`. Empty means no prefix.
    pub fn component(mut self, component: impl Into<String>) -> Self {
        self.component = component.into();
        self
    }

    /// Attach `resource` to every metric instead of the one detected from the environment.
    pub fn resource(mut self, resource: Resource) -> Self {
        self.resource = Some(resource);
        self
    }

    /// Timestamp series and snapshots with `clock` instead of [`SystemClock`].
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Build an empty registry.
    #[must_use]
    pub fn build(self) -> MetricRegistry {
        let resource = self.resource.unwrap_or_else(|| {
            Resource::from_env().unwrap_or_else(|error| {
                tracing::warn!(%error, "ignoring invalid resource environment");
                Resource::empty()
            })
        });
        let clock: Arc<dyn Clock> = match self.clock {
            Some(clock) => clock,
            None => Arc::new(SystemClock::new()),
        };
        MetricRegistry {
            component: self.component.into_boxed_str(),
            resource: Arc::new(resource),
            clock,
            instruments: Mutex::new(BTreeMap::new()),
        }
    }
}
