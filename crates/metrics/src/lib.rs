//! # openconsensus-metrics
//!
//! A registry of uniquely named, typed metric instruments.
//!
//! - **Registry** - `MetricRegistry` and `MetricRegistryBuilder`
//! - **Instruments** - `GaugeLong`, `GaugeDouble`, `CounterLong`, `CounterDouble`
//! - **Labels** - `MetricName`, `LabelKey`, `LabelValue`
//! - **Snapshot** - `Metric`, `TimeSeries`, `Point`, `Value`
//!
//! ```
//! use openconsensus_common::{Resource, ZeroTimeClock};
//! use openconsensus_metrics::{LabelKey, LabelValue, MetricError, MetricRegistry};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), MetricError> {
//! let registry = MetricRegistry::builder()
//!     .component("db")
//!     .resource(Resource::empty())
//!     .clock(Arc::new(ZeroTimeClock::new()))
//!     .build();
//!
//! let queries = registry
//!     .counter_long_builder("queries")?
//!     .label_keys([LabelKey::parse("table")?])
//!     .build()?;
//! queries
//!     .get_or_create_time_series(&[LabelValue::new("users")])?
//!     .add(1);
//!
//! assert_eq!(queries.descriptor().name().as_str(), "db_queries");
//! assert!(registry.counter_long_builder("queries")?.build().is_err());
//! # Ok(())
//! # }
//! ```

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod builder;
pub mod counter;
pub mod descriptor;
pub mod error;
pub mod gauge;
pub mod instrument;
pub mod labels;
pub mod registry;
mod series;
pub mod snapshot;

pub use builder::{
    CounterDoubleBuilder, CounterLongBuilder, GaugeDoubleBuilder, GaugeLongBuilder,
    InstrumentBuilder,
};
pub use counter::{CounterDouble, CounterLong, DoubleCounterPoint, LongCounterPoint};
pub use descriptor::{DescriptorType, InstrumentKind, MetricDescriptor};
pub use error::MetricError;
pub use gauge::{DoubleGaugePoint, GaugeDouble, GaugeLong, LongGaugePoint};
pub use instrument::Instrument;
pub use labels::{COMPONENT_SEPARATOR, LabelKey, LabelValue, MetricName};
pub use registry::{MetricRegistry, MetricRegistryBuilder, RegisteredInstrument};
pub use snapshot::{Metric, Point, TimeSeries, Value};

/// Returns the metrics crate version.
#[must_use]
pub const fn metrics_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
