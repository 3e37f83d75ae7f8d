//! # openconsensus
//!
//! In-process instrumentation for libraries and applications.
//!
//! - [`metrics`] declares typed instruments under unique names in a
//!   [`MetricRegistry`] and reads a local snapshot back.
//! - [`tags`] carries an immutable [`TagContext`] alongside the current
//!   thread or task.
//! - [`config`] builds a registry and a `tracing` subscriber from TOML, JSON,
//!   or environment variables.
//!
//! ```
//! use openconsensus::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = openconsensus::registry_from_env()?;
//! let method = LabelKey::parse("method")?;
//! let requests = registry
//!     .counter_long_builder("requests")?
//!     .label_keys([method.clone()])
//!     .build()?;
//!
//! let tags = TagContextBuilder::new()
//!     .put(TagKey::new("method")?, TagValue::new("GET")?)
//!     .build();
//! scoped(tags, || -> Result<(), MetricError> {
//!     let labels = LabelValue::from_tag_context(&current(), &[method]);
//!     requests.get_or_create_time_series(&labels)?.add(1);
//!     Ok(())
//! })?;
//! # Ok(())
//! # }
//! ```

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub use openconsensus_common as common;
pub use openconsensus_config as config;
pub use openconsensus_metrics as metrics;
pub use openconsensus_shared as shared;
pub use openconsensus_tags as tags;

pub use openconsensus_common::{Clock, Resource, SystemClock, Timestamp, ZeroTimeClock};
pub use openconsensus_metrics::{
    CounterDouble, CounterLong, GaugeDouble, GaugeLong, Metric, MetricError, MetricRegistry,
    MetricRegistryBuilder,
};
pub use openconsensus_shared::{ErrorCode, ErrorEnvelope};
pub use openconsensus_tags::{TagContext, TagContextBuilder};

use std::path::Path;

/// Names most instrumentation code needs.
pub mod prelude {
    pub use openconsensus_common::{Clock, Resource, Timestamp, ZeroTimeClock};
    pub use openconsensus_metrics::{
        CounterDouble, CounterLong, GaugeDouble, GaugeLong, LabelKey, LabelValue, MetricError,
        MetricRegistry,
    };
    pub use openconsensus_shared::ErrorEnvelope;
    pub use openconsensus_tags::{
        TagContext, TagContextBuilder, TagKey, TagValue, WithTagContextExt, current, scoped,
        with_tag_context, wrap,
    };
}

/// Load config from an optional file plus the process environment, install
/// the `tracing` subscriber, and build the registry.
pub fn init(config_path: Option<&Path>) -> Result<MetricRegistry, ErrorEnvelope> {
    let config = openconsensus_config::load_registry_config_std_env(config_path)?;
    let installed = openconsensus_config::init_tracing(&config.logging)?;
    if !installed {
        tracing::debug!("tracing subscriber already installed; keeping it");
    }
    Ok(openconsensus_config::build_registry(&config))
}

/// Build a registry from environment variables alone, leaving logging untouched.
pub fn registry_from_env() -> Result<MetricRegistry, ErrorEnvelope> {
    let config = openconsensus_config::load_registry_config_std_env(None)?;
    Ok(openconsensus_config::build_registry(&config))
}

/// Returns the facade crate version.
#[must_use]
pub const fn facade_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
