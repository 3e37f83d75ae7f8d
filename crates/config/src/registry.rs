//! Registry construction from a validated config.

use crate::schema::{ClockKind, ValidatedRegistryConfig};
use openconsensus_common::{Clock, SystemClock, ZeroTimeClock};
use openconsensus_metrics::MetricRegistry;
use std::sync::Arc;

/// Clock implementation for a config value.
#[must_use]
pub fn clock_for(kind: ClockKind) -> Arc<dyn Clock> {
    match kind {
        ClockKind::System => Arc::new(SystemClock::new()),
        ClockKind::Zero => Arc::new(ZeroTimeClock::new()),
    }
}

/// Build an empty registry with the configured component, resource, and clock.
#[must_use]
pub fn build_registry(config: &ValidatedRegistryConfig) -> MetricRegistry {
    tracing::debug!(
        component = %config.component,
        clock = config.clock.as_str(),
        "building metric registry from config"
    );
    MetricRegistry::builder()
        .component(config.component.clone())
        .resource(config.resource().clone())
        .clock(clock_for(config.clock))
        .build()
}
