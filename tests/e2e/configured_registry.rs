//! Config-driven setup E2E: TOML + env overrides to a working registry and
//! an installed tracing subscriber.

use openconsensus::config::{
    ClockKind, ConfigFormat, ENV_METRICS_COMPONENT, LogFormat, OcEnv, build_registry,
    init_tracing, load_registry_config_from_sources, to_pretty_json,
};
use openconsensus::metrics::Value;
use openconsensus::prelude::*;
use std::collections::BTreeMap;
use std::error::Error;

const CONFIG: &str = r#"
version = 1
component = "billing"
clock = "zero"

[resource]
type = "container"
labels = { "container.name" = "billing-7f9c" }

[logging]
level = "openconsensus_metrics=debug,warn"
format = "json"
"#;

#[test]
fn toml_config_builds_a_prefixed_zero_clock_registry() -> Result<(), Box<dyn Error>> {
    let config = load_registry_config_from_sources(
        Some(CONFIG),
        ConfigFormat::Toml,
        &OcEnv::default(),
    )?;
    assert_eq!(config.clock, ClockKind::Zero);
    assert_eq!(config.logging.format, LogFormat::Json);

    let registry = build_registry(&config);
    let invoices = registry.counter_long_builder("invoices")?.build()?;
    invoices.default_time_series().add(7);

    let metrics = registry.metrics();
    let metric = metrics.first().ok_or("no metrics")?;
    assert_eq!(metric.descriptor.name().as_str(), "billing_invoices");
    assert_eq!(metric.resource.kind(), Some("container"));
    let series = metric.time_series.first().ok_or("no series")?;
    assert_eq!(series.point.value, Value::Long(7));
    assert_eq!(series.point.timestamp, Timestamp::ZERO);
    Ok(())
}

#[test]
fn env_component_override_changes_final_names() -> Result<(), Box<dyn Error>> {
    let env = OcEnv::from_map(&BTreeMap::from([(
        ENV_METRICS_COMPONENT.to_owned(),
        "ledger".to_owned(),
    )]))?;
    let config = load_registry_config_from_sources(Some(CONFIG), ConfigFormat::Toml, &env)?;
    let registry = build_registry(&config);

    let gauge = registry.gauge_double_builder("balance")?.build()?;
    assert_eq!(gauge.descriptor().name().as_str(), "ledger_balance");
    assert!(registry.get("billing_balance").is_none());
    Ok(())
}

#[test]
fn tracing_install_is_idempotent() -> Result<(), Box<dyn Error>> {
    let config = load_registry_config_from_sources(
        Some(CONFIG),
        ConfigFormat::Toml,
        &OcEnv::default(),
    )?;
    let _ = init_tracing(&config.logging)?;
    assert!(!init_tracing(&config.logging)?);

    // Registration still works (and logs) with the subscriber in place.
    let registry = build_registry(&config);
    registry.gauge_long_builder("workers")?.build()?;
    assert!(registry.gauge_long_builder("workers")?.build().is_err());
    Ok(())
}

#[test]
fn effective_config_renders_as_json() -> Result<(), Box<dyn Error>> {
    let config = load_registry_config_from_sources(
        Some(CONFIG),
        ConfigFormat::Toml,
        &OcEnv::default(),
    )?;
    let rendered = to_pretty_json(&config)?;
    let value: serde_json::Value = serde_json::from_str(&rendered)?;

    assert_eq!(
        value.get("component").and_then(serde_json::Value::as_str),
        Some("billing")
    );
    assert_eq!(
        value.get("clock").and_then(serde_json::Value::as_str),
        Some("zero")
    );
    Ok(())
}
