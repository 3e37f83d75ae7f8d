//! Integration tests for parsing and loading config fixtures.

use openconsensus_config::{
    CURRENT_CONFIG_VERSION, ClockKind, LogFormat, OcEnv, build_registry,
    load_registry_config_from_path, parse_registry_config_json, parse_registry_config_toml,
    registry_config_schema, to_pretty_json,
};
use openconsensus_shared::ErrorCode;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

fn fixture_path(relative: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(relative)
}

fn read_fixture(relative: &str) -> Result<String, Box<dyn Error>> {
    Ok(fs::read_to_string(fixture_path(relative))?)
}

#[test]
fn parses_valid_toml_fixture_and_normalizes() -> Result<(), Box<dyn Error>> {
    let contents = read_fixture("registry.valid.toml")?;
    let config = parse_registry_config_toml(&contents)?;

    assert_eq!(config.version, CURRENT_CONFIG_VERSION);
    assert_eq!(config.component, "storage", "component should be trimmed");
    assert_eq!(config.clock, ClockKind::Zero);
    assert_eq!(config.logging.format, LogFormat::Json);

    let resource = config.resource();
    assert_eq!(resource.kind(), Some("host"));
    assert_eq!(resource.schema_url(), Some("https://example.com/schemas/host"));
    let keys: Vec<&str> = resource.labels().keys().map(AsRef::as_ref).collect();
    assert_eq!(keys, vec!["cloud.zone", "host.name"]);
    Ok(())
}

#[test]
fn parses_valid_json_fixture_with_defaults() -> Result<(), Box<dyn Error>> {
    let contents = read_fixture("registry.valid.json")?;
    let config = parse_registry_config_json(&contents)?;

    assert_eq!(config.component, "api");
    assert_eq!(config.clock, ClockKind::System);
    assert_eq!(config.logging.level, "warn");
    assert_eq!(config.logging.format, LogFormat::Pretty);
    assert!(config.resource().is_empty());
    Ok(())
}

#[test]
fn rejects_unsupported_version() -> Result<(), Box<dyn Error>> {
    let contents = read_fixture("registry.bad-version.json")?;
    let error = parse_registry_config_json(&contents).err();

    assert_eq!(
        error.as_ref().map(|error| &error.code),
        Some(&ErrorCode::new("config", "unsupported_version"))
    );
    assert_eq!(
        error
            .as_ref()
            .and_then(|error| error.metadata.get("found"))
            .map(String::as_str),
        Some("3")
    );
    Ok(())
}

#[test]
fn rejects_unknown_fields() -> Result<(), Box<dyn Error>> {
    let contents = read_fixture("registry.unknown-field.toml")?;
    let error = parse_registry_config_toml(&contents).err();
    assert_eq!(
        error.map(|error| error.code),
        Some(ErrorCode::new("config", "invalid_toml"))
    );
    Ok(())
}

#[test]
fn rejects_invalid_resource_labels() -> Result<(), Box<dyn Error>> {
    let contents = read_fixture("registry.bad-resource.toml")?;
    let error = parse_registry_config_toml(&contents).err();
    assert_eq!(
        error.map(|error| error.code),
        Some(ErrorCode::new("config", "invalid_resource"))
    );
    Ok(())
}

#[test]
fn loads_from_path_and_builds_a_prefixed_registry() -> Result<(), Box<dyn Error>> {
    let config = load_registry_config_from_path(
        Some(&fixture_path("registry.valid.toml")),
        &OcEnv::default(),
    )?;
    let registry = build_registry(&config);

    let gauge = registry.gauge_long_builder("open_files")?.build()?;
    assert_eq!(gauge.descriptor().name().as_str(), "storage_open_files");
    assert_eq!(registry.resource().kind(), Some("host"));
    Ok(())
}

#[test]
fn effective_config_serializes_deterministically() -> Result<(), Box<dyn Error>> {
    let contents = read_fixture("registry.valid.toml")?;
    let config = parse_registry_config_toml(&contents)?;

    let first = to_pretty_json(&config)?;
    let second = to_pretty_json(&config)?;
    assert_eq!(first, second);
    assert!(first.ends_with('\n'));

    let reparsed = parse_registry_config_json(&first)?;
    assert_eq!(reparsed.as_ref(), config.as_ref());
    Ok(())
}

#[test]
fn schema_describes_top_level_fields() -> Result<(), Box<dyn Error>> {
    let schema = serde_json::to_value(registry_config_schema())?;
    let properties = schema
        .get("properties")
        .and_then(serde_json::Value::as_object)
        .ok_or("schema has no properties")?;

    for field in ["version", "component", "clock", "resource", "logging"] {
        assert!(properties.contains_key(field), "missing {field}");
    }
    Ok(())
}
