//! Config loading helpers (file + env).
//!
//! Precedence (highest wins):
//! - env overrides (`OcEnv`)
//! - config file content
//! - defaults (`RegistryConfig::default()`)

use crate::env::{OcEnv, apply_env_overrides};
use crate::schema::{RegistryConfig, ValidatedRegistryConfig};
use openconsensus_shared::{ErrorClass, ErrorCode, ErrorEnvelope, ResultExt};
use std::path::Path;

/// Serialization format of a config source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON document.
    Json,
    /// TOML document.
    Toml,
}

/// Load the registry config from in-memory sources.
pub fn load_registry_config_from_sources(
    config_text: Option<&str>,
    format: ConfigFormat,
    env: &OcEnv,
) -> Result<ValidatedRegistryConfig, ErrorEnvelope> {
    let config = match config_text {
        None => RegistryConfig::default(),
        Some(input) => parse_config_unvalidated(input, format)?,
    };

    // env is applied last and also validates/normalizes the resulting config.
    apply_env_overrides(config, env)
}

/// Load the registry config from an optional file path.
pub fn load_registry_config_from_path(
    config_path: Option<&Path>,
    env: &OcEnv,
) -> Result<ValidatedRegistryConfig, ErrorEnvelope> {
    let config = match config_path {
        None => RegistryConfig::default(),
        Some(path) => {
            let config_text = read_config_file(path)?;
            let format = detect_config_format(path)?;
            parse_config_unvalidated(&config_text, format)
                .with_metadata("path", path.to_string_lossy())?
        },
    };

    apply_env_overrides(config, env)
}

/// Load the registry config from std env and an optional file path.
pub fn load_registry_config_std_env(
    config_path: Option<&Path>,
) -> Result<ValidatedRegistryConfig, ErrorEnvelope> {
    let env = OcEnv::from_std_env().with_metadata("source", "env")?;
    load_registry_config_from_path(config_path, &env)
}

/// Serialize the config as deterministic pretty JSON (with trailing newline).
pub fn to_pretty_json(config: &RegistryConfig) -> Result<String, ErrorEnvelope> {
    let mut output = serde_json::to_string_pretty(config).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::internal(),
            format!("failed to serialize config: {error}"),
            ErrorClass::NonRetriable,
        )
    })?;
    output.push('\n');
    Ok(output)
}

/// Serialize the config as deterministic pretty TOML (with trailing newline).
pub fn to_pretty_toml(config: &RegistryConfig) -> Result<String, ErrorEnvelope> {
    let mut output = toml::to_string_pretty(config).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::new("config", "serialize_toml"),
            format!("failed to serialize config TOML: {error}"),
            ErrorClass::NonRetriable,
        )
    })?;
    output.push('\n');
    Ok(output)
}

fn parse_config_unvalidated(
    input: &str,
    format: ConfigFormat,
) -> Result<RegistryConfig, ErrorEnvelope> {
    match format {
        ConfigFormat::Json => serde_json::from_str(input).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::new("config", "invalid_json"),
                format!("invalid config JSON: {error}"),
            )
            .with_metadata("source", "config")
        }),
        ConfigFormat::Toml => toml::from_str(input).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::new("config", "invalid_toml"),
                format!("invalid config TOML: {error}"),
            )
            .with_metadata("source", "config")
        }),
    }
}

fn read_config_file(path: &Path) -> Result<String, ErrorEnvelope> {
    std::fs::read_to_string(path).map_err(|error| {
        let code = match error.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::new("config", "config_file_not_found"),
            std::io::ErrorKind::PermissionDenied => {
                ErrorCode::new("config", "config_file_permission_denied")
            },
            _ => ErrorCode::new("config", "config_file_io"),
        };

        ErrorEnvelope::expected(code, format!("failed to read config file: {error}"))
            .with_metadata("path", path.to_string_lossy().to_string())
    })
}

fn detect_config_format(path: &Path) -> Result<ConfigFormat, ErrorEnvelope> {
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        None | Some("json") => Ok(ConfigFormat::Json),
        Some("toml") => Ok(ConfigFormat::Toml),
        Some(other) => Err(ErrorEnvelope::expected(
            ErrorCode::new("config", "unsupported_format"),
            "unsupported config format; use .json or .toml",
        )
        .with_metadata("extension", other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_follows_extension() {
        assert_eq!(
            detect_config_format(Path::new("registry.TOML")).ok(),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            detect_config_format(Path::new("registry")).ok(),
            Some(ConfigFormat::Json)
        );
        let error = detect_config_format(Path::new("registry.yaml")).err();
        assert_eq!(
            error.map(|error| error.code),
            Some(ErrorCode::new("config", "unsupported_format"))
        );
    }

    #[test]
    fn missing_file_is_reported_with_path() {
        let error = read_config_file(Path::new("/nonexistent/openconsensus.toml")).err();
        assert_eq!(
            error.as_ref().map(|error| &error.code),
            Some(&ErrorCode::new("config", "config_file_not_found"))
        );
        assert!(
            error
                .as_ref()
                .is_some_and(|error| error.metadata.contains_key("path"))
        );
    }

    #[test]
    fn pretty_toml_parses_back() -> Result<(), ErrorEnvelope> {
        let config = RegistryConfig {
            component: "cache".to_owned(),
            ..RegistryConfig::default()
        };
        let rendered = to_pretty_toml(&config)?;
        let parsed = parse_config_unvalidated(&rendered, ConfigFormat::Toml)?;
        assert_eq!(parsed, config);
        Ok(())
    }
}
