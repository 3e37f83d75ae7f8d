//! Environment variable parsing and env-to-config merging.
//!
//! Env parsing is strict: a present but invalid value fails instead of being
//! ignored. Env values override file values field by field.

use crate::schema::{ClockKind, LogFormat, RegistryConfig, ResourceConfig, ValidatedRegistryConfig};
use openconsensus_common::{
    ENV_RESOURCE_LABELS, ENV_RESOURCE_SCHEMA_URL, ENV_RESOURCE_TYPE, Resource, ResourceError,
};
use openconsensus_shared::{ErrorCode, ErrorEnvelope, ResultExt};
use std::collections::BTreeMap;
use std::fmt;

/// Env var: metric name prefix.
pub const ENV_METRICS_COMPONENT: &str = "OC_METRICS_COMPONENT";
/// Env var: registry clock (`system` or `zero`).
pub const ENV_METRICS_CLOCK: &str = "OC_METRICS_CLOCK";
/// Env var: `tracing` filter directive.
pub const ENV_LOG_LEVEL: &str = "OC_LOG_LEVEL";
/// Env var: log output format (`pretty` or `json`).
pub const ENV_LOG_FORMAT: &str = "OC_LOG_FORMAT";

const ENV_VARS: [&str; 7] = [
    ENV_METRICS_COMPONENT,
    ENV_METRICS_CLOCK,
    ENV_LOG_LEVEL,
    ENV_LOG_FORMAT,
    ENV_RESOURCE_TYPE,
    ENV_RESOURCE_LABELS,
    ENV_RESOURCE_SCHEMA_URL,
];

/// Parsed env overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OcEnv {
    /// Override for `component`. An empty value clears the prefix.
    pub component: Option<String>,
    /// Override for `clock`.
    pub clock: Option<ClockKind>,
    /// Override for `logging.level`.
    pub log_level: Option<String>,
    /// Override for `logging.format`.
    pub log_format: Option<LogFormat>,
    /// Resource detected from the `OC_RESOURCE_*` variables.
    pub resource: Option<Resource>,
}

impl OcEnv {
    /// Parse overrides from an explicit map (deterministic for tests).
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self, EnvParseError> {
        let component = map.get(ENV_METRICS_COMPONENT).map(|value| value.trim().to_owned());
        let clock = parse_enum(map, ENV_METRICS_CLOCK)?;
        let log_level = read_non_empty(map, ENV_LOG_LEVEL)?;
        let log_format = parse_enum(map, ENV_LOG_FORMAT)?;

        let resource = if [ENV_RESOURCE_TYPE, ENV_RESOURCE_LABELS, ENV_RESOURCE_SCHEMA_URL]
            .iter()
            .any(|name| map.contains_key(*name))
        {
            Some(Resource::from_env_map(map).map_err(EnvParseError::InvalidResource)?)
        } else {
            None
        };

        Ok(Self {
            component,
            clock,
            log_level,
            log_format,
            resource,
        })
    }

    /// Parse overrides from the process environment.
    pub fn from_std_env() -> Result<Self, EnvParseError> {
        let mut map = BTreeMap::new();
        for name in ENV_VARS {
            if let Ok(value) = std::env::var(name) {
                map.insert(name.to_owned(), value);
            }
        }
        Self::from_map(&map)
    }
}

fn read_non_empty(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<String>, EnvParseError> {
    match map.get(var) {
        None => Ok(None),
        Some(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return Err(EnvParseError::EmptyValue { var });
            }
            Ok(Some(trimmed.to_owned()))
        },
    }
}

fn parse_enum<T: std::str::FromStr>(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<T>, EnvParseError> {
    let Some(value) = read_non_empty(map, var)? else {
        return Ok(None);
    };
    value
        .parse()
        .map(Some)
        .map_err(|_| EnvParseError::InvalidEnum { var, value })
}

/// Apply env overrides to a base config and validate the result.
///
/// The env resource fills `[resource]` only when the file did not set one.
pub fn apply_env_overrides(
    base: RegistryConfig,
    env: &OcEnv,
) -> Result<ValidatedRegistryConfig, ErrorEnvelope> {
    let mut config = base;
    if let Some(component) = &env.component {
        config.component.clone_from(component);
    }
    if let Some(clock) = env.clock {
        config.clock = clock;
    }
    if let Some(level) = &env.log_level {
        config.logging.level.clone_from(level);
    }
    if let Some(format) = env.log_format {
        config.logging.format = format;
    }
    if config.resource.is_none() {
        config.resource = env.resource.as_ref().map(ResourceConfig::from);
    }

    config.validate_and_normalize().into_envelope()
}

/// Env parsing failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvParseError {
    /// An env var was present but empty after trimming.
    EmptyValue {
        /// Env var name.
        var: &'static str,
    },
    /// Enum env var had an unsupported value.
    InvalidEnum {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
    /// Resource env vars failed validation.
    InvalidResource(ResourceError),
}

impl EnvParseError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::EmptyValue { .. } => ErrorCode::new("config", "empty_env_var"),
            Self::InvalidEnum { .. } => ErrorCode::new("config", "invalid_env_enum"),
            Self::InvalidResource(_) => ErrorCode::new("config", "invalid_env_resource"),
        }
    }
}

impl fmt::Display for EnvParseError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyValue { var } => write!(formatter, "{var} must be non-empty"),
            Self::InvalidEnum { var, .. } => write!(formatter, "{var} has an unsupported value"),
            Self::InvalidResource(error) => {
                write!(
                    formatter,
                    "{ENV_RESOURCE_TYPE}/{ENV_RESOURCE_LABELS} are invalid: {error}"
                )
            },
        }
    }
}

impl std::error::Error for EnvParseError {}

impl From<EnvParseError> for ErrorEnvelope {
    fn from(error: EnvParseError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        let envelope = Self::expected(code, message);

        match error {
            EnvParseError::EmptyValue { var } => envelope.with_metadata("env_var", var),
            EnvParseError::InvalidEnum { var, value } => envelope
                .with_metadata("env_var", var)
                .with_metadata("value", value),
            EnvParseError::InvalidResource(source) => {
                let inner = Self::from(source);
                envelope.with_metadata("cause", inner.code.to_string())
            },
        }
    }
}
