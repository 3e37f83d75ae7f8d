//! Registry configuration schema, defaults, and validation.
//!
//! - Deserialization uses `serde` (TOML or JSON, camelCase keys).
//! - Validation is manual and returns typed errors mapped to `ErrorEnvelope`.
//! - A validated config carries the resolved `Resource`, so building a
//!   registry from it cannot fail.

use openconsensus_common::{Resource, ResourceError};
use openconsensus_shared::{ErrorCode, ErrorEnvelope};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

/// Current supported configuration schema version.
pub const CURRENT_CONFIG_VERSION: u32 = 1;

/// Default `tracing` filter directive.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Top-level registry configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct RegistryConfig {
    /// Schema version for forward-compatible migrations.
    pub version: u32,
    /// Prefix for every metric name; empty for none.
    pub component: String,
    /// Time source for series and snapshots.
    pub clock: ClockKind,
    /// Monitored entity; detected from the environment when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<ResourceConfig>,
    /// Log output settings.
    pub logging: LoggingConfig,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            version: CURRENT_CONFIG_VERSION,
            component: String::new(),
            clock: ClockKind::default(),
            resource: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl RegistryConfig {
    /// Validate and normalize the config.
    pub fn validate_and_normalize(mut self) -> Result<ValidatedRegistryConfig, ConfigSchemaError> {
        self.validate_version()?;

        self.component = self.component.trim().to_owned();
        if self.component.chars().any(char::is_whitespace) {
            return Err(ConfigSchemaError::InvalidComponent {
                value: self.component,
            });
        }

        self.logging.normalize_and_validate()?;

        let resource = match &self.resource {
            None => Resource::empty(),
            Some(section) => section.to_resource()?,
        };
        Ok(ValidatedRegistryConfig {
            raw: self,
            resource,
        })
    }

    const fn validate_version(&self) -> Result<(), ConfigSchemaError> {
        if self.version != CURRENT_CONFIG_VERSION {
            return Err(ConfigSchemaError::UnsupportedVersion {
                found: self.version,
                supported: CURRENT_CONFIG_VERSION,
            });
        }
        Ok(())
    }
}

/// Validated config wrapper carrying the resolved resource.
#[derive(Debug, Clone)]
pub struct ValidatedRegistryConfig {
    raw: RegistryConfig,
    resource: Resource,
}

impl ValidatedRegistryConfig {
    /// Resource attached to every metric; empty when none was configured.
    #[must_use]
    pub const fn resource(&self) -> &Resource {
        &self.resource
    }

    /// Consume the wrapper and return the raw config.
    #[must_use]
    pub fn into_inner(self) -> RegistryConfig {
        self.raw
    }
}

impl AsRef<RegistryConfig> for ValidatedRegistryConfig {
    fn as_ref(&self) -> &RegistryConfig {
        &self.raw
    }
}

impl std::ops::Deref for ValidatedRegistryConfig {
    type Target = RegistryConfig;

    fn deref(&self) -> &Self::Target {
        &self.raw
    }
}

/// Which clock the registry uses.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum ClockKind {
    /// Operating system clock.
    #[default]
    System,
    /// Always reports the epoch; for deterministic output.
    Zero,
}

impl ClockKind {
    /// Stable config value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Zero => "zero",
        }
    }
}

impl FromStr for ClockKind {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "system" => Ok(Self::System),
            "zero" => Ok(Self::Zero),
            _ => Err(()),
        }
    }
}

/// Resource section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct ResourceConfig {
    /// Resource type, e.g. `host` or `container`.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Resource labels.
    pub labels: BTreeMap<String, String>,
    /// Schema URL describing the label keys.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_url: Option<String>,
}

impl ResourceConfig {
    fn to_resource(&self) -> Result<Resource, ConfigSchemaError> {
        let resource = Resource::new(self.kind.as_deref(), &self.labels)
            .map_err(ConfigSchemaError::InvalidResource)?;
        match self.schema_url.as_deref() {
            None => Ok(resource),
            Some(url) => resource
                .with_schema_url(url)
                .map_err(ConfigSchemaError::InvalidResource),
        }
    }
}

impl From<&Resource> for ResourceConfig {
    fn from(resource: &Resource) -> Self {
        Self {
            kind: resource.kind().map(str::to_owned),
            labels: resource
                .labels()
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
            schema_url: resource.schema_url().map(str::to_owned),
        }
    }
}

/// Log output format.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-line output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Stable config value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pretty => "pretty",
            Self::Json => "json",
        }
    }
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(()),
        }
    }
}

/// Logging section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `info` or `openconsensus_metrics=debug`.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_owned(),
            format: LogFormat::default(),
        }
    }
}

impl LoggingConfig {
    fn normalize_and_validate(&mut self) -> Result<(), ConfigSchemaError> {
        let level = self.level.trim();
        if level.is_empty() {
            DEFAULT_LOG_LEVEL.clone_into(&mut self.level);
            return Ok(());
        }
        if let Err(error) = EnvFilter::try_new(level) {
            return Err(ConfigSchemaError::InvalidLogLevel {
                value: level.to_owned(),
                reason: error.to_string(),
            });
        }
        self.level = level.to_owned();
        Ok(())
    }

    /// Build the filter for this config.
    pub(crate) fn env_filter(&self) -> Result<EnvFilter, ConfigSchemaError> {
        EnvFilter::try_new(&self.level).map_err(|error| ConfigSchemaError::InvalidLogLevel {
            value: self.level.clone(),
            reason: error.to_string(),
        })
    }
}

/// Parse a registry config from a JSON string, applying validation.
pub fn parse_registry_config_json(input: &str) -> Result<ValidatedRegistryConfig, ErrorEnvelope> {
    let config: RegistryConfig = serde_json::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_json"),
            format!("invalid config JSON: {error}"),
        )
    })?;

    config.validate_and_normalize().map_err(Into::into)
}

/// Parse a registry config from a TOML string, applying validation.
pub fn parse_registry_config_toml(input: &str) -> Result<ValidatedRegistryConfig, ErrorEnvelope> {
    let config: RegistryConfig = toml::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_toml"),
            format!("invalid config TOML: {error}"),
        )
    })?;

    config.validate_and_normalize().map_err(Into::into)
}

/// Validation failures for [`RegistryConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSchemaError {
    /// The config version is not supported by this crate.
    UnsupportedVersion {
        /// Version found in the config.
        found: u32,
        /// Version supported by this crate.
        supported: u32,
    },
    /// The component contains whitespace.
    InvalidComponent {
        /// Trimmed component.
        value: String,
    },
    /// The log level is not a valid filter directive.
    InvalidLogLevel {
        /// Rejected directive.
        value: String,
        /// Parser message.
        reason: String,
    },
    /// The resource section failed validation.
    InvalidResource(ResourceError),
}

impl ConfigSchemaError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::UnsupportedVersion { .. } => ErrorCode::new("config", "unsupported_version"),
            Self::InvalidComponent { .. } => ErrorCode::new("config", "invalid_component"),
            Self::InvalidLogLevel { .. } => ErrorCode::new("config", "invalid_log_level"),
            Self::InvalidResource(_) => ErrorCode::new("config", "invalid_resource"),
        }
    }
}

impl fmt::Display for ConfigSchemaError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedVersion { found, supported } => {
                write!(
                    formatter,
                    "unsupported config version: {found} (supported: {supported})"
                )
            },
            Self::InvalidComponent { value } => {
                write!(formatter, "component must not contain whitespace: {value:?}")
            },
            Self::InvalidLogLevel { value, reason } => {
                write!(formatter, "invalid logging.level {value:?}: {reason}")
            },
            Self::InvalidResource(error) => write!(formatter, "invalid resource: {error}"),
        }
    }
}

impl std::error::Error for ConfigSchemaError {}

impl From<ConfigSchemaError> for ErrorEnvelope {
    fn from(error: ConfigSchemaError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        let envelope = Self::expected(code, message);

        match error {
            ConfigSchemaError::UnsupportedVersion { found, supported } => envelope
                .with_metadata("found", found.to_string())
                .with_metadata("supported", supported.to_string()),
            ConfigSchemaError::InvalidComponent { value } => {
                envelope.with_metadata("component", value)
            },
            ConfigSchemaError::InvalidLogLevel { value, .. } => {
                envelope.with_metadata("level", value)
            },
            ConfigSchemaError::InvalidResource(source) => {
                let inner = Self::from(source);
                envelope
                    .with_metadata("section", "resource")
                    .with_metadata("cause", inner.code.to_string())
            },
        }
    }
}
