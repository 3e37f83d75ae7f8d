//! Descriptor of the entity that produces metrics (host, container, service).
//!
//! The registry treats a `Resource` as opaque: it is copied into every
//! snapshot and never interpreted.

use openconsensus_shared::{ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Env var: resource type of the current process.
pub const ENV_RESOURCE_TYPE: &str = "OC_RESOURCE_TYPE";
/// Env var: comma-separated `key=value` resource labels.
pub const ENV_RESOURCE_LABELS: &str = "OC_RESOURCE_LABELS";
/// Env var: schema URL describing the resource's label keys.
pub const ENV_RESOURCE_SCHEMA_URL: &str = "OC_RESOURCE_SCHEMA_URL";
/// Maximum length of a resource type, label key, or label value.
pub const MAX_RESOURCE_LENGTH: usize = 255;

const LABEL_LIST_SPLITTER: char = ',';
const LABEL_KEY_VALUE_SPLITTER: char = '=';

/// Validation failures for resource descriptors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    /// The type is too long or contains non-printable characters.
    #[error("resource type must be printable ASCII of at most 255 characters")]
    InvalidType {
        /// Offending type.
        value: String,
    },
    /// A label key is empty, too long, or contains non-printable characters.
    #[error("resource label key must be non-empty printable ASCII of at most 255 characters")]
    InvalidLabelKey {
        /// Offending key.
        key: String,
    },
    /// A label value is too long or contains non-printable characters.
    #[error("resource label value must be printable ASCII of at most 255 characters")]
    InvalidLabelValue {
        /// Key owning the offending value.
        key: String,
    },
    /// The schema URL is empty, too long, or contains non-printable characters.
    #[error("resource schema URL must be non-empty printable ASCII of at most 255 characters")]
    InvalidSchemaUrl {
        /// Offending URL.
        value: String,
    },
    /// A `key=value` entry in the label list could not be split.
    #[error("resource label entry must have the form key=value")]
    MalformedLabelEntry {
        /// Offending entry.
        entry: String,
    },
}

impl From<ResourceError> for ErrorEnvelope {
    fn from(error: ResourceError) -> Self {
        let code = match error {
            ResourceError::InvalidType { .. } => ErrorCode::new("resource", "invalid_type"),
            ResourceError::InvalidSchemaUrl { .. } => {
                ErrorCode::new("resource", "invalid_schema_url")
            },
            _ => ErrorCode::new("resource", "invalid_labels"),
        };
        let envelope = Self::expected(code, error.to_string());
        match error {
            ResourceError::InvalidType { value } => envelope.with_metadata("type", value),
            ResourceError::InvalidSchemaUrl { value } => {
                envelope.with_metadata("schema_url", value)
            },
            ResourceError::InvalidLabelKey { key } | ResourceError::InvalidLabelValue { key } => {
                envelope.with_metadata("key", key)
            },
            ResourceError::MalformedLabelEntry { entry } => envelope.with_metadata("entry", entry),
        }
    }
}

/// Immutable description of the monitored entity.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    kind: Option<Box<str>>,
    #[serde(default)]
    labels: BTreeMap<Box<str>, Box<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    schema_url: Option<Box<str>>,
}

impl Resource {
    /// A resource with no type and no labels.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            kind: None,
            labels: BTreeMap::new(),
            schema_url: None,
        }
    }

    /// Build a validated resource.
    pub fn new<K, V>(
        kind: Option<&str>,
        labels: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Self, ResourceError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let kind = match kind {
            None => None,
            Some(kind) => {
                let kind = kind.trim();
                if !is_valid_text(kind) {
                    return Err(ResourceError::InvalidType {
                        value: kind.to_owned(),
                    });
                }
                (!kind.is_empty()).then(|| kind.into())
            },
        };

        let mut validated = BTreeMap::new();
        for (key, value) in labels {
            let key = key.as_ref().trim();
            let value = value.as_ref().trim();
            if key.is_empty() || !is_valid_text(key) {
                return Err(ResourceError::InvalidLabelKey {
                    key: key.to_owned(),
                });
            }
            if !is_valid_text(value) {
                return Err(ResourceError::InvalidLabelValue {
                    key: key.to_owned(),
                });
            }
            validated.insert(key.into(), value.into());
        }

        Ok(Self {
            kind,
            labels: validated,
            schema_url: None,
        })
    }

    /// Attach the schema URL that describes this resource's label keys.
    pub fn with_schema_url(mut self, url: &str) -> Result<Self, ResourceError> {
        let url = url.trim();
        if url.is_empty() || !is_valid_text(url) {
            return Err(ResourceError::InvalidSchemaUrl {
                value: url.to_owned(),
            });
        }
        self.schema_url = Some(url.into());
        Ok(self)
    }

    /// Detect the resource of the current process from `OC_RESOURCE_TYPE`,
    /// `OC_RESOURCE_LABELS` and `OC_RESOURCE_SCHEMA_URL`.
    pub fn from_env() -> Result<Self, ResourceError> {
        let mut map = BTreeMap::new();
        for name in [ENV_RESOURCE_TYPE, ENV_RESOURCE_LABELS, ENV_RESOURCE_SCHEMA_URL] {
            if let Ok(value) = std::env::var(name) {
                map.insert(name.to_owned(), value);
            }
        }
        Self::from_env_map(&map)
    }

    /// Detect a resource from an explicit env map (deterministic for tests).
    pub fn from_env_map(env: &BTreeMap<String, String>) -> Result<Self, ResourceError> {
        let kind = env.get(ENV_RESOURCE_TYPE).map(String::as_str);
        let labels = match env.get(ENV_RESOURCE_LABELS) {
            None => Vec::new(),
            Some(raw) => parse_label_list(raw)?,
        };
        let resource = Self::new(kind, labels)?;
        match env.get(ENV_RESOURCE_SCHEMA_URL) {
            Some(url) if !url.trim().is_empty() => resource.with_schema_url(url),
            _ => Ok(resource),
        }
    }

    /// Resource type, if any.
    #[must_use]
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    /// Schema URL, if any.
    #[must_use]
    pub fn schema_url(&self) -> Option<&str> {
        self.schema_url.as_deref()
    }

    /// Resource labels, sorted by key.
    #[must_use]
    pub const fn labels(&self) -> &BTreeMap<Box<str>, Box<str>> {
        &self.labels
    }

    /// Returns true when no type, labels, or schema URL are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kind.is_none() && self.labels.is_empty() && self.schema_url.is_none()
    }

    /// Combine two resources. `self` has priority: its type and schema URL
    /// win when set and its labels win on key conflicts.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        let mut labels = other.labels.clone();
        for (key, value) in &self.labels {
            labels.insert(key.clone(), value.clone());
        }
        Self {
            kind: self.kind.clone().or_else(|| other.kind.clone()),
            labels,
            schema_url: self.schema_url.clone().or_else(|| other.schema_url.clone()),
        }
    }
}

fn parse_label_list(raw: &str) -> Result<Vec<(String, String)>, ResourceError> {
    let mut labels = Vec::new();
    for entry in raw.split(LABEL_LIST_SPLITTER) {
        if entry.trim().is_empty() {
            continue;
        }
        let Some((key, value)) = entry.split_once(LABEL_KEY_VALUE_SPLITTER) else {
            return Err(ResourceError::MalformedLabelEntry {
                entry: entry.trim().to_owned(),
            });
        };
        let value = value.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|inner| inner.strip_suffix('"'))
            .unwrap_or(value);
        labels.push((key.trim().to_owned(), value.to_owned()));
    }
    Ok(labels)
}

fn is_valid_text(value: &str) -> bool {
    value.len() <= MAX_RESOURCE_LENGTH && value.bytes().all(|byte| (b' '..=b'~').contains(&byte))
}
