//! Metric names and label primitives with validated constructors.

use crate::error::MetricError;
use openconsensus_tags::TagContext;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator inserted between a registry component and a metric name.
pub const COMPONENT_SEPARATOR: char = '_';

/// Case-sensitive, non-empty metric name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MetricName(Box<str>);

impl MetricName {
    /// Parse a metric name. Any non-empty string is kept byte for byte.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, MetricError> {
        let raw = input.as_ref();
        if raw.is_empty() {
            return Err(MetricError::InvalidName);
        }
        Ok(Self(raw.into()))
    }

    /// Borrow the name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Prepend `component` and the separator, unless `component` is empty.
    #[must_use]
    pub fn prefixed(&self, component: &str) -> Self {
        if component.is_empty() {
            return self.clone();
        }
        Self(format!("{component}{COMPONENT_SEPARATOR}{}", self.0).into_boxed_str())
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl AsRef<str> for MetricName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<String> for MetricName {
    type Error = MetricError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<MetricName> for String {
    fn from(name: MetricName) -> Self {
        name.0.into_string()
    }
}

/// Name of one dimension of a metric's time series.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LabelKey(Box<str>);

impl LabelKey {
    /// Parse a label key, trimming surrounding whitespace.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, MetricError> {
        let raw = input.as_ref();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(MetricError::InvalidLabelKey {
                input_length: raw.len(),
            });
        }
        Ok(Self(trimmed.into()))
    }

    /// Borrow the key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LabelKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<String> for LabelKey {
    type Error = MetricError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<LabelKey> for String {
    fn from(key: LabelKey) -> Self {
        key.0.into_string()
    }
}

/// Value of one label dimension. An unset value is distinct from an empty one.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelValue(Option<Box<str>>);

impl LabelValue {
    /// A present label value. Any string, including the empty string, is accepted.
    pub fn new(value: impl AsRef<str>) -> Self {
        Self(Some(value.as_ref().into()))
    }

    /// The missing value.
    #[must_use]
    pub const fn unset() -> Self {
        Self(None)
    }

    /// The value, or `None` when unset.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Returns true when a value is present.
    #[must_use]
    pub const fn is_set(&self) -> bool {
        self.0.is_some()
    }

    /// Pick label values for `keys` out of a tag context.
    ///
    /// Each key maps to the tag of the same name; keys without a matching tag
    /// yield [`LabelValue::unset`]. The result lines up with `keys`, so it can
    /// be passed straight to `get_or_create_time_series`.
    #[must_use]
    pub fn from_tag_context(context: &TagContext, keys: &[LabelKey]) -> Vec<Self> {
        keys.iter()
            .map(|key| {
                context
                    .get(key.as_str())
                    .map_or_else(Self::unset, |value| Self::new(value.as_str()))
            })
            .collect()
    }
}

impl From<&str> for LabelValue {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<Option<&str>> for LabelValue {
    fn from(value: Option<&str>) -> Self {
        value.map_or_else(Self::unset, Self::new)
    }
}

/// Reject repeated keys in a label schema.
pub(crate) fn ensure_unique_keys(keys: &[LabelKey]) -> Result<(), MetricError> {
    for (index, key) in keys.iter().enumerate() {
        if keys.iter().skip(index + 1).any(|other| other == key) {
            return Err(MetricError::DuplicateLabelKey {
                key: key.as_str().to_owned(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use openconsensus_tags::{TagContextBuilder, TagKey, TagValue};

    #[test]
    fn metric_name_rejects_only_empty_input() -> Result<(), MetricError> {
        assert_eq!(MetricName::parse("").err(), Some(MetricError::InvalidName));
        assert_eq!(MetricName::parse("   ")?.as_str(), "   ");
        Ok(())
    }

    #[test]
    fn metric_name_is_exact_and_case_sensitive() -> Result<(), MetricError> {
        let padded = MetricName::parse(" latency ")?;
        let plain = MetricName::parse("latency")?;
        let upper = MetricName::parse("Latency")?;
        assert_eq!(padded.as_str(), " latency ");
        assert_ne!(padded, plain);
        assert_ne!(plain, upper);
        Ok(())
    }

    #[test]
    fn prefix_is_skipped_for_empty_component() -> Result<(), MetricError> {
        let name = MetricName::parse("latency")?;
        assert_eq!(name.prefixed("db").as_str(), "db_latency");
        assert_eq!(name.prefixed("").as_str(), "latency");
        Ok(())
    }

    #[test]
    fn unset_and_empty_label_values_differ() {
        assert_ne!(LabelValue::unset(), LabelValue::new(""));
        assert!(!LabelValue::unset().is_set());
        assert_eq!(LabelValue::from(Some("x")).as_str(), Some("x"));
        assert_eq!(LabelValue::from(None).as_str(), None);
    }

    #[test]
    fn duplicate_keys_are_rejected() -> Result<(), MetricError> {
        let keys = [
            LabelKey::parse("method")?,
            LabelKey::parse("status")?,
            LabelKey::parse("method")?,
        ];
        assert_eq!(
            ensure_unique_keys(&keys),
            Err(MetricError::DuplicateLabelKey {
                key: "method".to_owned()
            })
        );
        assert!(ensure_unique_keys(&keys[..2]).is_ok());
        Ok(())
    }

    #[test]
    fn label_values_follow_tag_context() -> Result<(), Box<dyn std::error::Error>> {
        let context = TagContextBuilder::new()
            .put(TagKey::new("method")?, TagValue::new("GET")?)
            .put(TagKey::new("ignored")?, TagValue::new("x")?)
            .build();
        let keys = [LabelKey::parse("status")?, LabelKey::parse("method")?];

        let values = LabelValue::from_tag_context(&context, &keys);
        assert_eq!(values, vec![LabelValue::unset(), LabelValue::new("GET")]);
        Ok(())
    }

    #[test]
    fn label_key_serde_validates() {
        let parsed: Result<LabelKey, _> = serde_json::from_str("\"method\"");
        assert!(parsed.is_ok());
        let parsed: Result<LabelKey, _> = serde_json::from_str("\" \"");
        assert!(parsed.is_err());
    }
}
