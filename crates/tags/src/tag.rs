//! Tag keys, values, and pairs with validated constructors.

use openconsensus_shared::{ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Maximum length of a tag key or value.
pub const MAX_TAG_LENGTH: usize = 255;

/// Validation failures for tag keys and values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    /// Key is empty, too long, or not printable ASCII.
    #[error("tag key must be 1..=255 printable ASCII characters")]
    InvalidKey {
        /// Length of the raw input.
        input_length: usize,
    },
    /// Value is too long or not printable ASCII.
    #[error("tag value must be at most 255 printable ASCII characters")]
    InvalidValue {
        /// Length of the raw input.
        input_length: usize,
    },
}

impl From<TagError> for ErrorEnvelope {
    fn from(error: TagError) -> Self {
        let (code, input_length) = match error {
            TagError::InvalidKey { input_length } => {
                (ErrorCode::new("tags", "invalid_tag_key"), input_length)
            },
            TagError::InvalidValue { input_length } => {
                (ErrorCode::new("tags", "invalid_tag_value"), input_length)
            },
        };
        Self::expected(code, error.to_string())
            .with_metadata("input_length", input_length.to_string())
    }
}

/// Name of a tag. Cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TagKey(Arc<str>);

impl TagKey {
    /// Validate and build a tag key.
    pub fn new(name: impl AsRef<str>) -> Result<Self, TagError> {
        let name = name.as_ref();
        if name.is_empty() || !is_printable(name) {
            return Err(TagError::InvalidKey {
                input_length: name.len(),
            });
        }
        Ok(Self(Arc::from(name)))
    }

    /// Borrow the key name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for TagKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TagKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TagKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<String> for TagKey {
    type Error = TagError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TagKey> for String {
    fn from(key: TagKey) -> Self {
        key.as_str().to_owned()
    }
}

/// Value of a tag. May be empty. Cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TagValue(Arc<str>);

impl TagValue {
    /// Validate and build a tag value.
    pub fn new(value: impl AsRef<str>) -> Result<Self, TagError> {
        let value = value.as_ref();
        if !is_printable(value) {
            return Err(TagError::InvalidValue {
                input_length: value.len(),
            });
        }
        Ok(Self(Arc::from(value)))
    }

    /// Borrow the value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TagValue {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<String> for TagValue {
    type Error = TagError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TagValue> for String {
    fn from(value: TagValue) -> Self {
        value.as_str().to_owned()
    }
}

/// A key/value pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Tag {
    /// Tag key.
    pub key: TagKey,
    /// Tag value.
    pub value: TagValue,
}

impl Tag {
    /// Pair a key with a value.
    #[must_use]
    pub const fn new(key: TagKey, value: TagValue) -> Self {
        Self { key, value }
    }
}

fn is_printable(value: &str) -> bool {
    value.len() <= MAX_TAG_LENGTH && value.bytes().all(|byte| (b' '..=b'~').contains(&byte))
}
