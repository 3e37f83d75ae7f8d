//! JSON Schema export for the registry config file.

use crate::schema::RegistryConfig;
use schemars::{Schema, schema_for};

/// JSON Schema for `RegistryConfig`.
#[must_use]
pub fn registry_config_schema() -> Schema {
    schema_for!(RegistryConfig)
}
