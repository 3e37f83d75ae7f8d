//! # openconsensus-config
//!
//! Registry configuration: schema, env overrides, file loading, and the
//! wiring that turns a validated config into a `MetricRegistry` and a
//! global `tracing` subscriber.
//!
//! ```
//! use openconsensus_config::{OcEnv, build_registry, parse_registry_config_toml};
//! use openconsensus_config::apply_env_overrides;
//!
//! # fn main() -> Result<(), openconsensus_shared::ErrorEnvelope> {
//! let config = parse_registry_config_toml("component = \"db\"\nclock = \"zero\"\n")?;
//! let config = apply_env_overrides(config.into_inner(), &OcEnv::default())?;
//! let registry = build_registry(&config);
//! assert_eq!(registry.component(), "db");
//! # Ok(())
//! # }
//! ```

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

/// Environment variable parsing and merging.
pub mod env;
/// Config loading helpers (file + env).
pub mod load;
pub mod logging;
pub mod registry;
/// Configuration schema types and helpers.
pub mod schema;
pub mod schema_export;

pub use env::{
    ENV_LOG_FORMAT, ENV_LOG_LEVEL, ENV_METRICS_CLOCK, ENV_METRICS_COMPONENT, EnvParseError, OcEnv,
    apply_env_overrides,
};
pub use load::{
    ConfigFormat, load_registry_config_from_path, load_registry_config_from_sources,
    load_registry_config_std_env, to_pretty_json, to_pretty_toml,
};
pub use logging::init_tracing;
pub use registry::{build_registry, clock_for};
pub use schema::{
    CURRENT_CONFIG_VERSION, ClockKind, ConfigSchemaError, DEFAULT_LOG_LEVEL, LogFormat,
    LoggingConfig, RegistryConfig, ResourceConfig, ValidatedRegistryConfig,
    parse_registry_config_json, parse_registry_config_toml,
};
pub use schema_export::registry_config_schema;

/// Returns the config crate version.
#[must_use]
pub const fn config_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use openconsensus_metrics::metrics_crate_version;
    use openconsensus_shared::shared_crate_version;

    #[test]
    fn config_crate_compiles() {
        let version = config_crate_version();
        assert!(!version.is_empty());
    }

    #[test]
    fn config_can_use_metrics_and_shared() {
        assert!(!metrics_crate_version().is_empty());
        assert!(!shared_crate_version().is_empty());
    }
}
