//! Global `tracing` subscriber installation.

use crate::schema::{LogFormat, LoggingConfig};
use openconsensus_shared::ErrorEnvelope;

/// Install a global `fmt` subscriber for the given logging section.
///
/// Returns `Ok(false)` when a global subscriber was already installed; the
/// existing one is left in place.
pub fn init_tracing(config: &LoggingConfig) -> Result<bool, ErrorEnvelope> {
    let filter = config.env_filter()?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = match config.format {
        LogFormat::Pretty => builder.pretty().try_init().is_ok(),
        LogFormat::Json => builder.json().try_init().is_ok(),
    };
    if installed {
        tracing::debug!(
            level = %config.level,
            format = config.format.as_str(),
            "tracing subscriber installed"
        );
    }
    Ok(installed)
}
