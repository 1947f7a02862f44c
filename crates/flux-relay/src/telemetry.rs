//! Tracing subscriber setup.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LogFormat, LogLevel};
use crate::error::{RelayError, Result};

/// Builds the log filter: `RUST_LOG` when set, otherwise `level`.
#[must_use]
pub fn env_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.directive()))
}

/// Installs the global tracing subscriber.
///
/// # Errors
///
/// Returns `RelayError::Telemetry` if a global subscriber is already set.
pub fn init_tracing(level: LogLevel, format: LogFormat) -> Result<()> {
    let registry = tracing_subscriber::registry().with(env_filter(level));

    let installed = match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(false))
            .try_init(),
        LogFormat::Text => registry.with(fmt::layer()).try_init(),
    };

    installed.map_err(|e| RelayError::Telemetry(e.to_string()))
}
