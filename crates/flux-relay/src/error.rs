//! Error types for the relay process.

use std::net::SocketAddr;

use flux_store::StoreError;
use flux_telegram::TransportError;
use thiserror::Error;

/// Errors that stop the relay from starting or keep it from running.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The configuration is invalid; the process must not start.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Failed to bind to the specified address.
    #[error("failed to bind to {0}: {1}")]
    BindFailed(SocketAddr, std::io::Error),

    /// The credential store could not be opened.
    #[error("credential store error: {0}")]
    Store(#[from] StoreError),

    /// The chat transport could not be set up.
    #[error("chat transport error: {0}")]
    Transport(#[from] TransportError),

    /// A server stopped with an error.
    #[error("server error: {0}")]
    Server(String),

    /// The tracing subscriber could not be installed.
    #[error("telemetry error: {0}")]
    Telemetry(String),
}

/// Result type alias for relay operations.
pub type Result<T> = std::result::Result<T, RelayError>;
