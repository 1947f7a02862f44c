//! # flux-relay
//!
//! The fluxcdbot service: webhook ingress, bot command handling and the
//! process around them.
//!
//! - [`ingress`]: `POST /api/v1/webhook/{recipient}/{secret}`, verified
//!   before the body is read, forwarded to the chat
//! - [`commands`]: `/start` issues a webhook URL, `/rotate` replaces it
//! - [`internal`]: `/health` and `/metrics`
//! - [`server`]: runs everything until a signal or a fatal error
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use flux_credentials::CredentialManager;
//! use flux_relay::ingress::{self, IngressState};
//! use flux_relay::metrics::RelayMetrics;
//! use flux_store::MemoryStore;
//! use flux_telegram::TelegramClient;
//!
//! let credentials = CredentialManager::new(Arc::new(MemoryStore::new()));
//! let client = TelegramClient::new("https://api.telegram.org", "123:abc").expect("client");
//! let transport = Arc::new(client);
//! let metrics = Arc::new(RelayMetrics::new());
//!
//! let app = ingress::router(IngressState::new(credentials, transport, metrics));
//! # let _ = app;
//! ```

#![forbid(unsafe_code)]

pub mod commands;
pub mod config;
pub mod error;
pub mod event;
pub mod ingress;
pub mod internal;
pub mod metrics;
pub mod server;
pub mod telemetry;

#[cfg(test)]
mod testing;

pub use commands::CommandService;
pub use config::{Cli, LogFormat, LogLevel, RelayConfig};
pub use error::{RelayError, Result};
pub use event::Event;
pub use ingress::{IngressError, IngressState};
pub use metrics::RelayMetrics;
