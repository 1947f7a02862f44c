//! # flux-credentials
//!
//! Webhook credential lifecycle for fluxcdbot.
//!
//! Every chat that registers gets a random secret, stored under its chat id.
//! The secret is embedded in a callback URL; events posted to that URL are
//! accepted only if the secret still matches the stored one.
//!
//! - [`RecipientId`]: the one conversion between chat ids and store keys
//! - [`WebhookSecret`]: random token with redacted `Debug` and zeroize-on-drop
//! - [`CredentialManager`]: `register`, `rotate` and `verify` over a
//!   [`flux_store::CredentialStore`]
//! - [`callback`]: URL joining and markup escaping
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use flux_credentials::{CredentialManager, RecipientId, Registration, callback};
//! use flux_store::MemoryStore;
//!
//! let manager = CredentialManager::new(Arc::new(MemoryStore::new()));
//! let recipient = RecipientId::from_chat_id(42);
//!
//! let Registration::Issued(secret) = manager.register(recipient).expect("register") else {
//!     unreachable!("first registration always issues");
//! };
//! assert!(manager.verify(recipient, secret.as_str()));
//!
//! let base = url::Url::parse("https://bot.example.com").expect("url");
//! let link = callback::webhook_url(&base, recipient, &secret);
//! assert!(link.as_str().starts_with("https://bot.example.com/api/v1/webhook/42/"));
//! ```

#![forbid(unsafe_code)]

pub mod callback;
pub mod error;
pub mod manager;
pub mod recipient;
pub mod secret;

pub use callback::{WEBHOOK_ENDPOINT, escape_markdown, join_url_path, webhook_url};
pub use error::{CredentialError, Result};
pub use manager::{CredentialManager, Registration};
pub use recipient::RecipientId;
pub use secret::WebhookSecret;
