//! # flux-telegram
//!
//! Telegram Bot API transport for fluxcdbot.
//!
//! - [`ChatTransport`]: outbound `sendMessage`, the seam the webhook relay
//!   forwards through
//! - [`TelegramClient`]: reqwest-based Bot API client (`getMe`,
//!   `sendMessage`, `getUpdates`)
//! - [`Poller`]: long-polling loop that dispatches `/start` and `/rotate` to
//!   a [`CommandHandler`]
//!
//! Messages are sent with `parse_mode = MarkdownV2`; callers are responsible
//! for escaping text before handing it over.

#![forbid(unsafe_code)]

pub mod client;
pub mod command;
pub mod error;
pub mod poller;
pub mod transport;
pub mod types;

pub use client::{TELEGRAM_DEFAULT_API_BASE_URL, TelegramClient};
pub use command::Command;
pub use error::{Result, TransportError};
pub use poller::{CommandHandler, DEFAULT_POLL_TIMEOUT, Poller, UpdateSource};
pub use transport::ChatTransport;
pub use types::{Update, User};
