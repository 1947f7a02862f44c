//! Outbound message transport.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::error::Result;

/// Sends chat messages to recipients.
///
/// Implemented by [`TelegramClient`](crate::TelegramClient); tests substitute
/// a recording double. Implementations must not retry on their own.
pub trait ChatTransport: Send + Sync + fmt::Debug {
    /// Sends `text` (already escaped for the markup dialect) to `chat_id`.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Api` when the platform rejects the message
    /// and another variant when the call itself fails.
    fn send_message<'a>(
        &'a self,
        chat_id: i64,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;
}
