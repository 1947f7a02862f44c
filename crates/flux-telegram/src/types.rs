//! Bot API wire types.
//!
//! Only the fields this bot reads are modelled; everything else in the API's
//! JSON is ignored.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TransportError};

/// Envelope wrapping every Bot API response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the call succeeded.
    pub ok: bool,
    /// The payload on success.
    #[serde(default = "Option::default")]
    pub result: Option<T>,
    /// Error description on failure.
    #[serde(default)]
    pub description: Option<String>,
    /// Error code (an HTTP status) on failure.
    #[serde(default)]
    pub error_code: Option<u16>,
}

impl<T> ApiResponse<T> {
    /// Converts the envelope into the payload or a transport error.
    ///
    /// `http_status` is used as the error code when the API omits one.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Api` when `ok` is false and
    /// `TransportError::Decode` when a successful response has no result.
    pub fn into_result(self, http_status: u16) -> Result<T> {
        if !self.ok {
            return Err(TransportError::Api {
                code: self.error_code.unwrap_or(http_status),
                description: self
                    .description
                    .unwrap_or_else(|| "request failed".to_string()),
            });
        }
        self.result
            .ok_or_else(|| TransportError::Decode("response has no result".to_string()))
    }
}

/// A Telegram user or bot account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    /// Unique identifier.
    pub id: i64,
    /// Whether this account is a bot.
    #[serde(default)]
    pub is_bot: bool,
    /// The account's username, without the `@`.
    #[serde(default)]
    pub username: Option<String>,
}

/// A chat the bot participates in.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Chat {
    /// Chat identifier; negative for groups and channels.
    pub id: i64,
    /// Chat kind (`private`, `group`, `supergroup`, `channel`).
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// An incoming message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Message {
    /// Message identifier within the chat.
    pub message_id: i64,
    /// The chat the message was sent in.
    pub chat: Chat,
    /// Sender, absent for channel posts.
    #[serde(default)]
    pub from: Option<User>,
    /// Text content, if this is a text message.
    #[serde(default)]
    pub text: Option<String>,
}

/// An item returned by `getUpdates`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Update {
    /// Monotonic update identifier used as the polling offset.
    pub update_id: i64,
    /// New incoming message, if this update carries one.
    #[serde(default)]
    pub message: Option<Message>,
}

/// Body of a `sendMessage` call.
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageRequest<'a> {
    /// Target chat.
    pub chat_id: i64,
    /// Message text in the chosen parse mode.
    pub text: &'a str,
    /// Markup dialect of `text`.
    pub parse_mode: &'static str,
}

/// Markup dialect used for every outgoing message.
pub const PARSE_MODE: &str = "MarkdownV2";
