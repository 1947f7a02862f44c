//! Error types for the chat transport.

use thiserror::Error;

/// Errors returned by the Telegram transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The Bot API rejected the call.
    ///
    /// `code` is the API's `error_code` (an HTTP status), `description` its
    /// human-readable explanation. Both are safe to pass on to callers.
    #[error("telegram api error {code}: {description}")]
    Api {
        /// HTTP-equivalent status code.
        code: u16,
        /// Description supplied by the API.
        description: String,
    },

    /// The request could not be sent or the connection failed.
    #[error("telegram request failed: {0}")]
    Request(String),

    /// The API answered with a body that could not be understood.
    #[error("failed to decode telegram response: {0}")]
    Decode(String),

    /// The client was configured with an unusable API base URL.
    #[error("invalid telegram api url {url:?}: {reason}")]
    InvalidApiUrl {
        /// The rejected URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl TransportError {
    /// Returns the API status code if the Bot API rejected the call.
    #[must_use]
    pub const fn api_code(&self) -> Option<u16> {
        match self {
            Self::Api { code, .. } => Some(*code),
            _ => None,
        }
    }
}

// reqwest's Display includes the request URL, and the URL carries the bot
// token. Only the error class is kept.
impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(classify(&err).to_string())
        } else {
            Self::Request(classify(&err).to_string())
        }
    }
}

fn classify(err: &reqwest::Error) -> &'static str {
    if err.is_timeout() {
        "request timeout"
    } else if err.is_connect() {
        "connection error"
    } else if err.is_decode() {
        "invalid response body"
    } else {
        "request failed"
    }
}

/// Result type alias for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;
