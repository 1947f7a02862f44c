//! Telegram Bot API client.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::{Result, TransportError};
use crate::poller::UpdateSource;
use crate::transport::ChatTransport;
use crate::types::{ApiResponse, PARSE_MODE, SendMessageRequest, Update, User};

/// Default Bot API endpoint.
pub const TELEGRAM_DEFAULT_API_BASE_URL: &str = "https://api.telegram.org";

/// Extra time granted to a long-poll request beyond its server-side timeout.
const POLL_GRACE: Duration = Duration::from_secs(10);

/// A client for one bot account.
#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    base_url: String,
    token: String,
}

impl TelegramClient {
    /// Creates a client for `token` against the Bot API at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::InvalidApiUrl` if `base_url` is not an
    /// absolute http(s) URL, or `TransportError::Request` if the HTTP client
    /// cannot be built.
    pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self> {
        let parsed = Url::parse(base_url).map_err(|e| TransportError::InvalidApiUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(TransportError::InvalidApiUrl {
                url: base_url.to_string(),
                reason: format!("unsupported scheme {:?}", parsed.scheme()),
            });
        }

        let client = Client::builder()
            .build()
            .map_err(|e| TransportError::Request(format!("failed to build http client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    /// Builds the endpoint URL for a Bot API method.
    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response.bytes().await?;

        match serde_json::from_slice::<ApiResponse<T>>(&body) {
            Ok(envelope) => envelope.into_result(status.as_u16()),
            Err(_) if !status.is_success() => Err(TransportError::Api {
                code: status.as_u16(),
                description: status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string(),
            }),
            Err(e) => Err(TransportError::Decode(e.to_string())),
        }
    }

    /// Returns the bot's own account, validating the token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects the token.
    pub async fn get_me(&self) -> Result<User> {
        let response = self.client.get(self.api_url("getMe")).send().await?;
        Self::parse(response).await
    }

    /// Sends a `MarkdownV2` text message to a chat.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Api` if the API rejects the message, or a
    /// request/decode error if the call itself fails.
    pub async fn send_text(&self, chat_id: i64, text: &str) -> Result<()> {
        let body = SendMessageRequest {
            chat_id,
            text,
            parse_mode: PARSE_MODE,
        };
        let response = self
            .client
            .post(self.api_url("sendMessage"))
            .json(&body)
            .send()
            .await?;

        let _: serde_json::Value = Self::parse(response).await?;
        debug!(chat_id, "message delivered");
        Ok(())
    }

    /// Long-polls for updates after `offset`, waiting up to `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API reports an error.
    pub async fn fetch_updates(
        &self,
        offset: Option<i64>,
        timeout: Duration,
    ) -> Result<Vec<Update>> {
        let mut query = vec![("timeout", timeout.as_secs().to_string())];
        if let Some(offset) = offset {
            query.push(("offset", offset.to_string()));
        }

        let response = self
            .client
            .get(self.api_url("getUpdates"))
            .query(&query)
            .timeout(timeout + POLL_GRACE)
            .send()
            .await?;
        Self::parse(response).await
    }
}

impl fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramClient")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl ChatTransport for TelegramClient {
    fn send_message<'a>(
        &'a self,
        chat_id: i64,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(self.send_text(chat_id, text))
    }
}

impl UpdateSource for TelegramClient {
    fn get_updates(
        &self,
        offset: Option<i64>,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Update>>> + Send + '_>> {
        Box::pin(self.fetch_updates(offset, timeout))
    }
}
