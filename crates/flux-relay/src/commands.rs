//! `/start` and `/rotate` handlers.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use flux_credentials::{
    CredentialError, CredentialManager, RecipientId, Registration, WebhookSecret, escape_markdown,
    webhook_url,
};
use flux_telegram::{ChatTransport, Command, CommandHandler};
use tracing::{error, info, warn};
use url::Url;

use crate::metrics::{CommandOutcome, RelayMetrics};

const NOT_INITIALIZED: &str =
    "This chat is not yet initialized. Send /start to start receiving updates.";

/// Executes bot commands against the credential manager and replies in chat.
#[derive(Debug, Clone)]
pub struct CommandService {
    credentials: CredentialManager,
    transport: Arc<dyn ChatTransport>,
    base_url: Url,
    metrics: Arc<RelayMetrics>,
}

impl CommandService {
    /// Creates a command service that builds links on `base_url`.
    #[must_use]
    pub fn new(
        credentials: CredentialManager,
        transport: Arc<dyn ChatTransport>,
        base_url: Url,
        metrics: Arc<RelayMetrics>,
    ) -> Self {
        Self {
            credentials,
            transport,
            base_url,
            metrics,
        }
    }

    /// Runs `command` for `chat_id` and sends the reply, if any.
    ///
    /// A reply that fails to send does not undo the credential change.
    pub async fn execute(&self, command: Command, chat_id: i64) {
        let recipient = RecipientId::from_chat_id(chat_id);
        let (mut outcome, reply) = match command {
            Command::Start => self.start(recipient),
            Command::Rotate => self.rotate(recipient),
        };

        if let Some(text) = reply {
            let started = Instant::now();
            let sent = self.transport.send_message(chat_id, &text).await;
            self.metrics.observe_send(started.elapsed());
            if let Err(e) = sent {
                warn!(
                    recipient = %recipient,
                    command = %command,
                    error = %e,
                    "failed to send reply"
                );
                outcome = CommandOutcome::SendFailed;
            }
        }

        self.metrics.record_command(command.name(), outcome);
    }

    fn start(&self, recipient: RecipientId) -> (CommandOutcome, Option<String>) {
        match self.credentials.register(recipient) {
            Ok(Registration::Issued(secret)) => (
                CommandOutcome::Issued,
                Some(self.link_reply("Your webhook URL is:", recipient, &secret)),
            ),
            Ok(Registration::AlreadyRegistered) => (CommandOutcome::AlreadyRegistered, None),
            Err(e) => {
                error!(recipient = %recipient, error = %e, "failed to register recipient");
                (CommandOutcome::StoreFailed, None)
            }
        }
    }

    fn rotate(&self, recipient: RecipientId) -> (CommandOutcome, Option<String>) {
        match self.credentials.rotate(recipient) {
            Ok(secret) => (
                CommandOutcome::Rotated,
                Some(self.link_reply("Your new webhook URL is:", recipient, &secret)),
            ),
            Err(CredentialError::NotRegistered { .. }) => {
                info!(recipient = %recipient, "rotate requested by unregistered recipient");
                (CommandOutcome::NotRegistered, Some(escape_markdown(NOT_INITIALIZED)))
            }
            Err(e) => {
                error!(recipient = %recipient, error = %e, "failed to rotate credential");
                (CommandOutcome::StoreFailed, None)
            }
        }
    }

    /// `<heading>\n[<escaped url>](<url>)`
    fn link_reply(&self, heading: &str, recipient: RecipientId, secret: &WebhookSecret) -> String {
        let url = webhook_url(&self.base_url, recipient, secret);
        format!("{heading}\n[{}]({url})", escape_markdown(url.as_str()))
    }
}

impl CommandHandler for CommandService {
    fn handle(
        &self,
        command: Command,
        chat_id: i64,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(self.execute(command, chat_id))
    }
}
