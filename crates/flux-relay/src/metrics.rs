//! Prometheus metrics for the relay.
//!
//! - `fluxcdbot_webhook_requests_total{outcome}`
//! - `fluxcdbot_commands_total{command,outcome}`
//! - `fluxcdbot_message_send_duration_seconds`

use std::fmt;
use std::time::Duration;

use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::encoding::text::encode;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::histogram::{Histogram, exponential_buckets};
use prometheus_client::registry::Registry;

/// Terminal state of one webhook request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WebhookOutcome {
    /// The event was delivered to the chat.
    Forwarded,
    /// The recipient path segment was not a chat id.
    MalformedRecipient,
    /// The secret did not match.
    Unauthorized,
    /// The body could not be read or decoded.
    MalformedPayload,
    /// The chat transport failed.
    ForwardFailed,
}

impl WebhookOutcome {
    /// Label value for this outcome.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Forwarded => "forwarded",
            Self::MalformedRecipient => "malformed_recipient",
            Self::Unauthorized => "unauthorized",
            Self::MalformedPayload => "malformed_payload",
            Self::ForwardFailed => "forward_failed",
        }
    }
}

/// Result of handling one bot command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandOutcome {
    /// `/start` issued a new secret.
    Issued,
    /// `/start` from a chat that already had one.
    AlreadyRegistered,
    /// `/rotate` replaced the secret.
    Rotated,
    /// `/rotate` from an unregistered chat.
    NotRegistered,
    /// The credential store failed.
    StoreFailed,
    /// The reply could not be sent.
    SendFailed,
}

impl CommandOutcome {
    /// Label value for this outcome.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Issued => "issued",
            Self::AlreadyRegistered => "already_registered",
            Self::Rotated => "rotated",
            Self::NotRegistered => "not_registered",
            Self::StoreFailed => "store_failed",
            Self::SendFailed => "send_failed",
        }
    }
}

/// Label set for webhook request metrics.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct WebhookLabels {
    /// The request outcome.
    pub outcome: String,
}

/// Label set for command metrics.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct CommandLabels {
    /// The command name without the slash.
    pub command: String,
    /// The command outcome.
    pub outcome: String,
}

/// All relay metrics and the registry that exposes them.
pub struct RelayMetrics {
    registry: Registry,
    webhook_requests: Family<WebhookLabels, Counter>,
    commands: Family<CommandLabels, Counter>,
    send_duration: Histogram,
}

impl fmt::Debug for RelayMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayMetrics").finish_non_exhaustive()
    }
}

impl Default for RelayMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl RelayMetrics {
    /// Creates and registers all relay metrics.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let webhook_requests = Family::<WebhookLabels, Counter>::default();
        registry.register(
            "fluxcdbot_webhook_requests",
            "Webhook requests by outcome",
            webhook_requests.clone(),
        );

        let commands = Family::<CommandLabels, Counter>::default();
        registry.register(
            "fluxcdbot_commands",
            "Bot commands by command and outcome",
            commands.clone(),
        );

        // 5ms to ~20s
        let send_duration = Histogram::new(exponential_buckets(0.005, 2.0, 12));
        registry.register(
            "fluxcdbot_message_send_duration_seconds",
            "Latency of outbound sendMessage calls in seconds",
            send_duration.clone(),
        );

        Self {
            registry,
            webhook_requests,
            commands,
            send_duration,
        }
    }

    /// Counts one webhook request.
    pub fn record_webhook(&self, outcome: WebhookOutcome) {
        self.webhook_requests
            .get_or_create(&WebhookLabels {
                outcome: outcome.as_str().to_string(),
            })
            .inc();
    }

    /// Counts one handled command.
    pub fn record_command(&self, command: &str, outcome: CommandOutcome) {
        self.commands
            .get_or_create(&CommandLabels {
                command: command.to_string(),
                outcome: outcome.as_str().to_string(),
            })
            .inc();
    }

    /// Records the latency of one `sendMessage` call.
    pub fn observe_send(&self, elapsed: Duration) {
        self.send_duration.observe(elapsed.as_secs_f64());
    }

    #[cfg(test)]
    pub(crate) fn webhook_count(&self, outcome: WebhookOutcome) -> u64 {
        self.webhook_requests
            .get_or_create(&WebhookLabels {
                outcome: outcome.as_str().to_string(),
            })
            .get()
    }

    #[cfg(test)]
    pub(crate) fn command_count(&self, command: &str, outcome: CommandOutcome) -> u64 {
        self.commands
            .get_or_create(&CommandLabels {
                command: command.to_string(),
                outcome: outcome.as_str().to_string(),
            })
            .get()
    }

    /// Encodes all metrics in the Prometheus text format.
    #[must_use]
    pub fn encode(&self) -> String {
        let mut buffer = String::new();
        if encode(&mut buffer, &self.registry).is_err() {
            tracing::error!("failed to encode prometheus metrics");
            return String::new();
        }
        buffer
    }

    /// Content-Type of [`encode`](Self::encode) output.
    #[must_use]
    pub const fn content_type() -> &'static str {
        "text/plain; version=0.0.4; charset=utf-8"
    }
}
