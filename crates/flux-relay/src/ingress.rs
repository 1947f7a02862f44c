//! Webhook ingress.
//!
//! `POST /api/v1/webhook/{recipient}/{secret}` runs these steps in order:
//!
//! 1. parse the recipient id (400 on failure, body untouched)
//! 2. verify the secret (403 on mismatch, body untouched)
//! 3. read and decode the event (400 with the decode error)
//! 4. forward the formatted message to the chat
//!
//! Transport API errors are passed back with their own status and
//! description; any other transport failure is a 500.

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::body::Body;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::{Request, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use flux_credentials::{CredentialManager, RecipientId, WEBHOOK_ENDPOINT};
use flux_telegram::{ChatTransport, TransportError};
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::event::Event;
use crate::metrics::{RelayMetrics, WebhookOutcome};

/// Largest accepted event body.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Shared state for the ingress router.
#[derive(Debug, Clone)]
pub struct IngressState {
    credentials: CredentialManager,
    transport: Arc<dyn ChatTransport>,
    metrics: Arc<RelayMetrics>,
}

impl IngressState {
    /// Creates the ingress state.
    #[must_use]
    pub fn new(
        credentials: CredentialManager,
        transport: Arc<dyn ChatTransport>,
        metrics: Arc<RelayMetrics>,
    ) -> Self {
        Self {
            credentials,
            transport,
            metrics,
        }
    }
}

/// Reasons a webhook request is not forwarded.
#[derive(Debug, Error)]
pub enum IngressError {
    /// The recipient path segment is not a chat id.
    #[error("malformed recipient id")]
    MalformedRecipient,

    /// The secret does not match, or the recipient is unknown.
    #[error("unauthorized")]
    Unauthorized,

    /// The body could not be read or decoded.
    #[error("{0}")]
    MalformedPayload(String),

    /// The chat platform rejected the message.
    #[error("{description}")]
    ForwardRejected {
        /// Status reported by the platform.
        code: u16,
        /// Description reported by the platform.
        description: String,
    },

    /// The message could not be sent.
    #[error("{0}")]
    ForwardFailed(String),
}

impl IngressError {
    /// The metrics outcome for this rejection.
    #[must_use]
    pub const fn outcome(&self) -> WebhookOutcome {
        match self {
            Self::MalformedRecipient => WebhookOutcome::MalformedRecipient,
            Self::Unauthorized => WebhookOutcome::Unauthorized,
            Self::MalformedPayload(_) => WebhookOutcome::MalformedPayload,
            Self::ForwardRejected { .. } | Self::ForwardFailed(_) => {
                WebhookOutcome::ForwardFailed
            }
        }
    }

    /// HTTP status for this rejection.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MalformedRecipient | Self::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::FORBIDDEN,
            Self::ForwardRejected { code, .. } => {
                StatusCode::from_u16(*code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            Self::ForwardFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<TransportError> for IngressError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Api { code, description } => {
                Self::ForwardRejected { code, description }
            }
            other => Self::ForwardFailed(other.to_string()),
        }
    }
}

impl IntoResponse for IngressError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Nothing about the recipient or the secret is disclosed.
        let body = match self {
            Self::MalformedRecipient | Self::Unauthorized => String::new(),
            other => other.to_string(),
        };

        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            body,
        )
            .into_response()
    }
}

/// Creates the public webhook router.
pub fn router(state: IngressState) -> Router {
    Router::new()
        .route(
            &format!("{WEBHOOK_ENDPOINT}/{{recipient}}/{{secret}}"),
            post(receive_webhook),
        )
        .with_state(state)
        // The request path carries the secret; keep it out of spans.
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            tracing::debug_span!("webhook", method = %request.method())
        }))
}

async fn receive_webhook(
    State(state): State<IngressState>,
    path: Result<Path<(String, String)>, PathRejection>,
    body: Body,
) -> Response {
    let delivered = match path {
        Ok(Path((recipient, secret))) => deliver(&state, &recipient, &secret, body).await,
        Err(rejection) => {
            // Segments that are not UTF-8 once decoded cannot name a chat.
            debug!(error = %rejection, "rejected webhook with undecodable path");
            Err(IngressError::MalformedRecipient)
        }
    };

    match delivered {
        Ok(()) => {
            state.metrics.record_webhook(WebhookOutcome::Forwarded);
            StatusCode::OK.into_response()
        }
        Err(err) => {
            state.metrics.record_webhook(err.outcome());
            err.into_response()
        }
    }
}

async fn deliver(
    state: &IngressState,
    recipient: &str,
    secret: &str,
    body: Body,
) -> Result<(), IngressError> {
    let recipient = RecipientId::parse(recipient).map_err(|e| {
        debug!(error = %e, "rejected webhook for malformed recipient");
        IngressError::MalformedRecipient
    })?;

    if !state.credentials.verify(recipient, secret) {
        info!(recipient = %recipient, "rejected webhook with invalid secret");
        return Err(IngressError::Unauthorized);
    }

    let bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| IngressError::MalformedPayload(format!("failed to read body: {e}")))?;
    let event: Event = serde_json::from_slice(&bytes)
        .map_err(|e| IngressError::MalformedPayload(e.to_string()))?;

    debug!(
        recipient = %recipient,
        severity = %event.severity,
        instance = %event.reporting_instance,
        reason = ?event.reason,
        controller = ?event.reporting_controller,
        timestamp = ?event.timestamp,
        object = ?event.involved_object,
        "received event"
    );

    let text = event.to_message();
    let started = Instant::now();
    let sent = state.transport.send_message(recipient.chat_id(), &text).await;
    state.metrics.observe_send(started.elapsed());

    if let Err(e) = sent {
        warn!(recipient = %recipient, error = %e, "failed to forward event");
        return Err(e.into());
    }

    info!(recipient = %recipient, severity = %event.severity, "forwarded event");
    Ok(())
}
