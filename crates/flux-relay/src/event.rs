//! Flux notification payloads.

use chrono::{DateTime, Utc};
use flux_credentials::escape_markdown;
use serde::Deserialize;

/// The object an event is about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InvolvedObject {
    /// Resource kind, e.g. `Kustomization`.
    pub kind: String,
    /// Resource namespace.
    pub namespace: String,
    /// Resource name.
    pub name: String,
}

/// An event posted by the Flux notification controller.
///
/// Absent string fields decode as empty and unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Event {
    /// `info` or `error`.
    pub severity: String,
    /// Controller instance that reported the event.
    pub reporting_instance: String,
    /// Human-readable event text.
    pub message: String,
    /// Short machine-readable reason.
    pub reason: Option<String>,
    /// Controller that reported the event.
    pub reporting_controller: Option<String>,
    /// When the event was emitted.
    pub timestamp: Option<DateTime<Utc>>,
    /// The object the event is about.
    pub involved_object: Option<InvolvedObject>,
}

impl Event {
    /// Renders the chat message for this event, escaped for `MarkdownV2`.
    #[must_use]
    pub fn to_message(&self) -> String {
        escape_markdown(&format!(
            "Severity: *{}*\nInstance: *{}*\nMessage:\n```\n{}\n```",
            self.severity, self.reporting_instance, self.message
        ))
    }
}
