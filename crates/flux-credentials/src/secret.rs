//! Webhook secrets.

use std::fmt;

use subtle::ConstantTimeEq;
use uuid::Uuid;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// The random token that authorizes posting to a recipient's webhook.
///
/// Generated as a random (v4) UUID in hyphenated form: 122 bits from the OS
/// random source, independent of the recipient and of the clock.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct WebhookSecret {
    value: String,
}

impl WebhookSecret {
    /// Generates a fresh secret.
    #[must_use]
    pub fn generate() -> Self {
        Self {
            value: Uuid::new_v4().hyphenated().to_string(),
        }
    }

    /// Wraps an existing secret string.
    #[must_use]
    pub fn from_string(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Returns the secret text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Compares against a presented token in constant time.
    #[must_use]
    pub fn matches(&self, presented: &str) -> bool {
        constant_time_eq(&self.value, presented)
    }
}

impl fmt::Debug for WebhookSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookSecret")
            .field("value", &"[REDACTED]")
            .finish()
    }
}

impl PartialEq for WebhookSecret {
    fn eq(&self, other: &Self) -> bool {
        constant_time_eq(&self.value, &other.value)
    }
}

impl Eq for WebhookSecret {}

/// Byte-for-byte comparison whose running time does not depend on where the
/// inputs first differ. Inputs of different lengths compare unequal.
pub(crate) fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
