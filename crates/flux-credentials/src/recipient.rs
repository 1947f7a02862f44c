//! Recipient identity.
//!
//! A recipient is a chat on the messaging platform. The platform addresses it
//! by a signed 64-bit chat id; the credential store keys it by the decimal
//! rendering of that id. [`RecipientId`] is the only place the two forms are
//! converted, so store lookups and message addressing cannot drift apart.

use std::fmt;
use std::str::FromStr;

use crate::error::{CredentialError, Result};

/// A chat that can receive webhook notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecipientId(i64);

impl RecipientId {
    /// Wraps a platform chat id.
    #[must_use]
    pub const fn from_chat_id(chat_id: i64) -> Self {
        Self(chat_id)
    }

    /// Returns the platform chat id used to address messages.
    #[must_use]
    pub const fn chat_id(self) -> i64 {
        self.0
    }

    /// Returns the credential store key: plain decimal, no padding, leading
    /// `-` for negative ids.
    #[must_use]
    pub fn as_key(self) -> String {
        self.0.to_string()
    }

    /// Parses a store key or URL path segment back into a recipient.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::InvalidRecipient` if `input` is not a
    /// base-10 `i64`.
    pub fn parse(input: &str) -> Result<Self> {
        input
            .parse::<i64>()
            .map(Self)
            .map_err(|e| CredentialError::InvalidRecipient {
                input: input.to_string(),
                reason: e.to_string(),
            })
    }
}

impl fmt::Display for RecipientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecipientId {
    type Err = CredentialError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<i64> for RecipientId {
    fn from(chat_id: i64) -> Self {
        Self::from_chat_id(chat_id)
    }
}
