//! Error types for the credential lifecycle.

use flux_store::StoreError;
use thiserror::Error;

/// Errors that can occur while issuing or rotating webhook credentials.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The text is not a valid recipient identifier.
    #[error("invalid recipient id {input:?}: {reason}")]
    InvalidRecipient {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Rotation was requested for a recipient that never registered.
    #[error("recipient {recipient} is not registered")]
    NotRegistered {
        /// The recipient's store key.
        recipient: String,
    },

    /// The credential store failed; no state was changed.
    #[error("credential store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type alias for credential operations.
pub type Result<T> = std::result::Result<T, CredentialError>;
