//! Credential lifecycle: issue, rotate, verify.
//!
//! Each recipient is either unregistered (no record in the store) or
//! registered (exactly one live secret). Registration is idempotent, rotation
//! replaces the secret with a single store write, and verification is an
//! exact constant-time match against the stored value.

use std::sync::Arc;

use flux_store::CredentialStore;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::error::{CredentialError, Result};
use crate::recipient::RecipientId;
use crate::secret::{WebhookSecret, constant_time_eq};

/// Outcome of [`CredentialManager::register`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// A new secret was stored for a first-time recipient.
    Issued(WebhookSecret),
    /// The recipient already had a secret; nothing was written.
    AlreadyRegistered,
}

/// Stateless facade enforcing the credential protocol over a store.
#[derive(Debug, Clone)]
pub struct CredentialManager {
    store: Arc<dyn CredentialStore>,
}

impl CredentialManager {
    /// Creates a manager over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Issues a secret for a recipient that has none.
    ///
    /// Does nothing if the recipient is already registered. The caller must
    /// only announce a URL when this returns [`Registration::Issued`].
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::Store` if the store cannot be queried or the
    /// write fails; the recipient stays unregistered.
    pub fn register(&self, recipient: RecipientId) -> Result<Registration> {
        let key = recipient.as_key();
        if self.store.has(&key)? {
            debug!(recipient = %recipient, "recipient already registered");
            return Ok(Registration::AlreadyRegistered);
        }

        let secret = WebhookSecret::generate();
        self.store.write(&key, secret.as_str())?;

        info!(recipient = %recipient, "issued webhook credential");
        Ok(Registration::Issued(secret))
    }

    /// Replaces a registered recipient's secret with a fresh one.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::NotRegistered` without writing anything if
    /// the recipient has no secret, or `CredentialError::Store` if the write
    /// fails, in which case the previous secret stays valid.
    pub fn rotate(&self, recipient: RecipientId) -> Result<WebhookSecret> {
        let key = recipient.as_key();
        if !self.store.has(&key)? {
            return Err(CredentialError::NotRegistered { recipient: key });
        }

        let secret = WebhookSecret::generate();
        self.store.write(&key, secret.as_str())?;

        info!(recipient = %recipient, "rotated webhook credential");
        Ok(secret)
    }

    /// Returns true iff `presented` equals the recipient's stored secret.
    ///
    /// Unknown recipients and store failures both verify as false; callers
    /// cannot tell them apart from a wrong secret.
    pub fn verify(&self, recipient: RecipientId, presented: &str) -> bool {
        match self.store.read(&recipient.as_key()) {
            Ok(Some(stored)) => {
                let stored = Zeroizing::new(stored);
                constant_time_eq(&stored, presented)
            }
            Ok(None) => false,
            Err(e) => {
                warn!(recipient = %recipient, error = %e, "credential lookup failed");
                false
            }
        }
    }
}
