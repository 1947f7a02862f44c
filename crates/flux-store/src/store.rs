//! The credential store contract.

use std::fmt;

use crate::error::{Result, StoreError};

/// A key-value store mapping recipient keys to secret strings.
///
/// Implementations must make `write` atomic with respect to concurrent
/// `read`/`has`/`write` calls on the same key: a reader observes either the
/// previous value or the new one, never a partial value. There is no delete;
/// `write` is an upsert.
pub trait CredentialStore: Send + Sync + fmt::Debug {
    /// Returns true if a value exists for `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or the storage cannot be queried.
    fn has(&self, key: &str) -> Result<bool>;

    /// Reads the value stored under `key`, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or the storage cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or the write did not complete.
    /// On error the previous value, if any, is still in place.
    fn write(&self, key: &str, value: &str) -> Result<()>;
}

/// Checks that `key` is usable as a flat storage key.
///
/// # Errors
///
/// Returns `StoreError::InvalidKey` for empty keys, `.`/`..`, and keys
/// containing path separators or NUL bytes.
pub fn validate_key(key: &str) -> Result<()> {
    let reason = if key.is_empty() {
        "key cannot be empty"
    } else if key == "." || key == ".." {
        "key cannot be a relative path component"
    } else if key.contains(['/', '\\']) {
        "contains a path separator"
    } else if key.contains('\0') {
        "contains a nul byte"
    } else {
        return Ok(());
    };

    Err(StoreError::InvalidKey {
        key: key.to_string(),
        reason,
    })
}
