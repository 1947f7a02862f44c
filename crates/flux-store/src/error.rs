//! Error types for credential storage.

use std::io;

use thiserror::Error;

/// Errors that can occur while reading or writing the credential store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The key cannot be used as a storage key.
    #[error("invalid key {key:?}: {reason}")]
    InvalidKey {
        /// The rejected key.
        key: String,
        /// Why the key was rejected.
        reason: &'static str,
    },

    /// The underlying storage failed.
    #[error("storage i/o failed for key {key:?}: {source}")]
    Io {
        /// The key being accessed.
        key: String,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The store could not be opened.
    #[error("failed to open store at {path}: {source}")]
    Open {
        /// The directory that could not be prepared.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A stored value is not valid UTF-8.
    #[error("stored value for key {key:?} is not valid utf-8")]
    Corrupt {
        /// The key whose value is unreadable.
        key: String,
    },
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formats_correctly() {
        let err = StoreError::InvalidKey {
            key: "../etc".to_string(),
            reason: "contains a path separator",
        };
        assert_eq!(
            err.to_string(),
            r#"invalid key "../etc": contains a path separator"#
        );

        let err = StoreError::Io {
            key: "42".to_string(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), r#"storage i/o failed for key "42": denied"#);

        let err = StoreError::Corrupt {
            key: "7".to_string(),
        };
        assert_eq!(err.to_string(), r#"stored value for key "7" is not valid utf-8"#);
    }
}
