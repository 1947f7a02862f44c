//! # flux-store
//!
//! Durable key-value storage for fluxcdbot webhook credentials.
//!
//! The store maps a recipient key (the decimal chat id) to that recipient's
//! current webhook secret. It offers three operations, `has`, `read` and
//! `write`, and no delete.
//!
//! - [`DiskStore`]: one file per key, written via temp file + rename
//! - [`MemoryStore`]: in-memory implementation for tests
//!
//! ## Example
//!
//! ```rust
//! use flux_store::{CredentialStore, MemoryStore};
//!
//! let store = MemoryStore::new();
//! store.write("42", "c0ffee").expect("write");
//! assert_eq!(store.read("42").expect("read").as_deref(), Some("c0ffee"));
//! ```

#![forbid(unsafe_code)]

pub mod disk;
pub mod error;
pub mod memory;
pub mod store;

pub use disk::DiskStore;
pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use store::{CredentialStore, validate_key};
