//! File-backed credential store.
//!
//! Each key is a file directly under the base directory whose contents are
//! the stored value. Writes are staged in a temp directory and renamed into
//! place, so a reader never observes a partially written value.
//!
//! Once the rename has landed the write is reported as successful: the new
//! value is what every later read returns. A failure to sync the directory
//! afterwards only weakens crash durability and is logged, not returned.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Result, StoreError};
use crate::store::{CredentialStore, validate_key};

/// A durable store rooted at a directory on disk.
///
/// The temp directory should live on the same filesystem as the base
/// directory; a cross-device rename fails and the write is reported as an
/// error.
#[derive(Debug, Clone)]
pub struct DiskStore {
    base_dir: PathBuf,
    tmp_dir: PathBuf,
    sync_dir: fn(&Path) -> io::Result<()>,
}

impl DiskStore {
    /// Opens a store, creating `base_dir` and `tmp_dir` if they do not exist.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Open` if either directory cannot be created.
    pub fn open(base_dir: impl Into<PathBuf>, tmp_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        let tmp_dir = tmp_dir.into();

        for dir in [&base_dir, &tmp_dir] {
            fs::create_dir_all(dir).map_err(|source| StoreError::Open {
                path: dir.display().to_string(),
                source,
            })?;
        }

        info!(
            base_dir = %base_dir.display(),
            tmp_dir = %tmp_dir.display(),
            "opened credential store"
        );

        Ok(Self {
            base_dir,
            tmp_dir,
            sync_dir: sync_dir_entries,
        })
    }

    /// Returns the base directory holding the stored values.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.base_dir.join(key))
    }

    fn io_error(key: &str, source: io::Error) -> StoreError {
        StoreError::Io {
            key: key.to_string(),
            source,
        }
    }

}

/// Flushes directory entries so a completed rename survives a crash.
fn sync_dir_entries(dir: &Path) -> io::Result<()> {
    #[cfg(unix)]
    fs::File::open(dir)?.sync_all()?;
    #[cfg(not(unix))]
    let _ = dir;
    Ok(())
}

impl CredentialStore for DiskStore {
    fn has(&self, key: &str) -> Result<bool> {
        let path = self.path_for(key)?;
        match fs::metadata(&path) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Self::io_error(key, e)),
        }
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Self::io_error(key, e)),
        };

        String::from_utf8(bytes)
            .map(Some)
            .map_err(|_| StoreError::Corrupt {
                key: key.to_string(),
            })
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;

        // Temp files are created with mode 0600 on unix.
        let mut staged = tempfile::Builder::new()
            .prefix(".credential-")
            .tempfile_in(&self.tmp_dir)
            .map_err(|e| Self::io_error(key, e))?;
        staged
            .write_all(value.as_bytes())
            .map_err(|e| Self::io_error(key, e))?;
        staged
            .as_file()
            .sync_all()
            .map_err(|e| Self::io_error(key, e))?;
        staged
            .persist(&path)
            .map_err(|e| Self::io_error(key, e.error))?;

        // The new value is live from here on; the outcome must say so.
        if let Err(e) = (self.sync_dir)(&self.base_dir) {
            warn!(key, error = %e, "credential written but directory sync failed");
        }

        debug!(key, "wrote credential");
        Ok(())
    }
}
