//! Location, password and format of an on-disk trust store.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use trustcert_core::{Result, TrustError};

use super::codec;
use super::TrustStore;
use crate::config::{StoreFormat, TrustConfig};

/// Handle to a trust store file.
///
/// Writes go through a sibling temp file that is renamed into place, so an
/// interrupted save never leaves a half-written store behind.
#[derive(Clone)]
pub struct TrustStoreHandle {
    path: PathBuf,
    password: String,
    format: StoreFormat,
}

impl fmt::Debug for TrustStoreHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrustStoreHandle")
            .field("path", &self.path)
            .field("password", &"<redacted>")
            .field("format", &self.format)
            .finish()
    }
}

impl TrustStoreHandle {
    /// Create a handle for an explicit file path.
    pub fn new(path: impl Into<PathBuf>, password: impl Into<String>, format: StoreFormat) -> Self {
        Self {
            path: path.into(),
            password: password.into(),
            format,
        }
    }

    /// Handle for `<dir>/<store_file_name>` using the configured password and format.
    #[must_use]
    pub fn in_dir(dir: &Path, config: &TrustConfig) -> Self {
        Self::new(
            dir.join(&config.store_file_name),
            config.password.clone(),
            config.format,
        )
    }

    /// Store file path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Container format
    #[must_use]
    pub const fn format(&self) -> StoreFormat {
        self.format
    }

    /// Returns true if the store file exists
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read and decode the store.
    pub fn load(&self) -> Result<TrustStore> {
        let path_str = self.path.display().to_string();
        debug!(path = %path_str, "loading trust store");
        let bytes = fs::read(&self.path).map_err(|e| TrustError::io(&path_str, e))?;
        codec::decode(&bytes, self.format, &self.password, &path_str)
    }

    /// Encode and atomically replace the store file.
    pub fn save(&self, store: &TrustStore) -> Result<()> {
        let bytes = codec::encode(store, self.format, &self.password)?;
        let tmp = self.temp_path();
        let tmp_display = tmp.display().to_string();

        let written = fs::File::create(&tmp)
            .and_then(|mut file| {
                file.write_all(&bytes)?;
                file.sync_all()
            })
            .and_then(|()| fs::rename(&tmp, &self.path));

        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                if cleanup.kind() != io::ErrorKind::NotFound {
                    warn!(path = %tmp_display, error = %cleanup, "failed to remove temp store file");
                }
            }
            return Err(TrustError::io(self.path.display(), e));
        }

        debug!(path = %self.path.display(), entries = store.len(), "trust store written");
        Ok(())
    }

    /// Delete the store file. A missing file is not an error.
    pub fn delete(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "trust store deleted");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(TrustError::io(self.path.display(), e)),
        }
    }

    /// Absolute, symlink-free path of the store file.
    pub fn canonical_path(&self) -> Result<PathBuf> {
        fs::canonicalize(&self.path).map_err(|e| TrustError::Publish {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
