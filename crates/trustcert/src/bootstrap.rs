//! Creating trust stores from the environment's default anchors.

use std::fs;
use std::path::Path;

use tracing::{error, info};
use trustcert_core::{Result, TrustError};

use crate::anchors::load_default_anchors;
use crate::config::{AnchorSource, TrustConfig};
use crate::store::{TrustStore, TrustStoreHandle};

/// Ensures a usable trust store exists in a directory.
#[derive(Debug, Clone)]
pub struct TrustStoreBootstrapper {
    config: TrustConfig,
}

impl TrustStoreBootstrapper {
    /// Create a bootstrapper for `config`'s store name, password, format and anchors.
    #[must_use]
    pub fn new(config: &TrustConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Return a handle to the store in `dir`, seeding it first if absent.
    ///
    /// An existing store is left untouched. `dir` is created if needed.
    pub fn ensure(&self, dir: &Path) -> Result<TrustStoreHandle> {
        prepare_dir(dir)?;

        let handle = TrustStoreHandle::in_dir(dir, &self.config);
        if handle.exists() {
            info!(path = %handle.path().display(), "using existing trust store");
            return Ok(handle);
        }

        self.seed(&handle)?;
        Ok(handle)
    }

    /// Delete the store behind `handle` and seed a fresh one from the default anchors.
    pub fn rebuild(&self, handle: &TrustStoreHandle) -> Result<()> {
        info!(path = %handle.path().display(), "rebuilding trust store from default anchors");
        handle.delete()?;
        self.seed(handle)
    }

    /// The source is read completely before the destination is opened.
    fn seed(&self, handle: &TrustStoreHandle) -> Result<()> {
        let path = handle.path().display().to_string();
        let source = &self.config.anchors;

        let anchors = load_default_anchors(source).map_err(|e| {
            error!(path = %path, source = ?source, error = %e, "failed to read default trust anchors");
            creation_error(&path, e)
        })?;

        let store = TrustStore::from_entries(anchors);
        handle.save(&store).map_err(|e| {
            error!(path = %path, error = %e, "failed to write new trust store");
            creation_error(&path, e)
        })?;

        info!(path = %path, entries = store.len(), source = source_label(source), "created trust store");
        Ok(())
    }
}

/// Create `dir` if missing and check it is a directory.
pub(crate) fn prepare_dir(dir: &Path) -> Result<()> {
    let invalid = |reason: String| TrustError::InvalidDirectory {
        path: dir.display().to_string(),
        reason,
    };

    fs::create_dir_all(dir).map_err(|e| invalid(e.to_string()))?;
    if dir.is_dir() {
        Ok(())
    } else {
        Err(invalid("not a directory".to_string()))
    }
}

fn creation_error(path: &str, err: TrustError) -> TrustError {
    match err {
        TrustError::StoreCreation { .. } => err,
        other => TrustError::StoreCreation {
            path: path.to_string(),
            reason: other.to_string(),
        },
    }
}

const fn source_label(source: &AnchorSource) -> &'static str {
    match source {
        AnchorSource::Native => "native",
        AnchorSource::PemFile { .. } => "pem_file",
        AnchorSource::Empty => "empty",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{pem_bundle, self_signed, test_config, TestCa};
    use tempfile::TempDir;

    #[test]
    fn test_ensure_seeds_from_pem_bundle() {
        let dir = TempDir::new().unwrap();
        let ca = TestCa::new("Seed CA");
        let bundle = dir.path().join("roots.pem");
        fs::write(&bundle, pem_bundle(&[ca.der()])).unwrap();

        let config = test_config().anchors(AnchorSource::PemFile { path: bundle });
        let store_dir = dir.path().join("store");
        let handle = TrustStoreBootstrapper::new(&config).ensure(&store_dir).unwrap();

        assert!(handle.exists());
        let store = handle.load().unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.entries().next().unwrap().certificate, ca.der());
    }

    #[test]
    fn test_ensure_keeps_existing_store() {
        let dir = TempDir::new().unwrap();
        let bootstrapper = TrustStoreBootstrapper::new(&test_config());
        let handle = bootstrapper.ensure(dir.path()).unwrap();

        let mut store = handle.load().unwrap();
        store.set_certificate_entry("kept-tofu", self_signed("kept.test").der);
        handle.save(&store).unwrap();
        let before = fs::read(handle.path()).unwrap();

        bootstrapper.ensure(dir.path()).unwrap();
        assert_eq!(fs::read(handle.path()).unwrap(), before);
    }

    #[test]
    fn test_unreadable_source_leaves_no_file() {
        let dir = TempDir::new().unwrap();
        let config = test_config().anchors(AnchorSource::PemFile {
            path: dir.path().join("missing.pem"),
        });
        let store_dir = dir.path().join("store");

        let err = TrustStoreBootstrapper::new(&config)
            .ensure(&store_dir)
            .unwrap_err();
        assert!(matches!(err, TrustError::StoreCreation { .. }));
        assert!(!store_dir.join("cacerts").exists());
        assert!(!store_dir.join("cacerts.tmp").exists());
    }

    #[test]
    fn test_ensure_rejects_file_as_dir() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("plain");
        fs::write(&file, b"x").unwrap();

        let err = TrustStoreBootstrapper::new(&test_config())
            .ensure(&file)
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_rebuild_drops_added_entries() {
        let dir = TempDir::new().unwrap();
        let bootstrapper = TrustStoreBootstrapper::new(&test_config());
        let handle = bootstrapper.ensure(dir.path()).unwrap();

        let mut store = handle.load().unwrap();
        store.set_certificate_entry("stale-tofu", self_signed("stale.test").der);
        handle.save(&store).unwrap();

        bootstrapper.rebuild(&handle).unwrap();
        assert!(handle.load().unwrap().is_empty());
    }
}
