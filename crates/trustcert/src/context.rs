//! The trust context handed to downstream TLS clients.
//!
//! A [`TrustContext`] names the canonical store file and carries its anchors.
//! Clients built from it trust exactly what the store held when it was
//! published; publish again after the store changes.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustls::crypto::CryptoProvider;
use rustls::{ClientConfig, RootCertStore};
use tracing::info;
use trustcert_core::{Result, TrustError};

use crate::store::TrustStoreHandle;

/// Published trust anchors for outbound TLS.
#[derive(Debug, Clone)]
pub struct TrustContext {
    store_path: PathBuf,
    roots: Arc<RootCertStore>,
    provider: Arc<CryptoProvider>,
}

impl TrustContext {
    /// Snapshot the store behind `handle`.
    ///
    /// Every failure maps to [`TrustError::Publish`], which is fatal.
    pub fn publish(handle: &TrustStoreHandle) -> Result<Self> {
        let store_path = handle.canonical_path()?;
        let store = handle.load().map_err(|e| TrustError::Publish {
            path: store_path.display().to_string(),
            reason: e.to_string(),
        })?;

        let roots = store.root_cert_store();
        info!(path = %store_path.display(), anchors = roots.len(), "published trust context");

        Ok(Self {
            store_path,
            roots: Arc::new(roots),
            provider: Arc::new(rustls::crypto::ring::default_provider()),
        })
    }

    /// Canonical absolute path of the published store.
    #[must_use]
    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    /// Anchors loaded from the store
    #[must_use]
    pub fn root_store(&self) -> &RootCertStore {
        &self.roots
    }

    /// A rustls client configuration trusting the published anchors.
    pub fn client_config(&self) -> Result<ClientConfig> {
        Ok(
            ClientConfig::builder_with_provider(Arc::clone(&self.provider))
                .with_safe_default_protocol_versions()
                .map_err(|e| TrustError::CryptoConfig(e.to_string()))?
                .with_root_certificates(Arc::clone(&self.roots))
                .with_no_client_auth(),
        )
    }

    /// A `reqwest` client trusting the published anchors.
    #[cfg(feature = "http")]
    pub fn http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .use_preconfigured_tls(self.client_config()?)
            .build()
            .map_err(|e| TrustError::CryptoConfig(e.to_string()))
    }
}
