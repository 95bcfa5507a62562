//! Writing accepted certificates into the trust store.

use tracing::{debug, info, warn};
use trustcert_core::{CertificateChain, Result, TrustStoreEntry};

use crate::inspect::describe;
use crate::store::TrustStoreHandle;

/// Adds a captured chain's topmost certificate to a store.
#[derive(Debug, Clone)]
pub struct TrustStorePersister {
    alias_suffix: String,
}

impl TrustStorePersister {
    /// Create a persister that stores under `<host>-<alias_suffix>`.
    pub fn new(alias_suffix: impl Into<String>) -> Self {
        Self {
            alias_suffix: alias_suffix.into(),
        }
    }

    /// Store the last certificate of `chain` for `host`, replacing any
    /// entry under the same alias.
    ///
    /// The last element as received is persisted, not the leaf. Returns
    /// `Ok(None)` without touching the store when no chain was captured.
    pub fn persist(
        &self,
        handle: &TrustStoreHandle,
        host: &str,
        chain: Option<&CertificateChain>,
    ) -> Result<Option<TrustStoreEntry>> {
        let Some((chain, topmost)) = chain.and_then(|c| c.topmost().map(|top| (c, top))) else {
            warn!(host = %host, "no certificate chain captured; nothing to persist");
            return Ok(None);
        };
        log_chain(chain);

        let alias = TrustStoreEntry::alias_for(host, &self.alias_suffix);
        let mut store = handle.load()?;
        let entry = store.set_certificate_entry(alias, topmost.to_vec()).clone();
        handle.save(&store)?;

        info!(
            alias = %entry.alias,
            path = %handle.path().display(),
            "added certificate to trust store"
        );
        Ok(Some(entry))
    }
}

fn log_chain(chain: &CertificateChain) {
    for (i, der) in chain.iter().enumerate() {
        match describe(der) {
            Ok(summary) => debug!(
                index = i,
                subject = %summary.subject,
                issuer = %summary.issuer,
                fingerprint = %summary.fingerprint,
                "captured certificate"
            ),
            Err(e) => debug!(index = i, error = %e, "captured certificate could not be parsed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::TrustStoreBootstrapper;
    use crate::testutil::{self_signed, test_config, TestCa};
    use tempfile::TempDir;

    #[test]
    fn test_persists_topmost_not_leaf() {
        let dir = TempDir::new().unwrap();
        let handle = TrustStoreBootstrapper::new(&test_config())
            .ensure(dir.path())
            .unwrap();
        let ca = TestCa::new("Persist CA");
        let leaf = ca.issue("leaf.test");
        let chain = CertificateChain::new(vec![leaf.der.clone(), ca.der()]);

        let entry = TrustStorePersister::new("tofu")
            .persist(&handle, "leaf.test", Some(&chain))
            .unwrap()
            .unwrap();
        assert_eq!(entry.alias, "leaf.test-tofu");

        let stored = handle.load().unwrap();
        let persisted = &stored.get("leaf.test-tofu").unwrap().certificate;
        assert_eq!(persisted, &ca.der());
        assert_ne!(persisted, &leaf.der);
    }

    #[test]
    fn test_overwrites_same_alias() {
        let dir = TempDir::new().unwrap();
        let handle = TrustStoreBootstrapper::new(&test_config())
            .ensure(dir.path())
            .unwrap();
        let persister = TrustStorePersister::new("tofu");
        let first = self_signed("first.test");
        let second = self_signed("second.test");

        for cert in [&first, &second] {
            let chain = CertificateChain::new(vec![cert.der.clone()]);
            persister.persist(&handle, "host.test", Some(&chain)).unwrap();
        }

        let store = handle.load().unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("host.test-tofu").unwrap().certificate, second.der);
    }

    #[test]
    fn test_missing_chain_is_noop() {
        let dir = TempDir::new().unwrap();
        let handle = TrustStoreBootstrapper::new(&test_config())
            .ensure(dir.path())
            .unwrap();
        let before = std::fs::read(handle.path()).unwrap();
        let persister = TrustStorePersister::new("tofu");

        assert!(persister.persist(&handle, "h", None).unwrap().is_none());
        assert!(persister
            .persist(&handle, "h", Some(&CertificateChain::default()))
            .unwrap()
            .is_none());
        assert_eq!(std::fs::read(handle.path()).unwrap(), before);
    }
}
