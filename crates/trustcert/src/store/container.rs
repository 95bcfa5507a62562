//! In-memory trust store contents.

use std::collections::BTreeMap;

use rustls::pki_types::CertificateDer;
use rustls::RootCertStore;
use tracing::{debug, warn};
use trustcert_core::TrustStoreEntry;

use super::codec;

/// Alias-keyed set of trusted certificates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustStore {
    entries: BTreeMap<String, TrustStoreEntry>,
}

impl TrustStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from entries; later entries win on alias collisions.
    pub fn from_entries(entries: impl IntoIterator<Item = TrustStoreEntry>) -> Self {
        let mut store = Self::new();
        for entry in entries {
            store.insert(entry);
        }
        store
    }

    /// Store `certificate` under `alias`, replacing any existing entry.
    pub fn set_certificate_entry(
        &mut self,
        alias: impl Into<String>,
        certificate: Vec<u8>,
    ) -> &TrustStoreEntry {
        let entry = TrustStoreEntry::new(alias, certificate);
        let alias = entry.alias.clone();
        if self.entries.insert(alias.clone(), entry).is_some() {
            debug!(alias = %alias, "replaced existing trust store entry");
        }
        &self.entries[&alias]
    }

    /// Insert a prepared entry, replacing any entry with the same alias.
    pub fn insert(&mut self, entry: TrustStoreEntry) {
        self.entries.insert(entry.alias.clone(), entry);
    }

    /// Look up an entry by alias.
    #[must_use]
    pub fn get(&self, alias: &str) -> Option<&TrustStoreEntry> {
        self.entries.get(alias)
    }

    /// Returns true if an entry exists under `alias`
    #[must_use]
    pub fn contains_alias(&self, alias: &str) -> bool {
        self.entries.contains_key(alias)
    }

    /// Aliases in sorted order.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries in alias order.
    pub fn entries(&self) -> impl Iterator<Item = &TrustStoreEntry> {
        self.entries.values()
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the store holds no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// PEM bundle of every entry, with alias and timestamp comments.
    #[must_use]
    pub fn to_pem(&self) -> String {
        codec::encode_pem(self)
    }

    /// Trust anchors for certificate verification.
    ///
    /// Entries that cannot serve as anchors are logged and skipped.
    #[must_use]
    pub fn root_cert_store(&self) -> RootCertStore {
        let mut roots = RootCertStore::empty();
        let (added, ignored) = roots.add_parsable_certificates(
            self.entries
                .values()
                .map(|entry| CertificateDer::from(entry.certificate.clone())),
        );
        if ignored > 0 {
            warn!(added, ignored, "some trust store entries are not usable as anchors");
        } else {
            debug!(added, "loaded trust anchors");
        }
        roots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::self_signed;

    #[test]
    fn test_set_certificate_entry_overwrites() {
        let mut store = TrustStore::new();
        store.set_certificate_entry("host-tofu", vec![1, 2, 3]);
        store.set_certificate_entry("host-tofu", vec![4, 5, 6]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("host-tofu").unwrap().certificate, vec![4, 5, 6]);
    }

    #[test]
    fn test_aliases_sorted() {
        let store = TrustStore::from_entries([
            TrustStoreEntry::new("b", vec![2]),
            TrustStoreEntry::new("a", vec![1]),
        ]);
        assert_eq!(store.aliases().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(store.contains_alias("a"));
    }

    #[test]
    fn test_root_cert_store_skips_garbage() {
        let cert = self_signed("roots.test");
        let store = TrustStore::from_entries([
            TrustStoreEntry::new("good", cert.der),
            TrustStoreEntry::new("bad", b"junk".to_vec()),
        ]);
        assert_eq!(store.root_cert_store().len(), 1);
    }

    #[test]
    fn test_to_pem_lists_every_alias() {
        let store = TrustStore::from_entries([
            TrustStoreEntry::new("one-tofu", self_signed("one.test").der),
            TrustStoreEntry::new("two-tofu", self_signed("two.test").der),
        ]);
        let bundle = store.to_pem();
        assert!(bundle.contains("# alias: one-tofu"));
        assert!(bundle.contains("# alias: two-tofu"));
        assert_eq!(pem::parse_many(&bundle).unwrap().len(), 2);
    }
}
