//! Trust store entries.

use chrono::{DateTime, Utc};

/// One trusted certificate stored under an alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustStoreEntry {
    /// Lookup key inside the container
    pub alias: String,
    /// DER-encoded X.509 certificate
    pub certificate: Vec<u8>,
    /// When the entry was written
    pub added_at: DateTime<Utc>,
}

impl TrustStoreEntry {
    /// Create an entry stamped with the current time.
    pub fn new(alias: impl Into<String>, certificate: Vec<u8>) -> Self {
        Self {
            alias: alias.into(),
            certificate,
            added_at: Utc::now(),
        }
    }

    /// Alias under which a host's accepted certificate is stored: `<host>-<suffix>`.
    #[must_use]
    pub fn alias_for(host: &str, suffix: &str) -> String {
        format!("{host}-{suffix}")
    }
}
