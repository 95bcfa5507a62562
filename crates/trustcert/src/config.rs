//! Engine configuration types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// File name of the store inside the store directory
pub const DEFAULT_STORE_FILE_NAME: &str = "cacerts";

/// Well-known default store password. Weak; kept for compatibility with
/// stores created by other tooling.
pub const DEFAULT_STORE_PASSWORD: &str = "changeit";

/// Suffix appended to the host name to form an accepted certificate's alias
pub const DEFAULT_ALIAS_SUFFIX: &str = "tofu";

/// Read timeout applied to the handshake
pub const DEFAULT_HANDSHAKE_TIMEOUT_SECS: u64 = 10;

/// Timeout applied to TCP connection establishment
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// On-disk container format of the trust store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreFormat {
    /// JSON container sealed with a password-derived HMAC
    #[default]
    Sealed,
    /// Plain PEM bundle with alias comments; the password is ignored
    Pem,
}

/// Where a freshly created store takes its initial trust anchors from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "source")]
pub enum AnchorSource {
    /// The platform's native trust store
    #[default]
    Native,
    /// A PEM bundle on disk (e.g. `/etc/ssl/certs/ca-certificates.crt`)
    PemFile {
        /// Bundle location
        path: PathBuf,
    },
    /// Start with no anchors; trust only what is accepted on first use
    Empty,
}

/// Configuration for bootstrapping, probing and persisting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrustConfig {
    /// Store file name inside the store directory
    pub store_file_name: String,

    /// Store password
    pub password: String,

    /// Container format
    pub format: StoreFormat,

    /// Alias suffix for accepted certificates
    pub alias_suffix: String,

    /// Handshake read timeout in seconds
    pub handshake_timeout_secs: u64,

    /// Connect timeout in seconds; `None` leaves the connect unbounded
    pub connect_timeout_secs: Option<u64>,

    /// Initial anchor source for new stores
    pub anchors: AnchorSource,
}

impl Default for TrustConfig {
    fn default() -> Self {
        Self {
            store_file_name: DEFAULT_STORE_FILE_NAME.to_string(),
            password: DEFAULT_STORE_PASSWORD.to_string(),
            format: StoreFormat::default(),
            alias_suffix: DEFAULT_ALIAS_SUFFIX.to_string(),
            handshake_timeout_secs: DEFAULT_HANDSHAKE_TIMEOUT_SECS,
            connect_timeout_secs: Some(DEFAULT_CONNECT_TIMEOUT_SECS),
            anchors: AnchorSource::default(),
        }
    }
}

impl TrustConfig {
    /// Create a configuration with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the store password
    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    /// Set the container format
    #[must_use]
    pub const fn format(mut self, format: StoreFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the alias suffix
    #[must_use]
    pub fn alias_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.alias_suffix = suffix.into();
        self
    }

    /// Set the initial anchor source
    #[must_use]
    pub fn anchors(mut self, anchors: AnchorSource) -> Self {
        self.anchors = anchors;
        self
    }

    /// Set the handshake read timeout
    #[must_use]
    pub const fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout_secs = timeout.as_secs();
        self
    }

    /// Bound (`Some`) or unbound (`None`) the connect step
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connect_timeout_secs = match timeout {
            Some(t) => Some(t.as_secs()),
            None => None,
        };
        self
    }

    /// Handshake read timeout as a `Duration`. Never zero.
    #[must_use]
    pub fn handshake_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.handshake_timeout_secs.max(1))
    }

    /// Connect timeout as a `Duration`, if bounded. Never zero.
    #[must_use]
    pub fn connect_timeout_duration(&self) -> Option<Duration> {
        self.connect_timeout_secs
            .map(|secs| Duration::from_secs(secs.max(1)))
    }
}
