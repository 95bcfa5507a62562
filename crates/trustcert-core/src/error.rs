use thiserror::Error;

/// Result type alias for trust store operations
pub type Result<T> = std::result::Result<T, TrustError>;

/// Broad failure categories a caller can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input or unusable store directory
    Validation,
    /// Missing, corrupt or unwritable store, or unreadable default anchors
    StoreAccess,
    /// TLS provider or algorithm unavailable
    CryptoConfig,
    /// Connect or handshake failure not matching a recognized rejection
    Network,
    /// The active trust context could not be published
    Publish,
    /// Operation the chain-capturing verifier does not implement
    Unsupported,
}

/// Errors that can occur while bootstrapping, probing or persisting trust
#[derive(Error, Debug)]
pub enum TrustError {
    /// URL is not of the form `https://host[:port]`
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl {
        /// The rejected input
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// Store directory could not be created or is not a directory
    #[error("store directory {path} is unusable: {reason}")]
    InvalidDirectory {
        /// Directory path
        path: String,
        /// Why it is unusable
        reason: String,
    },

    /// Filesystem I/O failed
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path being accessed
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Store file exists but could not be decoded
    #[error("trust store {path} is corrupt: {reason}")]
    StoreCorrupt {
        /// Store file path
        path: String,
        /// Decoder message
        reason: String,
    },

    /// Integrity check failed (wrong password or tampered file)
    #[error("trust store {path} failed its integrity check (wrong password or modified file)")]
    StoreIntegrity {
        /// Store file path
        path: String,
    },

    /// Seeding a new store from the default anchors failed
    #[error("could not create trust store {path}: {reason}")]
    StoreCreation {
        /// Destination store path
        path: String,
        /// Why creation failed
        reason: String,
    },

    /// Certificate bytes could not be parsed
    #[error("certificate parse error: {0}")]
    CertParse(String),

    /// TLS provider or algorithm setup failed
    #[error("crypto configuration error: {0}")]
    CryptoConfig(String),

    /// Connection or unrecognized handshake failure
    #[error("network error talking to {endpoint}: {reason}")]
    Network {
        /// `host:port` being probed
        endpoint: String,
        /// Underlying cause
        reason: String,
    },

    /// Handshake did not finish within the read timeout
    #[error("handshake with {endpoint} timed out after {seconds} seconds")]
    Timeout {
        /// `host:port` being probed
        endpoint: String,
        /// Configured handshake timeout
        seconds: u64,
    },

    /// Canonical store path could not be published as the trust context
    #[error("failed to publish trust store {path} as the active trust context: {reason}")]
    Publish {
        /// Store file path
        path: String,
        /// Underlying cause
        reason: String,
    },

    /// Invoked a verifier capability that is intentionally absent
    #[error("operation not supported by the chain-capturing verifier: {0}")]
    UnsupportedOperation(&'static str),
}

impl TrustError {
    /// Convenience constructor for I/O failures.
    pub fn io(path: impl std::fmt::Display, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_string(),
            source,
        }
    }

    /// Convenience constructor for URL validation failures.
    pub fn invalid_url(url: &str, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.to_string(),
            reason: reason.into(),
        }
    }

    /// Category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidUrl { .. } | Self::InvalidDirectory { .. } => ErrorKind::Validation,
            Self::Io { .. }
            | Self::StoreCorrupt { .. }
            | Self::StoreIntegrity { .. }
            | Self::StoreCreation { .. }
            | Self::CertParse(_) => ErrorKind::StoreAccess,
            Self::CryptoConfig(_) => ErrorKind::CryptoConfig,
            Self::Network { .. } | Self::Timeout { .. } => ErrorKind::Network,
            Self::Publish { .. } => ErrorKind::Publish,
            Self::UnsupportedOperation(_) => ErrorKind::Unsupported,
        }
    }

    /// Returns true if the error must abort the caller rather than a single probe.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self.kind(), ErrorKind::Validation | ErrorKind::Publish)
    }

    /// Returns true if the error came from input validation
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self.kind(), ErrorKind::Validation)
    }
}
