//! Handshake outcomes and the remedial actions they map to.

use serde::{Deserialize, Serialize};

use crate::error::TrustError;

/// Why a handshake against the local store was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustDecision {
    /// The rejection was an artifact of the capturing verifier, not a trust failure
    AlreadyTrusted,
    /// No certification path to a trust anchor could be built
    PathBuildingFailure,
    /// A certificate was outside its validity window, or the handshake itself failed
    ExpiredOrHandshakeFailure,
    /// Anything else: I/O, algorithm or store errors
    UnknownFailure,
}

/// Result of one handshake probe.
#[derive(Debug)]
pub enum ProbeOutcome {
    /// Handshake completed; the store already trusts the peer
    Accepted,
    /// Handshake rejected for a recognized reason
    Rejected(TrustDecision),
    /// Probe aborted; nothing may be persisted
    Failed(TrustError),
}

impl ProbeOutcome {
    /// The rejection classification, if the handshake did not succeed.
    #[must_use]
    pub const fn decision(&self) -> Option<TrustDecision> {
        match self {
            Self::Accepted => None,
            Self::Rejected(decision) => Some(*decision),
            Self::Failed(_) => Some(TrustDecision::UnknownFailure),
        }
    }

    /// Returns true if the store trusts the peer without changes
    #[must_use]
    pub const fn is_trusted(&self) -> bool {
        matches!(
            self,
            Self::Accepted | Self::Rejected(TrustDecision::AlreadyTrusted)
        )
    }

    /// The error that aborted the probe, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&TrustError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// What to do with the store after a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Leave the store untouched
    NoOp,
    /// Add the captured chain's topmost certificate
    PersistChain,
    /// Delete and re-seed the store, then add the captured certificate
    RebuildThenPersist,
}
