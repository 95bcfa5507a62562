//! Trust-on-first-use bootstrap of a process-local TLS trust store.
//!
//! [`TrustedCertificates`] keeps a trust store file in a directory, seeded
//! from the environment's default anchors, and makes sure one target
//! `https://host[:port]` endpoint is trusted by it:
//!
//! 1. [`TrustStoreBootstrapper`] creates the store if absent.
//! 2. [`HandshakeProbe`] handshakes against the endpoint with only the
//!    store's anchors, capturing the presented chain.
//! 3. [`TrustDecisionResolver`] maps the outcome to an [`Action`].
//! 4. [`TrustStorePersister`] writes the chain's topmost certificate.
//! 5. [`TrustContext`] is republished for downstream TLS clients.
//!
//! Everything is synchronous. Concurrent use of one store directory must
//! be serialized by the caller.

#![doc(html_root_url = "https://docs.rs/trustcert/0.1.0")]

pub mod anchors;
mod bootstrap;
pub mod capture;
mod config;
mod context;
pub mod inspect;
mod persist;
pub mod probe;
mod resolve;
pub mod store;
mod trusted;

#[cfg(test)]
mod testutil;

pub use bootstrap::TrustStoreBootstrapper;
pub use capture::{ChainCapturingVerifier, ChainObserver, ChainRecorder};
pub use config::*;
pub use context::TrustContext;
pub use persist::TrustStorePersister;
pub use probe::{HandshakeProbe, ProbeReport};
pub use resolve::{decide, Resolution, TrustDecisionResolver};
pub use store::{TrustStore, TrustStoreHandle};
pub use trusted::{CheckReport, CheckSummary, TrustedCertificates};
pub use trustcert_core::{
    Action, CertificateChain, ErrorKind, ProbeOutcome, Result, TargetEndpoint, TrustDecision,
    TrustError, TrustStoreEntry,
};
