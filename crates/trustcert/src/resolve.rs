//! Turning a probe outcome into a store mutation.

use tracing::{info, warn};
use trustcert_core::{Action, ProbeOutcome, Result, TrustDecision, TrustStoreEntry};

use crate::bootstrap::TrustStoreBootstrapper;
use crate::persist::TrustStorePersister;
use crate::probe::ProbeReport;
use crate::store::TrustStoreHandle;

/// Action called for by `outcome`.
#[must_use]
pub const fn decide(outcome: &ProbeOutcome) -> Action {
    match outcome.decision() {
        None | Some(TrustDecision::AlreadyTrusted | TrustDecision::UnknownFailure) => Action::NoOp,
        Some(TrustDecision::PathBuildingFailure) => Action::PersistChain,
        Some(TrustDecision::ExpiredOrHandshakeFailure) => Action::RebuildThenPersist,
    }
}

/// What a resolution did to the store.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Action taken
    pub action: Action,
    /// Entry written, if any
    pub persisted: Option<TrustStoreEntry>,
}

/// Applies the action for a probe report.
#[derive(Debug, Clone)]
pub struct TrustDecisionResolver {
    bootstrapper: TrustStoreBootstrapper,
    persister: TrustStorePersister,
}

impl TrustDecisionResolver {
    /// Create a resolver that rebuilds with `bootstrapper` and writes with `persister`.
    #[must_use]
    pub const fn new(bootstrapper: TrustStoreBootstrapper, persister: TrustStorePersister) -> Self {
        Self {
            bootstrapper,
            persister,
        }
    }

    /// Apply the action for `report` to the store behind `handle`.
    ///
    /// The rebuild branch runs once; it does not re-probe.
    pub fn resolve(&self, report: &ProbeReport, handle: &TrustStoreHandle) -> Result<Resolution> {
        let action = decide(&report.outcome);
        let host = report.endpoint.host();

        let persisted = match action {
            Action::NoOp => {
                if let Some(err) = report.outcome.error() {
                    warn!(endpoint = %report.endpoint, error = %err, "probe failed; trust store left unchanged");
                }
                None
            }
            Action::PersistChain => {
                info!(endpoint = %report.endpoint, "no certification path; trusting presented chain");
                self.persister.persist(handle, host, report.chain.as_ref())?
            }
            Action::RebuildThenPersist => {
                info!(endpoint = %report.endpoint, "expired or failed handshake; rebuilding trust store");
                self.bootstrapper.rebuild(handle)?;
                self.persister.persist(handle, host, report.chain.as_ref())?
            }
        };

        Ok(Resolution { action, persisted })
    }
}
