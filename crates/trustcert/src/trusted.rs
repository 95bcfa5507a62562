//! Bootstrap, probe, resolve and publish in one call.

use std::path::Path;

use serde::Serialize;
use tracing::{info, instrument};
use trustcert_core::{Action, ProbeOutcome, Result, TargetEndpoint, TrustStoreEntry};

use crate::bootstrap::{prepare_dir, TrustStoreBootstrapper};
use crate::config::TrustConfig;
use crate::context::TrustContext;
use crate::persist::TrustStorePersister;
use crate::probe::HandshakeProbe;
use crate::resolve::TrustDecisionResolver;
use crate::store::TrustStoreHandle;

/// Result of one probe/resolve/persist cycle.
#[derive(Debug)]
pub struct CheckReport {
    /// Endpoint that was checked
    pub endpoint: TargetEndpoint,
    /// How the handshake ended
    pub outcome: ProbeOutcome,
    /// What was done to the store
    pub action: Action,
    /// Entry written, if any
    pub persisted: Option<TrustStoreEntry>,
    /// Number of certificates the server presented
    pub chain_len: usize,
}

impl CheckReport {
    /// Returns true if the store trusted the endpoint without changes
    #[must_use]
    pub const fn is_trusted(&self) -> bool {
        self.outcome.is_trusted()
    }

    /// Serializable view for reporting.
    #[must_use]
    pub fn summary(&self) -> CheckSummary {
        CheckSummary {
            endpoint: self.endpoint.to_string(),
            decision: self
                .outcome
                .decision()
                .map_or_else(|| "accepted".to_string(), |d| format!("{d:?}")),
            action: self.action,
            persisted_alias: self.persisted.as_ref().map(|e| e.alias.clone()),
            chain_len: self.chain_len,
            error: self.outcome.error().map(ToString::to_string),
        }
    }
}

/// Flattened [`CheckReport`] for JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct CheckSummary {
    /// `host:port`
    pub endpoint: String,
    /// `accepted` or the rejection classification
    pub decision: String,
    /// Store action taken
    pub action: Action,
    /// Alias written, if any
    pub persisted_alias: Option<String>,
    /// Certificates presented by the server
    pub chain_len: usize,
    /// Cause of an aborted probe
    pub error: Option<String>,
}

/// Trust-on-first-use manager for one store directory.
///
/// # Example
///
/// ```no_run
/// use trustcert::TrustedCertificates;
///
/// let trusted = TrustedCertificates::create("/var/lib/app/trust", "https://build.internal:8443")?;
/// let client = trusted.context().http_client()?;
/// # Ok::<(), trustcert::TrustError>(())
/// ```
#[derive(Debug)]
pub struct TrustedCertificates {
    config: TrustConfig,
    handle: TrustStoreHandle,
    endpoint: TargetEndpoint,
    probe: HandshakeProbe,
    resolver: TrustDecisionResolver,
    context: TrustContext,
    last_report: CheckReport,
}

impl TrustedCertificates {
    /// Bootstrap the store in `dir` with default settings and check `url`.
    pub fn create(dir: impl AsRef<Path>, url: &str) -> Result<Self> {
        Self::create_with_config(dir, url, TrustConfig::default())
    }

    /// Bootstrap the store in `dir` and check `url`.
    ///
    /// `url` and `dir` are validated before any file or socket is opened.
    #[instrument(skip_all, fields(url = %url))]
    pub fn create_with_config(
        dir: impl AsRef<Path>,
        url: &str,
        config: TrustConfig,
    ) -> Result<Self> {
        let endpoint = TargetEndpoint::parse(url)?;
        let dir = dir.as_ref();
        prepare_dir(dir)?;

        let bootstrapper = TrustStoreBootstrapper::new(&config);
        let handle = bootstrapper.ensure(dir)?;
        let probe = HandshakeProbe::new(&config);
        let resolver = TrustDecisionResolver::new(
            bootstrapper,
            TrustStorePersister::new(config.alias_suffix.clone()),
        );

        let last_report = run_cycle(&probe, &resolver, &endpoint, &handle)?;
        let context = TrustContext::publish(&handle)?;

        Ok(Self {
            config,
            handle,
            endpoint,
            probe,
            resolver,
            context,
            last_report,
        })
    }

    /// Re-target at `url` and run the cycle again, republishing the context.
    ///
    /// On an invalid URL nothing changes, including the current endpoint.
    pub fn check_certificate(&mut self, url: &str) -> Result<&CheckReport> {
        let endpoint = TargetEndpoint::parse(url)?;
        self.last_report = run_cycle(&self.probe, &self.resolver, &endpoint, &self.handle)?;
        self.endpoint = endpoint;
        self.context = TrustContext::publish(&self.handle)?;
        Ok(&self.last_report)
    }

    /// Currently published trust context
    #[must_use]
    pub const fn context(&self) -> &TrustContext {
        &self.context
    }

    /// Store handle
    #[must_use]
    pub const fn handle(&self) -> &TrustStoreHandle {
        &self.handle
    }

    /// Current target
    #[must_use]
    pub const fn endpoint(&self) -> &TargetEndpoint {
        &self.endpoint
    }

    /// Report of the most recent cycle
    #[must_use]
    pub const fn last_report(&self) -> &CheckReport {
        &self.last_report
    }

    /// Configuration in effect
    #[must_use]
    pub const fn config(&self) -> &TrustConfig {
        &self.config
    }
}

fn run_cycle(
    probe: &HandshakeProbe,
    resolver: &TrustDecisionResolver,
    endpoint: &TargetEndpoint,
    handle: &TrustStoreHandle,
) -> Result<CheckReport> {
    let report = probe.probe(endpoint, handle);
    let resolution = resolver.resolve(&report, handle)?;
    let chain_len = report.chain.as_ref().map_or(0, |c| c.len());

    info!(
        endpoint = %endpoint,
        action = ?resolution.action,
        trusted = report.outcome.is_trusted(),
        "certificate check complete"
    );

    Ok(CheckReport {
        endpoint: report.endpoint,
        outcome: report.outcome,
        action: resolution.action,
        persisted: resolution.persisted,
        chain_len,
    })
}
