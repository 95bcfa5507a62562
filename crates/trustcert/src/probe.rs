//! Handshake probe against a target endpoint.
//!
//! One probe is one blocking TCP connect plus one blocking TLS handshake.
//! The connect is bounded by `connect_timeout_secs` unless that is `None`;
//! the handshake is bounded by a socket read/write timeout. The socket is
//! owned by the probe and closed on every return path.

use std::io;
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

use rustls::client::danger::ServerCertVerifier;
use rustls::client::WebPkiServerVerifier;
use rustls::crypto::CryptoProvider;
use rustls::pki_types::ServerName;
use rustls::{AlertDescription, CertificateError, ClientConfig, ClientConnection};
use tracing::{debug, error, info};
use trustcert_core::{
    CertificateChain, ProbeOutcome, Result, TargetEndpoint, TrustDecision, TrustError,
};

use crate::capture::{ChainCapturingVerifier, ChainObserver, ChainRecorder, NoAnchorsVerifier};
use crate::config::TrustConfig;
use crate::store::{TrustStore, TrustStoreHandle};

/// Message carried by a TLS error raised when a verifier is asked to
/// enumerate accepted issuers it does not offer.
pub const UNSUPPORTED_ISSUER_ENUMERATION: &str = "accepted issuer enumeration is not supported";

/// Everything observed during one probe.
#[derive(Debug)]
pub struct ProbeReport {
    /// Endpoint that was probed
    pub endpoint: TargetEndpoint,
    /// How the handshake ended
    pub outcome: ProbeOutcome,
    /// Chain the server presented, if the handshake got that far
    pub chain: Option<CertificateChain>,
}

/// Performs TLS handshakes using a trust store's anchors.
#[derive(Debug, Clone)]
pub struct HandshakeProbe {
    handshake_timeout: Duration,
    connect_timeout: Option<Duration>,
    provider: Arc<CryptoProvider>,
}

impl HandshakeProbe {
    /// Create a probe with the configured timeouts.
    #[must_use]
    pub fn new(config: &TrustConfig) -> Self {
        Self {
            handshake_timeout: config.handshake_timeout_duration(),
            connect_timeout: config.connect_timeout_duration(),
            provider: Arc::new(rustls::crypto::ring::default_provider()),
        }
    }

    /// Handshake with `endpoint`, trusting only the anchors in `handle`'s store.
    ///
    /// Never mutates the store.
    pub fn probe(&self, endpoint: &TargetEndpoint, handle: &TrustStoreHandle) -> ProbeReport {
        let recorder = Arc::new(ChainRecorder::new());

        let outcome = match self.handshake(endpoint, handle, &recorder) {
            Ok(None) => {
                info!(endpoint = %endpoint, "host certificate is already trusted");
                ProbeOutcome::Accepted
            }
            Ok(Some(decision)) => {
                info!(endpoint = %endpoint, decision = ?decision, "server handshake was rejected");
                ProbeOutcome::Rejected(decision)
            }
            Err(e) => {
                error!(endpoint = %endpoint, error = %e, "handshake probe aborted");
                ProbeOutcome::Failed(e)
            }
        };

        ProbeReport {
            endpoint: endpoint.clone(),
            outcome,
            chain: recorder.take(),
        }
    }

    /// `Ok(None)` on success, `Ok(Some(_))` on a classified rejection.
    fn handshake(
        &self,
        endpoint: &TargetEndpoint,
        handle: &TrustStoreHandle,
        recorder: &Arc<ChainRecorder>,
    ) -> Result<Option<TrustDecision>> {
        info!(path = %handle.path().display(), "loading trust store for probe");
        let store = handle.load()?;
        let config = self.client_config(&store, Arc::clone(recorder) as Arc<dyn ChainObserver>)?;

        let server_name = ServerName::try_from(endpoint.host().to_string())
            .map_err(|e| TrustError::invalid_url(&endpoint.url(), e.to_string()))?;

        info!(endpoint = %endpoint, "opening connection");
        let mut sock = self.connect(endpoint)?;
        sock.set_read_timeout(Some(self.handshake_timeout))
            .and_then(|()| sock.set_write_timeout(Some(self.handshake_timeout)))
            .map_err(|e| network_error(endpoint, &e))?;

        let mut conn = ClientConnection::new(config, server_name)
            .map_err(|e| TrustError::CryptoConfig(e.to_string()))?;

        debug!(endpoint = %endpoint, "initiating handshake");
        while conn.is_handshaking() {
            if let Err(e) = conn.complete_io(&mut sock) {
                return match classify(&e) {
                    Some(decision) => Ok(Some(decision)),
                    None => Err(self.failure(endpoint, &e)),
                };
            }
        }

        conn.send_close_notify();
        if let Err(e) = conn.complete_io(&mut sock) {
            debug!(endpoint = %endpoint, error = %e, "close_notify not delivered");
        }
        Ok(None)
    }

    fn client_config(
        &self,
        store: &TrustStore,
        observer: Arc<dyn ChainObserver>,
    ) -> Result<Arc<ClientConfig>> {
        let roots = store.root_cert_store();
        let inner: Arc<dyn ServerCertVerifier> = if roots.is_empty() {
            debug!("trust store has no usable anchors");
            Arc::new(NoAnchorsVerifier::new(Arc::clone(&self.provider)))
        } else {
            WebPkiServerVerifier::builder_with_provider(Arc::new(roots), Arc::clone(&self.provider))
                .build()
                .map_err(|e| TrustError::CryptoConfig(e.to_string()))?
        };

        let verifier = ChainCapturingVerifier::new(inner, observer);
        let config = ClientConfig::builder_with_provider(Arc::clone(&self.provider))
            .with_safe_default_protocol_versions()
            .map_err(|e| TrustError::CryptoConfig(e.to_string()))?
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(verifier))
            .with_no_client_auth();
        Ok(Arc::new(config))
    }

    fn connect(&self, endpoint: &TargetEndpoint) -> Result<TcpStream> {
        let target = (endpoint.host(), endpoint.port());
        let Some(timeout) = self.connect_timeout else {
            return TcpStream::connect(target).map_err(|e| network_error(endpoint, &e));
        };

        let mut last_err = None;
        for addr in target
            .to_socket_addrs()
            .map_err(|e| network_error(endpoint, &e))?
        {
            match TcpStream::connect_timeout(&addr, timeout) {
                Ok(sock) => return Ok(sock),
                Err(e) => {
                    debug!(addr = %addr, error = %e, "connect attempt failed");
                    last_err = Some(e);
                }
            }
        }

        Err(TrustError::Network {
            endpoint: endpoint.to_string(),
            reason: last_err.map_or_else(
                || "host resolved to no addresses".to_string(),
                |e| e.to_string(),
            ),
        })
    }

    fn failure(&self, endpoint: &TargetEndpoint, err: &io::Error) -> TrustError {
        if matches!(
            err.kind(),
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
        ) {
            TrustError::Timeout {
                endpoint: endpoint.to_string(),
                seconds: self.handshake_timeout.as_secs(),
            }
        } else {
            network_error(endpoint, err)
        }
    }
}

fn network_error(endpoint: &TargetEndpoint, err: &io::Error) -> TrustError {
    TrustError::Network {
        endpoint: endpoint.to_string(),
        reason: err.to_string(),
    }
}

/// Classify a failed handshake by the TLS error it carries.
///
/// Returns `None` for anything outside the recognized rejection reasons.
#[must_use]
pub fn classify(err: &io::Error) -> Option<TrustDecision> {
    let tls = err.get_ref()?.downcast_ref::<rustls::Error>()?;
    classify_tls_error(tls)
}

/// Map a TLS error onto a rejection reason.
#[must_use]
pub fn classify_tls_error(err: &rustls::Error) -> Option<TrustDecision> {
    match err {
        rustls::Error::General(msg) if msg == UNSUPPORTED_ISSUER_ENUMERATION => {
            Some(TrustDecision::AlreadyTrusted)
        }
        rustls::Error::InvalidCertificate(CertificateError::UnknownIssuer) => {
            Some(TrustDecision::PathBuildingFailure)
        }
        rustls::Error::InvalidCertificate(
            CertificateError::Expired
            | CertificateError::ExpiredContext { .. }
            | CertificateError::NotValidYet
            | CertificateError::NotValidYetContext { .. },
        )
        | rustls::Error::AlertReceived(
            AlertDescription::HandshakeFailure | AlertDescription::CertificateExpired,
        ) => Some(TrustDecision::ExpiredOrHandshakeFailure),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::TrustStoreBootstrapper;
    use crate::testutil::{
        closed_port, self_signed, spawn_plaintext_server, spawn_tls_server, test_config, url_for,
        TestCa,
    };
    use tempfile::TempDir;

    fn tls_io_error(err: rustls::Error) -> io::Error {
        io::Error::new(io::ErrorKind::InvalidData, err)
    }

    fn empty_store(dir: &TempDir) -> TrustStoreHandle {
        TrustStoreBootstrapper::new(&test_config())
            .ensure(dir.path())
            .unwrap()
    }

    #[test]
    fn test_classify_unknown_issuer() {
        let err = tls_io_error(rustls::Error::InvalidCertificate(
            CertificateError::UnknownIssuer,
        ));
        assert_eq!(classify(&err), Some(TrustDecision::PathBuildingFailure));
    }

    #[test]
    fn test_classify_expiry_and_handshake_alert() {
        for tls in [
            rustls::Error::InvalidCertificate(CertificateError::Expired),
            rustls::Error::InvalidCertificate(CertificateError::NotValidYet),
            rustls::Error::AlertReceived(AlertDescription::HandshakeFailure),
        ] {
            assert_eq!(
                classify(&tls_io_error(tls)),
                Some(TrustDecision::ExpiredOrHandshakeFailure)
            );
        }
    }

    #[test]
    fn test_classify_unsupported_issuer_enumeration() {
        let tls = rustls::Error::General(UNSUPPORTED_ISSUER_ENUMERATION.to_string());
        assert_eq!(classify_tls_error(&tls), Some(TrustDecision::AlreadyTrusted));
    }

    #[test]
    fn test_classify_other_errors() {
        assert_eq!(
            classify(&tls_io_error(rustls::Error::InvalidCertificate(
                CertificateError::NotValidForName
            ))),
            None
        );
        assert_eq!(
            classify(&io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
            None
        );
    }

    #[test]
    fn test_probe_untrusted_self_signed() {
        let dir = TempDir::new().unwrap();
        let handle = empty_store(&dir);
        let cert = self_signed("probe.test");
        let port = spawn_tls_server(&[&cert.der], &cert.key_der);

        let endpoint = TargetEndpoint::parse(&url_for(port)).unwrap();
        let report = HandshakeProbe::new(&test_config()).probe(&endpoint, &handle);

        assert!(matches!(
            report.outcome,
            ProbeOutcome::Rejected(TrustDecision::PathBuildingFailure)
        ));
        assert_eq!(report.chain.unwrap().leaf(), Some(cert.der.as_slice()));
    }

    #[test]
    fn test_probe_accepts_trusted_ca_chain() {
        let dir = TempDir::new().unwrap();
        let handle = empty_store(&dir);
        let ca = TestCa::new("Probe Test CA");
        let leaf = ca.issue("leaf.test");

        let mut store = handle.load().unwrap();
        store.set_certificate_entry("probe-ca", ca.der());
        handle.save(&store).unwrap();

        let ca_der = ca.der();
        let port = spawn_tls_server(&[&leaf.der, &ca_der], &leaf.key_der);
        let endpoint = TargetEndpoint::parse(&url_for(port)).unwrap();
        let report = HandshakeProbe::new(&test_config()).probe(&endpoint, &handle);

        assert!(matches!(report.outcome, ProbeOutcome::Accepted));
        assert_eq!(report.chain.unwrap().len(), 2);
    }

    #[test]
    fn test_probe_plaintext_server_is_unknown_failure() {
        let dir = TempDir::new().unwrap();
        let handle = empty_store(&dir);
        let endpoint = TargetEndpoint::parse(&url_for(spawn_plaintext_server())).unwrap();
        let report = HandshakeProbe::new(&test_config()).probe(&endpoint, &handle);

        assert_eq!(report.outcome.decision(), Some(TrustDecision::UnknownFailure));
        assert!(report.chain.is_none());
    }

    #[test]
    fn test_probe_refused_connection() {
        let dir = TempDir::new().unwrap();
        let handle = empty_store(&dir);
        let endpoint = TargetEndpoint::parse(&url_for(closed_port())).unwrap();
        let report = HandshakeProbe::new(&test_config()).probe(&endpoint, &handle);

        let err = report.outcome.error().unwrap();
        assert!(matches!(err, TrustError::Network { .. }));
    }

    #[test]
    fn test_probe_missing_store() {
        let dir = TempDir::new().unwrap();
        let handle = TrustStoreHandle::in_dir(dir.path(), &test_config());
        let endpoint = TargetEndpoint::new("127.0.0.1", closed_port());
        let report = HandshakeProbe::new(&test_config()).probe(&endpoint, &handle);

        assert!(matches!(
            report.outcome,
            ProbeOutcome::Failed(TrustError::Io { .. })
        ));
        assert!(!handle.exists());
    }
}
