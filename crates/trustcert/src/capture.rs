//! Chain capture around a real certificate verifier.
//!
//! [`ChainCapturingVerifier`] never makes a trust decision itself. It hands
//! the presented chain to a [`ChainObserver`] and then forwards to the
//! wrapped verifier, so the chain is available afterwards whether the
//! handshake was accepted or rejected.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{verify_tls12_signature, verify_tls13_signature, CryptoProvider};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{CertificateError, DigitallySignedStruct, SignatureScheme};
use trustcert_core::{CertificateChain, Result, TrustError};

/// Receives every chain a server presents.
pub trait ChainObserver: fmt::Debug + Send + Sync {
    /// Called before the wrapped verifier runs.
    fn observe(&self, chain: CertificateChain);
}

/// Keeps the most recently observed chain.
#[derive(Debug, Default)]
pub struct ChainRecorder {
    latest: Mutex<Option<CertificateChain>>,
}

impl ChainRecorder {
    /// Create an empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the last chain seen, leaving the recorder empty.
    pub fn take(&self) -> Option<CertificateChain> {
        self.lock().take()
    }

    fn lock(&self) -> MutexGuard<'_, Option<CertificateChain>> {
        self.latest.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ChainObserver for ChainRecorder {
    fn observe(&self, chain: CertificateChain) {
        *self.lock() = Some(chain);
    }
}

/// Server certificate verifier that reports chains to an observer.
#[derive(Debug)]
pub struct ChainCapturingVerifier {
    inner: Arc<dyn ServerCertVerifier>,
    observer: Arc<dyn ChainObserver>,
}

impl ChainCapturingVerifier {
    /// Wrap `inner`, reporting to `observer`.
    pub fn new(inner: Arc<dyn ServerCertVerifier>, observer: Arc<dyn ChainObserver>) -> Self {
        Self { inner, observer }
    }

    /// Client certificate validation is outside an outbound-only client's role.
    pub fn validate_client(&self, _chain: &CertificateChain) -> Result<()> {
        Err(TrustError::UnsupportedOperation("validate_client"))
    }

    /// Issuer enumeration is not offered by this verifier.
    pub fn accepted_issuers(&self) -> Result<Vec<Vec<u8>>> {
        Err(TrustError::UnsupportedOperation("accepted_issuers"))
    }
}

impl ServerCertVerifier for ChainCapturingVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        ocsp_response: &[u8],
        now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        let mut certs = Vec::with_capacity(1 + intermediates.len());
        certs.push(end_entity.as_ref().to_vec());
        certs.extend(intermediates.iter().map(|c| c.as_ref().to_vec()));
        self.observer.observe(CertificateChain::new(certs));

        self.inner
            .verify_server_cert(end_entity, intermediates, server_name, ocsp_response, now)
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        self.inner.verify_tls12_signature(message, cert, dss)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        self.inner.verify_tls13_signature(message, cert, dss)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.inner.supported_verify_schemes()
    }
}

/// Verifier for a store with no usable anchors.
///
/// Mirrors the WebPKI verifier's ordering: an end-entity outside its
/// validity window is reported as such before the missing issuer.
#[derive(Debug)]
pub(crate) struct NoAnchorsVerifier {
    provider: Arc<CryptoProvider>,
}

impl NoAnchorsVerifier {
    pub(crate) fn new(provider: Arc<CryptoProvider>) -> Self {
        Self { provider }
    }
}

impl ServerCertVerifier for NoAnchorsVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        let (_, cert) = x509_parser::parse_x509_certificate(end_entity.as_ref())
            .map_err(|_| rustls::Error::InvalidCertificate(CertificateError::BadEncoding))?;
        let now = i64::try_from(now.as_secs()).unwrap_or(i64::MAX);
        let validity = cert.validity();
        if validity.not_after.timestamp() < now {
            return Err(rustls::Error::InvalidCertificate(CertificateError::Expired));
        }
        if validity.not_before.timestamp() > now {
            return Err(rustls::Error::InvalidCertificate(CertificateError::NotValidYet));
        }
        Err(rustls::Error::InvalidCertificate(CertificateError::UnknownIssuer))
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}
