//! X.509 inspection for logging and listing store contents.

use chrono::{DateTime, TimeZone, Utc};
use ring::digest::{digest, SHA256};
use serde::Serialize;
use trustcert_core::{Result, TrustError};

/// Human-readable summary of a certificate.
#[derive(Debug, Clone, Serialize)]
pub struct CertificateSummary {
    /// Subject distinguished name
    pub subject: String,
    /// Issuer distinguished name
    pub issuer: String,
    /// Subject common name, if present
    pub common_name: Option<String>,
    /// Serial number (hex)
    pub serial: String,
    /// Not valid before
    pub not_before: DateTime<Utc>,
    /// Not valid after
    pub not_after: DateTime<Utc>,
    /// Whether the cert is currently expired
    pub expired: bool,
    /// Issuer and subject are identical
    pub self_issued: bool,
    /// SHA-256 fingerprint of DER bytes (hex)
    pub fingerprint: String,
}

/// SHA-256 of raw DER bytes, lowercase hex.
#[must_use]
pub fn fingerprint(der: &[u8]) -> String {
    hex::encode(digest(&SHA256, der).as_ref())
}

/// Parse a DER certificate into a [`CertificateSummary`].
pub fn describe(der: &[u8]) -> Result<CertificateSummary> {
    let (_, cert) = x509_parser::parse_x509_certificate(der)
        .map_err(|e| TrustError::CertParse(e.to_string()))?;

    let subject = cert.subject().to_string();
    let issuer = cert.issuer().to_string();
    let common_name = cert
        .subject()
        .iter_common_name()
        .next()
        .and_then(|cn| cn.as_str().ok())
        .map(ToString::to_string);

    let not_before = asn1_to_utc(cert.validity().not_before);
    let not_after = asn1_to_utc(cert.validity().not_after);

    Ok(CertificateSummary {
        self_issued: subject == issuer,
        subject,
        issuer,
        common_name,
        serial: cert.raw_serial_as_string(),
        not_before,
        not_after,
        expired: Utc::now() > not_after,
        fingerprint: fingerprint(der),
    })
}

fn asn1_to_utc(t: x509_parser::time::ASN1Time) -> DateTime<Utc> {
    Utc.timestamp_opt(t.timestamp(), 0)
        .single()
        .unwrap_or_else(Utc::now)
}
