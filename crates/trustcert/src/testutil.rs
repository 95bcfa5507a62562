//! Certificates and in-process TLS servers for tests.

use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rcgen::{BasicConstraints, Certificate, CertificateParams, DnType, IsCa, KeyPair, KeyUsagePurpose};
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use rustls::{ServerConfig, ServerConnection};

use crate::config::{AnchorSource, TrustConfig};

/// Host every test certificate is valid for.
pub const TEST_HOST: &str = "127.0.0.1";

/// A DER certificate and its PKCS#8 private key.
pub struct TestCert {
    pub der: Vec<u8>,
    pub key_der: Vec<u8>,
}

fn leaf_params(cn: &str) -> CertificateParams {
    let mut params =
        CertificateParams::new(vec![TEST_HOST.to_string(), "localhost".to_string()]).unwrap();
    params.distinguished_name.push(DnType::CommonName, cn);
    params
}

/// Self-signed end-entity certificate for [`TEST_HOST`].
pub fn self_signed(cn: &str) -> TestCert {
    let key = KeyPair::generate().unwrap();
    let cert = leaf_params(cn).self_signed(&key).unwrap();
    TestCert {
        der: cert.der().to_vec(),
        key_der: key.serialize_der(),
    }
}

/// Self-signed certificate whose validity ended in 2020.
pub fn expired_self_signed(cn: &str) -> TestCert {
    let key = KeyPair::generate().unwrap();
    let mut params = leaf_params(cn);
    params.not_before = rcgen::date_time_ymd(2019, 1, 1);
    params.not_after = rcgen::date_time_ymd(2020, 1, 1);
    let cert = params.self_signed(&key).unwrap();
    TestCert {
        der: cert.der().to_vec(),
        key_der: key.serialize_der(),
    }
}

/// A private CA able to issue leaf certificates.
pub struct TestCa {
    cert: Certificate,
    key: KeyPair,
}

impl TestCa {
    pub fn new(cn: &str) -> Self {
        let key = KeyPair::generate().unwrap();
        let mut params = CertificateParams::default();
        params.distinguished_name.push(DnType::CommonName, cn);
        params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        params.key_usages = vec![KeyUsagePurpose::KeyCertSign, KeyUsagePurpose::CrlSign];
        let cert = params.self_signed(&key).unwrap();
        Self { cert, key }
    }

    pub fn der(&self) -> Vec<u8> {
        self.cert.der().to_vec()
    }

    pub fn issue(&self, cn: &str) -> TestCert {
        let key = KeyPair::generate().unwrap();
        let cert = leaf_params(cn)
            .signed_by(&key, &self.cert, &self.key)
            .unwrap();
        TestCert {
            der: cert.der().to_vec(),
            key_der: key.serialize_der(),
        }
    }
}

/// Concatenated PEM encoding of `certs`.
pub fn pem_bundle<T: AsRef<[u8]>>(certs: &[T]) -> String {
    certs
        .iter()
        .map(|der| pem::encode(&pem::Pem::new("CERTIFICATE", der.as_ref().to_vec())))
        .collect()
}

/// Engine configuration with no default anchors and short timeouts.
pub fn test_config() -> TrustConfig {
    TrustConfig::new()
        .anchors(AnchorSource::Empty)
        .handshake_timeout(Duration::from_secs(5))
        .connect_timeout(Some(Duration::from_secs(5)))
}

/// Serve TLS on an ephemeral loopback port, presenting `chain` (leaf first).
///
/// Every accepted connection is handshaken on its own thread; the listener
/// lives until the test process exits.
pub fn spawn_tls_server(chain: &[&[u8]], key_der: &[u8]) -> u16 {
    let certs: Vec<CertificateDer<'static>> = chain
        .iter()
        .map(|der| CertificateDer::from(der.to_vec()))
        .collect();
    let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(key_der.to_vec()));
    let config = ServerConfig::builder_with_provider(Arc::new(
        rustls::crypto::ring::default_provider(),
    ))
    .with_safe_default_protocol_versions()
    .unwrap()
    .with_no_client_auth()
    .with_single_cert(certs, key)
    .unwrap();
    let config = Arc::new(config);

    let listener = TcpListener::bind((TEST_HOST, 0)).unwrap();
    let port = listener.local_addr().unwrap().port();
    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(sock) = stream else { continue };
            let config = Arc::clone(&config);
            thread::spawn(move || serve_tls(&config, sock));
        }
    });
    port
}

fn serve_tls(config: &Arc<ServerConfig>, mut sock: TcpStream) {
    let _ = sock.set_read_timeout(Some(Duration::from_secs(5)));
    let Ok(mut conn) = ServerConnection::new(Arc::clone(config)) else {
        return;
    };
    while conn.is_handshaking() {
        if conn.complete_io(&mut sock).is_err() {
            return;
        }
    }
    conn.send_close_notify();
    let _ = conn.complete_io(&mut sock);
}

/// Answer every connection with plaintext HTTP instead of TLS.
pub fn spawn_plaintext_server() -> u16 {
    let listener = TcpListener::bind((TEST_HOST, 0)).unwrap();
    let port = listener.local_addr().unwrap().port();
    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut sock) = stream else { continue };
            let _ = sock.write_all(b"HTTP/1.1 400 Bad Request\r\nContent-Length: 0\r\n\r\n");
        }
    });
    port
}

/// Fatal `handshake_failure` alert record (TLS 1.2 record layer).
const HANDSHAKE_FAILURE_ALERT: [u8; 7] = [0x15, 0x03, 0x03, 0x00, 0x02, 0x02, 0x28];

/// Read the ClientHello and reject it with a fatal `handshake_failure` alert.
pub fn spawn_alert_server() -> u16 {
    let listener = TcpListener::bind((TEST_HOST, 0)).unwrap();
    let port = listener.local_addr().unwrap().port();
    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut sock) = stream else { continue };
            let mut hello = [0u8; 16 * 1024];
            let _ = sock.read(&mut hello);
            let _ = sock.write_all(&HANDSHAKE_FAILURE_ALERT);
            let _ = sock.shutdown(Shutdown::Write);
        }
    });
    port
}

/// A loopback port with nothing listening on it.
pub fn closed_port() -> u16 {
    let listener = TcpListener::bind((TEST_HOST, 0)).unwrap();
    listener.local_addr().unwrap().port()
}

/// `https://127.0.0.1:<port>`
pub fn url_for(port: u16) -> String {
    format!("https://{TEST_HOST}:{port}")
}
