//! On-disk encodings of a [`TrustStore`].
//!
//! Sealed files are JSON with an HMAC-SHA256 tag keyed by
//! PBKDF2-HMAC-SHA256(password, salt). PEM files are plain bundles with
//! `# alias:` comment lines and no integrity protection.

use std::num::NonZeroU32;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, SecondsFormat, Utc};
use ring::rand::{SecureRandom, SystemRandom};
use ring::{hmac, pbkdf2};
use serde::{Deserialize, Serialize};
use tracing::debug;
use trustcert_core::{Result, TrustError, TrustStoreEntry};

use super::TrustStore;
use crate::config::StoreFormat;
use crate::inspect::fingerprint;

const SEALED_VERSION: u32 = 1;
const KDF_ALGORITHM: &str = "pbkdf2-hmac-sha256";
const PBKDF2_ITERATIONS: u32 = 100_000;
/// Upper bound on the unauthenticated iteration count read from a sealed file.
const MAX_PBKDF2_ITERATIONS: u32 = 10 * PBKDF2_ITERATIONS;
const SALT_LEN: usize = 16;

const PEM_TAG: &str = "CERTIFICATE";
const ALIAS_PREFIX: &str = "# alias: ";
const ADDED_PREFIX: &str = "# added: ";

#[derive(Serialize, Deserialize)]
struct SealedFile {
    version: u32,
    kdf: KdfParams,
    entries: Vec<EntryRecord>,
    mac: String,
}

#[derive(Serialize, Deserialize)]
struct KdfParams {
    algorithm: String,
    salt: String,
    iterations: u32,
}

#[derive(Serialize, Deserialize)]
struct EntryRecord {
    alias: String,
    added_at: String,
    certificate: String,
}

/// Serialize `store` in `format`.
pub(crate) fn encode(store: &TrustStore, format: StoreFormat, password: &str) -> Result<Vec<u8>> {
    match format {
        StoreFormat::Sealed => encode_sealed(store, password),
        StoreFormat::Pem => Ok(encode_pem(store).into_bytes()),
    }
}

/// Parse `bytes` read from `path` in `format`.
pub(crate) fn decode(
    bytes: &[u8],
    format: StoreFormat,
    password: &str,
    path: &str,
) -> Result<TrustStore> {
    match format {
        StoreFormat::Sealed => decode_sealed(bytes, password, path),
        StoreFormat::Pem => decode_pem(bytes, path),
    }
}

fn encode_sealed(store: &TrustStore, password: &str) -> Result<Vec<u8>> {
    let mut salt = [0u8; SALT_LEN];
    SystemRandom::new()
        .fill(&mut salt)
        .map_err(|_| TrustError::CryptoConfig("system random source unavailable".into()))?;

    let entries: Vec<EntryRecord> = store
        .entries()
        .map(|entry| EntryRecord {
            alias: entry.alias.clone(),
            added_at: entry.added_at.to_rfc3339_opts(SecondsFormat::Micros, true),
            certificate: BASE64.encode(&entry.certificate),
        })
        .collect();

    let key = seal_key(password, &salt, PBKDF2_ITERATIONS)?;
    let tag = hmac::sign(&key, &mac_input(SEALED_VERSION, &entries));

    let file = SealedFile {
        version: SEALED_VERSION,
        kdf: KdfParams {
            algorithm: KDF_ALGORITHM.to_string(),
            salt: hex::encode(salt),
            iterations: PBKDF2_ITERATIONS,
        },
        entries,
        mac: hex::encode(tag.as_ref()),
    };

    let mut bytes = serde_json::to_vec_pretty(&file)
        .map_err(|e| TrustError::CryptoConfig(format!("could not serialize store: {e}")))?;
    bytes.push(b'\n');
    Ok(bytes)
}

fn decode_sealed(bytes: &[u8], password: &str, path: &str) -> Result<TrustStore> {
    let corrupt = |reason: String| TrustError::StoreCorrupt {
        path: path.to_string(),
        reason,
    };

    let file: SealedFile = serde_json::from_slice(bytes).map_err(|e| corrupt(e.to_string()))?;
    if file.version != SEALED_VERSION {
        return Err(corrupt(format!("unsupported version {}", file.version)));
    }
    if file.kdf.algorithm != KDF_ALGORITHM {
        return Err(corrupt(format!("unsupported kdf {}", file.kdf.algorithm)));
    }

    if file.kdf.iterations > MAX_PBKDF2_ITERATIONS {
        return Err(corrupt(format!(
            "kdf iteration count {} exceeds {MAX_PBKDF2_ITERATIONS}",
            file.kdf.iterations
        )));
    }

    let salt = hex::decode(&file.kdf.salt).map_err(|e| corrupt(format!("salt: {e}")))?;
    let tag = hex::decode(&file.mac).map_err(|e| corrupt(format!("mac: {e}")))?;
    let key = seal_key(password, &salt, file.kdf.iterations)?;
    hmac::verify(&key, &mac_input(file.version, &file.entries), &tag).map_err(|_| {
        TrustError::StoreIntegrity {
            path: path.to_string(),
        }
    })?;

    let mut store = TrustStore::new();
    for record in file.entries {
        let certificate = BASE64
            .decode(&record.certificate)
            .map_err(|e| corrupt(format!("entry {}: {e}", record.alias)))?;
        let added_at = DateTime::parse_from_rfc3339(&record.added_at)
            .map_err(|e| corrupt(format!("entry {}: {e}", record.alias)))?
            .with_timezone(&Utc);
        store.insert(TrustStoreEntry {
            alias: record.alias,
            certificate,
            added_at,
        });
    }
    Ok(store)
}

fn seal_key(password: &str, salt: &[u8], iterations: u32) -> Result<hmac::Key> {
    let iterations = NonZeroU32::new(iterations)
        .ok_or_else(|| TrustError::CryptoConfig("kdf iteration count must be non-zero".into()))?;
    let mut secret = [0u8; 32];
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        iterations,
        salt,
        password.as_bytes(),
        &mut secret,
    );
    Ok(hmac::Key::new(hmac::HMAC_SHA256, &secret))
}

/// Length-prefixed concatenation of every authenticated field.
fn mac_input(version: u32, entries: &[EntryRecord]) -> Vec<u8> {
    let mut material = Vec::new();
    material.extend_from_slice(&version.to_be_bytes());
    for record in entries {
        for field in [&record.alias, &record.added_at, &record.certificate] {
            material.extend_from_slice(&(field.len() as u64).to_be_bytes());
            material.extend_from_slice(field.as_bytes());
        }
    }
    material
}

pub(super) fn encode_pem(store: &TrustStore) -> String {
    let mut out = String::new();
    for entry in store.entries() {
        out.push_str(ALIAS_PREFIX);
        out.push_str(&entry.alias);
        out.push('\n');
        out.push_str(ADDED_PREFIX);
        out.push_str(&entry.added_at.to_rfc3339_opts(SecondsFormat::Micros, true));
        out.push('\n');
        out.push_str(&pem::encode(&pem::Pem::new(PEM_TAG, entry.certificate.clone())));
        out.push('\n');
    }
    out
}

fn decode_pem(bytes: &[u8], path: &str) -> Result<TrustStore> {
    let corrupt = |reason: String| TrustError::StoreCorrupt {
        path: path.to_string(),
        reason,
    };
    let text = std::str::from_utf8(bytes).map_err(|e| corrupt(e.to_string()))?;

    let mut store = TrustStore::new();
    let mut alias: Option<String> = None;
    let mut added_at: Option<DateTime<Utc>> = None;
    let mut block: Option<String> = None;

    for line in text.lines() {
        if let Some(buf) = block.as_mut() {
            buf.push_str(line);
            buf.push('\n');
            if line.starts_with("-----END ") {
                let parsed = pem::parse(buf.as_bytes()).map_err(|e| corrupt(e.to_string()))?;
                block = None;
                if parsed.tag() != PEM_TAG {
                    debug!(tag = parsed.tag(), "skipping non-certificate PEM block");
                    alias = None;
                    added_at = None;
                    continue;
                }
                let certificate = parsed.into_contents();
                let alias = alias
                    .take()
                    .unwrap_or_else(|| format!("cert-{}", &fingerprint(&certificate)[..8]));
                store.insert(TrustStoreEntry {
                    alias,
                    certificate,
                    added_at: added_at.take().unwrap_or_else(Utc::now),
                });
            }
        } else if let Some(name) = line.strip_prefix(ALIAS_PREFIX) {
            alias = Some(name.trim().to_string());
        } else if let Some(stamp) = line.strip_prefix(ADDED_PREFIX) {
            added_at = DateTime::parse_from_rfc3339(stamp.trim())
                .ok()
                .map(|t| t.with_timezone(&Utc));
        } else if line.starts_with("-----BEGIN ") {
            block = Some(format!("{line}\n"));
        }
    }

    if block.is_some() {
        return Err(corrupt("unterminated PEM block".into()));
    }
    Ok(store)
}
