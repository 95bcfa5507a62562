//! Default trust anchor discovery.

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, info, warn};
use trustcert_core::{Result, TrustError, TrustStoreEntry};

use crate::config::AnchorSource;
use crate::inspect::{describe, fingerprint};

/// Load the initial anchors for a new store from `source`.
///
/// Individual certificates that fail to parse are logged and skipped; the
/// source as a whole must be readable.
pub fn load_default_anchors(source: &AnchorSource) -> Result<Vec<TrustStoreEntry>> {
    let ders = match source {
        AnchorSource::Native => load_native()?,
        AnchorSource::PemFile { path } => load_pem_bundle(path)?,
        AnchorSource::Empty => Vec::new(),
    };

    let mut seen_fingerprints = HashSet::new();
    let mut entries = Vec::with_capacity(ders.len());
    for der in ders {
        let fp = fingerprint(&der);
        if !seen_fingerprints.insert(fp.clone()) {
            continue;
        }
        match anchor_alias(&der, &fp) {
            Ok(alias) => entries.push(TrustStoreEntry::new(alias, der)),
            Err(e) => debug!(fingerprint = %fp, error = %e, "skipping unparsable anchor"),
        }
    }

    info!(source = ?source, count = entries.len(), "loaded default trust anchors");
    Ok(entries)
}

fn load_native() -> Result<Vec<Vec<u8>>> {
    let result = rustls_native_certs::load_native_certs();
    for e in &result.errors {
        warn!(error = %e, "error while reading native trust store");
    }
    if result.certs.is_empty() && !result.errors.is_empty() {
        let reasons: Vec<String> = result.errors.iter().map(ToString::to_string).collect();
        return Err(TrustError::StoreCreation {
            path: "native trust store".to_string(),
            reason: reasons.join("; "),
        });
    }
    Ok(result.certs.into_iter().map(|c| c.as_ref().to_vec()).collect())
}

fn load_pem_bundle(path: &Path) -> Result<Vec<Vec<u8>>> {
    let path_str = path.display().to_string();
    let content = std::fs::read(path).map_err(|e| TrustError::io(&path_str, e))?;

    let pems = pem::parse_many(&content).map_err(|e| TrustError::StoreCreation {
        path: path_str.clone(),
        reason: e.to_string(),
    })?;

    Ok(pems
        .into_iter()
        .filter(|p| p.tag() == "CERTIFICATE")
        .map(pem::Pem::into_contents)
        .collect())
}

/// `<slug of subject CN>-<first 8 hex of fingerprint>`
fn anchor_alias(der: &[u8], fp: &str) -> Result<String> {
    let summary = describe(der)?;
    let name = summary.common_name.unwrap_or(summary.subject);
    let slug: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    let slug = if slug.is_empty() { "anchor".to_string() } else { slug };
    Ok(format!("{slug}-{}", &fp[..8]))
}
