//! Target endpoint parsing.

use std::fmt;
use std::str::FromStr;

use url::{Host, Url};

use crate::error::{Result, TrustError};

/// Port used when the URL does not name one
pub const DEFAULT_HTTPS_PORT: u16 = 443;

const HTTPS_PREFIX: &str = "https://";

/// A `host:port` pair parsed from an `https://host[:port]` URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetEndpoint {
    host: String,
    port: u16,
}

impl TargetEndpoint {
    /// Create an endpoint directly, skipping URL validation.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Parse an `https://host[:port]` URL.
    ///
    /// The input must start with `https://` and must not end with `/`.
    /// Paths, queries, fragments and credentials are rejected too.
    pub fn parse(input: &str) -> Result<Self> {
        if !input.starts_with(HTTPS_PREFIX) {
            return Err(TrustError::invalid_url(input, "must start with https://"));
        }
        if input.ends_with('/') {
            return Err(TrustError::invalid_url(
                input,
                "must not end with a path separator",
            ));
        }
        let authority = &input[HTTPS_PREFIX.len()..];
        if authority.is_empty() {
            return Err(TrustError::invalid_url(input, "missing host"));
        }
        if authority.contains(['/', '?', '#', '@']) {
            return Err(TrustError::invalid_url(
                input,
                "only https://host[:port] is accepted",
            ));
        }

        let url = Url::parse(input).map_err(|e| TrustError::invalid_url(input, e.to_string()))?;
        let host = match url.host() {
            Some(Host::Domain(domain)) => domain.to_string(),
            Some(Host::Ipv4(addr)) => addr.to_string(),
            Some(Host::Ipv6(addr)) => addr.to_string(),
            None => return Err(TrustError::invalid_url(input, "missing host")),
        };
        let port = url.port().unwrap_or(DEFAULT_HTTPS_PORT);

        Ok(Self { host, port })
    }

    /// Host name or IP literal (IPv6 without brackets)
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// TCP port
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Reconstruct the canonical URL for this endpoint.
    #[must_use]
    pub fn url(&self) -> String {
        if self.port == DEFAULT_HTTPS_PORT {
            format!("{HTTPS_PREFIX}{}", self.bracketed_host())
        } else {
            format!("{HTTPS_PREFIX}{self}")
        }
    }

    fn bracketed_host(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        }
    }
}

impl fmt::Display for TargetEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.bracketed_host(), self.port)
    }
}

impl FromStr for TargetEndpoint {
    type Err = TrustError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_port() {
        let ep = TargetEndpoint::parse("https://example.internal").unwrap();
        assert_eq!(ep.host(), "example.internal");
        assert_eq!(ep.port(), 443);
    }

    #[test]
    fn test_explicit_port() {
        let ep = TargetEndpoint::parse("https://example.internal:8443").unwrap();
        assert_eq!(ep.port(), 8443);
        assert_eq!(ep.to_string(), "example.internal:8443");
        assert_eq!(ep.url(), "https://example.internal:8443");
    }

    #[test]
    fn test_explicit_default_port() {
        let ep: TargetEndpoint = "https://host:443".parse().unwrap();
        assert_eq!(ep.port(), 443);
        assert_eq!(ep.url(), "https://host");
    }

    #[test]
    fn test_ipv6_literal() {
        let ep = TargetEndpoint::parse("https://[::1]:9443").unwrap();
        assert_eq!(ep.host(), "::1");
        assert_eq!(ep.to_string(), "[::1]:9443");
    }

    #[test]
    fn test_rejects_wrong_scheme() {
        for bad in ["http://host", "host:443", "ftp://host", "HTTPS//host", ""] {
            let err = TargetEndpoint::parse(bad).unwrap_err();
            assert!(err.is_validation(), "{bad} should fail validation");
        }
    }

    #[test]
    fn test_rejects_trailing_separator() {
        assert!(TargetEndpoint::parse("https://host/").is_err());
        assert!(TargetEndpoint::parse("https://host:8443/").is_err());
    }

    #[test]
    fn test_rejects_paths_and_junk() {
        for bad in [
            "https://",
            "https://host/path",
            "https://host?x=1",
            "https://user@host",
            "https://host:notaport",
            "https://host:70000",
        ] {
            assert!(TargetEndpoint::parse(bad).is_err(), "{bad} should be rejected");
        }
    }
}
