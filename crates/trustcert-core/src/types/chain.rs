//! Certificate chains as presented by a TLS peer.

/// Ordered DER certificates, leaf first, exactly as the peer sent them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CertificateChain {
    certs: Vec<Vec<u8>>,
}

impl CertificateChain {
    /// Build a chain from DER certificates in peer order.
    #[must_use]
    pub const fn new(certs: Vec<Vec<u8>>) -> Self {
        Self { certs }
    }

    /// Number of certificates in the chain
    #[must_use]
    pub fn len(&self) -> usize {
        self.certs.len()
    }

    /// Returns true if the peer sent no certificates
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.certs.is_empty()
    }

    /// The peer's own certificate.
    #[must_use]
    pub fn leaf(&self) -> Option<&[u8]> {
        self.certs.first().map(Vec::as_slice)
    }

    /// The last certificate the peer sent, nominally the one closest to a root.
    #[must_use]
    pub fn topmost(&self) -> Option<&[u8]> {
        self.certs.last().map(Vec::as_slice)
    }

    /// Iterate over DER certificates in peer order.
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.certs.iter().map(Vec::as_slice)
    }
}

impl From<Vec<Vec<u8>>> for CertificateChain {
    fn from(certs: Vec<Vec<u8>>) -> Self {
        Self::new(certs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_and_topmost() {
        let chain = CertificateChain::new(vec![vec![1], vec![2], vec![3]]);
        assert_eq!(chain.len(), 3);
        assert_eq!(chain.leaf(), Some(&[1u8][..]));
        assert_eq!(chain.topmost(), Some(&[3u8][..]));
    }

    #[test]
    fn test_single_cert_chain() {
        let chain = CertificateChain::from(vec![vec![9, 9]]);
        assert_eq!(chain.leaf(), chain.topmost());
    }

    #[test]
    fn test_empty_chain() {
        let chain = CertificateChain::default();
        assert!(chain.is_empty());
        assert!(chain.topmost().is_none());
        assert_eq!(chain.iter().count(), 0);
    }
}
