//! Core types for the trustcert trust-on-first-use engine.
//!
//! This crate provides the foundational types shared by the engine and the CLI:
//!
//! - **Types**: [`TargetEndpoint`], [`CertificateChain`], [`TrustDecision`],
//!   [`ProbeOutcome`], [`Action`] and [`TrustStoreEntry`]
//! - **Errors**: the failure taxonomy in [`TrustError`] / [`ErrorKind`]
//!
//! # Example
//!
//! ```rust
//! use trustcert_core::{TargetEndpoint, TrustError};
//!
//! let ep = TargetEndpoint::parse("https://build.internal:8443")?;
//! assert_eq!(ep.port(), 8443);
//! assert!(TargetEndpoint::parse("https://build.internal/").is_err());
//! # Ok::<(), TrustError>(())
//! ```

mod error;
pub mod types;

pub use error::{ErrorKind, Result, TrustError};
pub use types::*;
