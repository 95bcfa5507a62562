//! # trustcert-cli
//!
//! Command-line front end for the `trustcert` engine.
//!
//! ## Commands
//!
//! - **check**: bootstrap the store in a directory and trust a URL on first use
//! - **list**: show the certificates in a store
//! - **export**: write a store as a PEM bundle
//! - **config**: show the effective configuration or its file path

pub mod cli;
pub mod config;
pub mod output;

pub use cli::run;
