//! Command implementations.

pub mod check;
pub mod config;
pub mod export;
pub mod list;

use std::path::PathBuf;

use trustcert::{TrustConfig, TrustStoreHandle};

use super::args::Cli;
use crate::config::Config;
use crate::output::OutputFormat;

/// Settings shared by all commands, after merging flags over the config file.
#[derive(Debug, Clone)]
pub struct Context {
    /// Engine configuration
    pub trust: TrustConfig,

    /// Trust store directory
    pub store_dir: PathBuf,

    /// Output format
    pub output_format: OutputFormat,

    /// Exit non-zero when a check cannot complete
    pub fail_on_error: bool,

    /// Config file in effect, if one was given explicitly
    pub config_path: Option<PathBuf>,
}

impl Context {
    /// Flags win over the config file, which wins over built-in defaults.
    pub fn resolve(cli: &Cli, config: Config) -> Self {
        let mut trust = config.trust;
        if let Some(password) = &cli.password {
            trust.password.clone_from(password);
        }
        if let Some(format) = cli.format {
            trust.format = format.into();
        }

        Self {
            trust,
            store_dir: cli
                .store_dir
                .clone()
                .or(config.store_dir)
                .unwrap_or_else(|| PathBuf::from(".")),
            output_format: cli.output.or(config.output_format).unwrap_or_default(),
            fail_on_error: config.fail_on_error.unwrap_or(true),
            config_path: cli.config.clone(),
        }
    }

    /// Handle for the store in the configured directory.
    pub fn handle(&self) -> TrustStoreHandle {
        TrustStoreHandle::in_dir(&self.store_dir, &self.trust)
    }
}
