//! Configuration file handling.

use anyhow::{Context as _, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use trustcert::TrustConfig;

use crate::output::OutputFormat;

/// CLI configuration.
///
/// ```toml
/// store_dir = "/var/lib/app/trust"
/// fail_on_error = true
///
/// [trust]
/// alias_suffix = "tofu"
/// handshake_timeout_secs = 10
///
/// [trust.anchors]
/// source = "pem_file"
/// path = "/etc/ssl/certs/ca-certificates.crt"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Store directory used when `--store-dir` is not given
    pub store_dir: Option<PathBuf>,

    /// Default output format
    pub output_format: Option<OutputFormat>,

    /// Exit non-zero when a check cannot complete
    pub fail_on_error: Option<bool>,

    /// Engine settings
    #[serde(default)]
    pub trust: TrustConfig,
}

impl Config {
    /// Default config file path.
    pub fn path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "trustcert", "trustcert")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Load `explicit`, or the default file if it exists.
    ///
    /// A missing explicit file is an error; a missing default file is not.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = Self::path()?;
                if !path.exists() {
                    return Ok(Self::default());
                }
                path
            }
        };

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;

        Ok(config)
    }
}
