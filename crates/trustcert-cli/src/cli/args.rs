//! Command-line argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use trustcert::StoreFormat;

use crate::output::OutputFormat;

/// Trust-on-first-use bootstrap for a local TLS trust store
///
/// Keeps a trust store in a directory, seeded from the system's trust
/// anchors, and adds a server's certificate the first time it is seen.
#[derive(Parser, Debug)]
#[command(name = "trustcert")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(short, long, env = "TRUSTCERT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the trust store
    #[arg(short = 'd', long, env = "TRUSTCERT_STORE_DIR", global = true)]
    pub store_dir: Option<PathBuf>,

    /// Trust store password
    #[arg(long, env = "TRUSTCERT_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,

    /// Trust store container format
    #[arg(long, value_enum, global = true)]
    pub format: Option<FormatArg>,

    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Make sure an https URL is trusted by the store, trusting it on first use
    Check(CheckArgs),

    /// List the certificates in the store
    List,

    /// Write the store as a PEM bundle
    Export(ExportArgs),

    /// Show configuration
    Config(ConfigArgs),
}

/// Container formats selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// Password-sealed JSON container
    Sealed,
    /// Plain PEM bundle
    Pem,
}

impl From<FormatArg> for StoreFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Sealed => Self::Sealed,
            FormatArg::Pem => Self::Pem,
        }
    }
}

// ============================================================================
// Check command
// ============================================================================

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Target URL, `https://host[:port]` with no trailing slash
    pub url: String,

    /// Report probe failures instead of exiting non-zero
    #[arg(long)]
    pub no_fail_on_error: bool,

    /// Alias suffix for accepted certificates
    #[arg(long)]
    pub alias_suffix: Option<String>,

    /// Seed a new store from this PEM bundle instead of the system anchors
    #[arg(long, conflicts_with = "no_default_anchors")]
    pub anchors_pem: Option<PathBuf>,

    /// Seed a new store with no anchors at all
    #[arg(long)]
    pub no_default_anchors: bool,

    /// Handshake timeout in seconds
    #[arg(long)]
    pub handshake_timeout: Option<u64>,

    /// Connect timeout in seconds; 0 leaves the connect unbounded
    #[arg(long)]
    pub connect_timeout: Option<u64>,
}

// ============================================================================
// Export command
// ============================================================================

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output file (stdout if omitted)
    #[arg(long)]
    pub out: Option<PathBuf>,
}

// ============================================================================
// Config command
// ============================================================================

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Show the default config file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_args() {
        let cli = Cli::try_parse_from([
            "trustcert",
            "check",
            "https://build.internal:8443",
            "--store-dir",
            "/tmp/trust",
            "--no-fail-on-error",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.store_dir, Some(PathBuf::from("/tmp/trust")));
        let Commands::Check(args) = cli.command else {
            panic!("expected check");
        };
        assert_eq!(args.url, "https://build.internal:8443");
        assert!(args.no_fail_on_error);
    }

    #[test]
    fn test_check_requires_url() {
        assert!(Cli::try_parse_from(["trustcert", "check"]).is_err());
    }

    #[test]
    fn test_anchor_flags_conflict() {
        let result = Cli::try_parse_from([
            "trustcert",
            "check",
            "https://h",
            "--anchors-pem",
            "roots.pem",
            "--no-default-anchors",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_format_and_output() {
        let cli =
            Cli::try_parse_from(["trustcert", "list", "--format", "pem", "-o", "json"]).unwrap();
        assert_eq!(cli.format, Some(FormatArg::Pem));
        assert_eq!(cli.output, Some(OutputFormat::Json));
        assert!(matches!(cli.command, Commands::List));
    }
}
