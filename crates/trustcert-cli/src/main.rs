//! trustcert - trust-on-first-use bootstrap for a local TLS trust store.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use trustcert_cli::cli::args::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise info, or debug with --verbose.
    let default_filter = if cli.verbose {
        "trustcert=debug,trustcert_cli=debug"
    } else {
        "trustcert=info,trustcert_cli=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match trustcert_cli::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
