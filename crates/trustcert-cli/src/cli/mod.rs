//! CLI argument parsing and command dispatch.

pub mod args;
pub mod commands;

use anyhow::Result;
use args::{Cli, Commands};

use crate::config::Config;

/// Run a parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = Config::load(cli.config.as_deref())?;
    let ctx = commands::Context::resolve(&cli, config);

    match cli.command {
        Commands::Check(args) => commands::check::execute(&ctx, &args),
        Commands::List => commands::list::execute(&ctx),
        Commands::Export(args) => commands::export::execute(&ctx, &args),
        Commands::Config(args) => commands::config::execute(&ctx, &args),
    }
}
