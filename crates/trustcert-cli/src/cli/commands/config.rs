//! `trustcert config` - show configuration.

use anyhow::Result;
use colored::Colorize;

use super::Context;
use crate::cli::args::{ConfigArgs, ConfigCommands};
use crate::config::Config;
use crate::output::OutputFormat;

const REDACTED: &str = "<redacted>";

pub fn execute(ctx: &Context, args: &ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Show => show_config(ctx),
        ConfigCommands::Path => show_path(ctx),
    }
}

fn effective(ctx: &Context) -> Config {
    let mut trust = ctx.trust.clone();
    trust.password = REDACTED.to_string();
    Config {
        store_dir: Some(ctx.store_dir.clone()),
        output_format: Some(ctx.output_format),
        fail_on_error: Some(ctx.fail_on_error),
        trust,
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    let config = effective(ctx);

    match ctx.output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        OutputFormat::Pretty => {
            println!("{}", "Effective Configuration:".bold());
            println!();
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn show_path(ctx: &Context) -> Result<()> {
    let path = match &ctx.config_path {
        Some(path) => path.clone(),
        None => Config::path()?,
    };
    println!("{}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::Cli;
    use clap::Parser;

    #[test]
    fn test_effective_config_redacts_password() {
        let cli = Cli::try_parse_from(["trustcert", "config", "show", "--password", "hunter2"])
            .unwrap();
        let ctx = Context::resolve(&cli, Config::default());
        let rendered = toml::to_string_pretty(&effective(&ctx)).unwrap();
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains(REDACTED));
    }
}
