//! `trustcert check` - trust a URL on first use.

use std::time::Duration;

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use tracing::warn;
use trustcert::{
    Action, AnchorSource, CheckReport, CheckSummary, TrustConfig, TrustedCertificates,
};

use super::Context;
use crate::cli::args::CheckArgs;
use crate::output::OutputFormat;

#[derive(Serialize)]
struct CheckOutput {
    #[serde(flatten)]
    summary: CheckSummary,
    store_path: String,
}

pub fn execute(ctx: &Context, args: &CheckArgs) -> Result<()> {
    let fail_on_error = ctx.fail_on_error && !args.no_fail_on_error;
    let config = apply_overrides(ctx.trust.clone(), args);

    let trusted = match TrustedCertificates::create_with_config(&ctx.store_dir, &args.url, config)
    {
        Ok(trusted) => trusted,
        Err(e) if fail_on_error => return Err(e.into()),
        Err(e) => {
            warn!(url = %args.url, error = %e, "certificate check failed");
            return Ok(());
        }
    };

    let report = trusted.last_report();
    let store_path = trusted.context().store_path().display().to_string();

    match ctx.output_format {
        OutputFormat::Json => {
            let output = CheckOutput {
                summary: report.summary(),
                store_path,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Pretty => print_report_pretty(report, &store_path),
    }

    if let Some(err) = report.outcome.error() {
        if fail_on_error {
            anyhow::bail!("certificate check for {} failed: {err}", report.endpoint);
        }
        warn!(endpoint = %report.endpoint, error = %err, "certificate check failed");
    }

    Ok(())
}

fn apply_overrides(mut config: TrustConfig, args: &CheckArgs) -> TrustConfig {
    if let Some(suffix) = &args.alias_suffix {
        config.alias_suffix.clone_from(suffix);
    }
    if let Some(path) = &args.anchors_pem {
        config.anchors = AnchorSource::PemFile { path: path.clone() };
    }
    if args.no_default_anchors {
        config.anchors = AnchorSource::Empty;
    }
    if let Some(secs) = args.handshake_timeout {
        config = config.handshake_timeout(Duration::from_secs(secs));
    }
    if let Some(secs) = args.connect_timeout {
        config = config.connect_timeout((secs > 0).then_some(Duration::from_secs(secs)));
    }
    config
}

fn print_report_pretty(report: &CheckReport, store_path: &str) {
    println!("{} {}", "Endpoint:".bold(), report.endpoint.to_string().cyan().bold());

    let decision = match report.outcome.decision() {
        None => "accepted".green().to_string(),
        Some(d) if report.is_trusted() => format!("{d:?}").green().to_string(),
        Some(d) => format!("{d:?}").yellow().to_string(),
    };
    println!("  {} {}", "Decision:".bold(), decision);
    println!("  {} {}", "Chain:".bold(), report.chain_len);

    let action = match (report.action, &report.persisted) {
        (Action::NoOp, _) => "none".dimmed().to_string(),
        (Action::PersistChain, Some(entry)) => format!("trusted as {}", entry.alias.green()),
        (Action::RebuildThenPersist, Some(entry)) => {
            format!("store rebuilt, trusted as {}", entry.alias.green())
        }
        (_, None) => "nothing captured to trust".yellow().to_string(),
    };
    println!("  {} {}", "Action:".bold(), action);

    if let Some(err) = report.outcome.error() {
        println!("  {} {}", "Error:".bold().red(), err);
    }
    println!("  {} {}", "Store:".bold(), store_path);
}
