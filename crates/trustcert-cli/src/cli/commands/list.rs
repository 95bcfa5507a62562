//! `trustcert list` - show store contents.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};
use trustcert::inspect::{describe, CertificateSummary};
use trustcert::TrustStore;

use super::Context;
use crate::output::OutputFormat;

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "Alias")]
    alias: String,
    #[tabled(rename = "Subject")]
    subject: String,
    #[tabled(rename = "Expires")]
    expires: String,
    #[tabled(rename = "SHA-256")]
    fingerprint: String,
}

#[derive(Debug, Serialize)]
struct ListedEntry {
    alias: String,
    added_at: String,
    certificate: Option<CertificateSummary>,
    error: Option<String>,
}

pub fn execute(ctx: &Context) -> Result<()> {
    let handle = ctx.handle();
    let store = handle.load()?;

    match ctx.output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&listed_entries(&store))?);
        }
        OutputFormat::Pretty => {
            println!(
                "{} {} ({} entries)",
                "Store:".bold(),
                handle.path().display(),
                store.len()
            );
            if store.is_empty() {
                return Ok(());
            }
            let table = Table::new(table_rows(&store))
                .with(Style::rounded())
                .to_string();
            println!("{table}");
        }
    }

    Ok(())
}

fn listed_entries(store: &TrustStore) -> Vec<ListedEntry> {
    store
        .entries()
        .map(|entry| {
            let (certificate, error) = match describe(&entry.certificate) {
                Ok(summary) => (Some(summary), None),
                Err(e) => (None, Some(e.to_string())),
            };
            ListedEntry {
                alias: entry.alias.clone(),
                added_at: entry.added_at.to_rfc3339(),
                certificate,
                error,
            }
        })
        .collect()
}

fn table_rows(store: &TrustStore) -> Vec<EntryRow> {
    store
        .entries()
        .map(|entry| match describe(&entry.certificate) {
            Ok(summary) => EntryRow {
                alias: entry.alias.clone(),
                subject: summary.common_name.unwrap_or(summary.subject),
                expires: if summary.expired {
                    summary.not_after.format("%Y-%m-%d").to_string().red().to_string()
                } else {
                    summary.not_after.format("%Y-%m-%d").to_string()
                },
                fingerprint: summary.fingerprint[..16].to_string(),
            },
            Err(_) => EntryRow {
                alias: entry.alias.clone(),
                subject: "(unparsable)".dimmed().to_string(),
                expires: String::new(),
                fingerprint: String::new(),
            },
        })
        .collect()
}
