//! `trustcert export` - write the store as a PEM bundle.

use anyhow::{Context as _, Result};
use colored::Colorize;

use super::Context;
use crate::cli::args::ExportArgs;

pub fn execute(ctx: &Context, args: &ExportArgs) -> Result<()> {
    let store = ctx.handle().load()?;
    let bundle = store.to_pem();

    match &args.out {
        Some(path) => {
            std::fs::write(path, &bundle)
                .with_context(|| format!("writing {}", path.display()))?;
            eprintln!(
                "{} wrote {} certificates to {}",
                "Success:".green().bold(),
                store.len(),
                path.display()
            );
        }
        None => print!("{bundle}"),
    }

    Ok(())
}
