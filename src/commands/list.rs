//! List command handler: one `id<TAB>title` line per entry.

use std::io::{self, Write};

use anyhow::{Context, Result};
use wallabag_core::ApiClient;

use crate::cli::FilterArgs;

pub async fn run_list_command(client: &mut ApiClient, args: &FilterArgs) -> Result<()> {
    let entries = client
        .list_entries(&args.to_filter())
        .await
        .context("cannot list entries")?;

    let mut stdout = io::stdout().lock();
    for entry in &entries {
        writeln!(stdout, "{}\t{}", entry.id, entry.title.replace(['\t', '\n'], " "))?;
    }
    Ok(())
}
