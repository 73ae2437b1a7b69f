//! Show command handler: prints one entry as pretty JSON.

use anyhow::{Context, Result};
use wallabag_core::ApiClient;

use crate::cli::ShowArgs;

pub async fn run_show_command(client: &mut ApiClient, args: &ShowArgs) -> Result<()> {
    let entry = client
        .get_entry(args.id)
        .await
        .with_context(|| format!("cannot fetch entry {}", args.id))?;
    let json = serde_json::to_string_pretty(&entry).context("cannot render entry as JSON")?;
    println!("{json}");
    Ok(())
}
