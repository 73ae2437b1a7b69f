//! Export command handler.

use std::process::ExitCode;

use anyhow::{Context, Result};
use wallabag_core::{ApiClient, ExportOptions, ExportRunner};

use crate::cli::ExportArgs;

pub async fn run_export_command(
    client: &mut ApiClient,
    args: &ExportArgs,
    quiet: bool,
) -> Result<ExitCode> {
    let options = ExportOptions {
        output_dir: args.output.clone(),
        format: args.format,
        archive_after_export: args.archive,
        include_archived: args.filter.include_archived,
    };
    let runner = ExportRunner::new(options);
    let stats = runner
        .run(client, &args.filter.to_filter())
        .await
        .context("export aborted")?;

    for failure in &stats.failures {
        eprintln!("failed: {} ({}): {}", failure.id, failure.title, failure.error);
    }
    if !quiet {
        println!(
            "Exported {} entries ({} bytes) to {}; skipped {}, archived {}, failed {}.",
            stats.exported,
            stats.bytes,
            args.output.display(),
            stats.skipped,
            stats.archived,
            stats.failed,
        );
    }

    Ok(if stats.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
