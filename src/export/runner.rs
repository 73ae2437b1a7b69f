//! Sequential export of every listed entry into an output directory.

use std::path::{Path, PathBuf};

use tokio::fs::{self, OpenOptions};
use tracing::{debug, info, instrument, warn};

use super::error::ExportError;
use super::filename::{entry_file_name, resolve_unique_path};
use crate::api::{EntryFilter, ExportFormat};
use crate::client::ApiClient;
use crate::model::Entry;

/// What to export and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Directory receiving the exported files; created when missing.
    pub output_dir: PathBuf,
    /// Document format requested from the server.
    pub format: ExportFormat,
    /// Mark each successfully exported entry as archived.
    pub archive_after_export: bool,
    /// Export entries that are already archived instead of skipping them.
    pub include_archived: bool,
}

impl ExportOptions {
    /// Options exporting unarchived entries as `format` into `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>, format: ExportFormat) -> Self {
        Self {
            output_dir: output_dir.into(),
            format,
            archive_after_export: false,
            include_archived: false,
        }
    }
}

/// One entry that did not make it through the run.
#[derive(Debug)]
pub struct ExportFailure {
    /// Entry id.
    pub id: u64,
    /// Entry title at listing time.
    pub title: String,
    /// What went wrong.
    pub error: ExportError,
}

/// Counters from an export run.
#[derive(Debug, Default)]
pub struct ExportStats {
    /// Entries written to disk.
    pub exported: usize,
    /// Archived entries left out.
    pub skipped: usize,
    /// Entries whose export or archiving failed.
    pub failed: usize,
    /// Entries marked archived after export.
    pub archived: usize,
    /// Total bytes written.
    pub bytes: u64,
    /// Per-entry failures in listing order.
    pub failures: Vec<ExportFailure>,
    /// Files written, in listing order.
    pub files: Vec<PathBuf>,
}

impl ExportStats {
    /// Number of entries looked at.
    #[must_use]
    pub fn total(&self) -> usize {
        self.exported + self.skipped + self.failures.iter().filter(|f| is_export_failure(f)).count()
    }

    /// True when no entry failed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }

    fn record_failure(&mut self, entry: &Entry, error: ExportError) {
        warn!(id = entry.id, error = %error, "entry failed");
        self.failed += 1;
        self.failures.push(ExportFailure {
            id: entry.id,
            title: entry.title.clone(),
            error,
        });
    }
}

fn is_export_failure(failure: &ExportFailure) -> bool {
    !matches!(failure.error, ExportError::Archive { .. })
}

/// Runs an export: list, then export (and optionally archive) one entry at a time.
#[derive(Debug, Clone)]
pub struct ExportRunner {
    options: ExportOptions,
}

impl ExportRunner {
    /// Creates a runner.
    #[must_use]
    pub fn new(options: ExportOptions) -> Self {
        Self { options }
    }

    /// The options this runner was built with.
    #[must_use]
    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Exports every entry matching `filter`.
    ///
    /// Failures of individual entries are recorded in the returned stats and
    /// do not stop the run. A failed export never leaves a partial file.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::OutputDir`] when the output directory cannot be
    /// created and [`ExportError::Listing`] when the entries cannot be listed.
    #[instrument(skip(self, client, filter), fields(dir = %self.options.output_dir.display(), format = %self.options.format))]
    pub async fn run(
        &self,
        client: &mut ApiClient,
        filter: &EntryFilter,
    ) -> Result<ExportStats, ExportError> {
        let dir = &self.options.output_dir;
        fs::create_dir_all(dir)
            .await
            .map_err(|source| ExportError::OutputDir {
                path: dir.clone(),
                source,
            })?;

        let entries = client
            .list_entries(filter)
            .await
            .map_err(ExportError::Listing)?;
        info!(count = entries.len(), "starting export");

        let mut stats = ExportStats::default();
        for entry in &entries {
            if entry.is_archived && !self.options.include_archived {
                debug!(id = entry.id, "skipping archived entry");
                stats.skipped += 1;
                continue;
            }

            match self.export_one(client, entry, dir).await {
                Ok((path, bytes)) => {
                    info!(id = entry.id, path = %path.display(), bytes, "exported");
                    stats.exported += 1;
                    stats.bytes += bytes;
                    stats.files.push(path);
                }
                Err(error) => {
                    stats.record_failure(entry, error);
                    continue;
                }
            }

            if self.options.archive_after_export && !entry.is_archived {
                match client.archive_entry(entry.id).await {
                    Ok(()) => {
                        debug!(id = entry.id, "archived");
                        stats.archived += 1;
                    }
                    Err(source) => stats.record_failure(
                        entry,
                        ExportError::Archive {
                            id: entry.id,
                            source,
                        },
                    ),
                }
            }
        }

        info!(
            exported = stats.exported,
            skipped = stats.skipped,
            failed = stats.failed,
            archived = stats.archived,
            bytes = stats.bytes,
            "export finished"
        );
        Ok(stats)
    }

    async fn export_one(
        &self,
        client: &mut ApiClient,
        entry: &Entry,
        dir: &Path,
    ) -> Result<(PathBuf, u64), ExportError> {
        let path = resolve_unique_path(dir, &entry_file_name(entry, self.options.format));
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|source| ExportError::CreateFile {
                path: path.clone(),
                source,
            })?;

        match client
            .export_entry(entry.id, self.options.format, &mut file)
            .await
        {
            Ok(bytes) => Ok((path, bytes)),
            Err(source) => {
                drop(file);
                if let Err(error) = fs::remove_file(&path).await {
                    warn!(path = %path.display(), error = %error, "cannot remove partial export");
                }
                Err(ExportError::Entry {
                    id: entry.id,
                    source,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_options_defaults() {
        let options = ExportOptions::new("out", ExportFormat::Epub);
        assert_eq!(options.output_dir, PathBuf::from("out"));
        assert_eq!(options.format, ExportFormat::Epub);
        assert!(!options.archive_after_export);
        assert!(!options.include_archived);
    }

    #[test]
    fn test_stats_total_ignores_archive_failures() {
        let mut stats = ExportStats {
            exported: 2,
            skipped: 1,
            ..ExportStats::default()
        };
        let entry = Entry {
            id: 9,
            ..Entry::default()
        };
        stats.record_failure(
            &entry,
            ExportError::Archive {
                id: 9,
                source: crate::api::ApiError::bad_status("u", 500),
            },
        );
        stats.record_failure(
            &entry,
            ExportError::Entry {
                id: 9,
                source: crate::api::ApiError::bad_status("u", 404),
            },
        );
        assert_eq!(stats.failed, 2);
        assert_eq!(stats.total(), 4);
        assert!(!stats.is_clean());
    }
}
