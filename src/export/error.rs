//! Error types for export runs.

use std::path::PathBuf;

use thiserror::Error;

use crate::api::ApiError;

/// Errors raised while exporting entries to local files.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The output directory could not be created.
    #[error("cannot create output directory {}: {source}", path.display())]
    OutputDir {
        /// Directory path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Listing entries failed; nothing was exported.
    #[error("cannot list entries: {0}")]
    Listing(#[source] ApiError),

    /// The destination file for an entry could not be created.
    #[error("cannot create {}: {source}", path.display())]
    CreateFile {
        /// File path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Exporting a single entry failed.
    #[error("export of entry {id} failed: {source}")]
    Entry {
        /// Entry id.
        id: u64,
        /// Underlying API error.
        #[source]
        source: ApiError,
    },

    /// Marking an exported entry as archived failed.
    #[error("archiving entry {id} failed: {source}")]
    Archive {
        /// Entry id.
        id: u64,
        /// Underlying API error.
        #[source]
        source: ApiError,
    },
}

impl ExportError {
    /// Id of the entry this error concerns, if any.
    #[must_use]
    pub fn entry_id(&self) -> Option<u64> {
        match self {
            Self::Entry { id, .. } | Self::Archive { id, .. } => Some(*id),
            Self::OutputDir { .. } | Self::Listing(_) | Self::CreateFile { .. } => None,
        }
    }
}
