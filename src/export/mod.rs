//! Exporting entries into local files.
//!
//! The core API streams into any async writer; this module owns the
//! file-system side: naming, uniqueness, cleanup of partial files, and the
//! sequential list → export → archive run.

mod error;
mod filename;
mod runner;

pub use error::ExportError;
pub use filename::{entry_file_name, resolve_unique_path, sanitize_filename};
pub use runner::{ExportFailure, ExportOptions, ExportRunner, ExportStats};
