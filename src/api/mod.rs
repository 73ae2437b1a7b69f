//! Authenticated request layer and entry operations.
//!
//! # Architecture
//!
//! - [`dispatcher`] - `request` / `get` / `patch` on [`crate::ApiClient`], each
//!   carrying a fresh bearer header
//! - [`entries`] - paginated listing plus single-entry get, patch, and export

pub mod dispatcher;
pub mod entries;
mod error;

pub use entries::{EntryFilter, ExportFormat, UnknownFormat};
pub use error::ApiError;
