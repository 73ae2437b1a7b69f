//! Wallabag export core library.
//!
//! This library authenticates against a wallabag server's REST API, lists
//! saved entries, and exports them as documents (PDF, EPUB, ...).
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`auth`] - OAuth2 token lifecycle and token persistence
//! - [`http`] - Injectable HTTP transport with streaming bodies
//! - [`api`] - Authenticated requests and entry operations
//! - [`model`] - Entry and entry page types
//! - [`config`] - Server configuration file and environment overrides
//! - [`export`] - Writing exports to local files and running a batch export
//!
//! Control flow: entry operations → request layer → authenticator → token store.

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod auth;
mod client;
pub mod config;
pub mod export;
pub mod http;
pub mod model;
pub mod paths;
mod user_agent;

// Re-export commonly used types
pub use api::{ApiError, EntryFilter, ExportFormat};
pub use auth::{
    AuthError, Authenticator, CredentialSource, FileTokenStore, MemoryTokenStore, Token,
    TokenStore,
};
pub use client::{ApiClient, ClientConfig};
pub use export::{ExportOptions, ExportRunner, ExportStats};
pub use http::{ClientSettings, HttpSender, ReqwestSender};
pub use model::{Entry, EntryPage};
