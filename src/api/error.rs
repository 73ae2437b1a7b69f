//! Error types for API operations.

use thiserror::Error;

use crate::auth::AuthError;
use crate::http::TransportError;

/// Errors returned by the entry operations and the request layer.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A valid bearer header could not be obtained.
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// Network-level failure; not retried.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    BadStatus {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// The response body could not be decoded as the expected JSON shape.
    #[error("cannot decode response from {url}: {source}")]
    Decode {
        /// Requested URL.
        url: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The listing claims more pages but does not say where they are.
    #[error("pagination broken at page {page} of {pages} ({url}): {reason}")]
    Pagination {
        /// URL of the last page fetched.
        url: String,
        /// Current page reported by the server.
        page: u32,
        /// Total pages reported by the server.
        pages: u32,
        /// What was wrong.
        reason: &'static str,
    },

    /// The request could not be encoded.
    #[error("cannot encode request body for {url}: {source}")]
    Encode {
        /// Target URL.
        url: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Writing exported bytes into the sink failed.
    #[error("IO error writing export of entry {id}: {source}")]
    Sink {
        /// Entry being exported.
        id: u64,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl ApiError {
    /// Creates a bad-status error.
    pub fn bad_status(url: impl Into<String>, status: u16) -> Self {
        Self::BadStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a decode error.
    pub fn decode(url: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            url: url.into(),
            source,
        }
    }

    /// Creates a pagination error.
    pub fn pagination(url: impl Into<String>, page: u32, pages: u32, reason: &'static str) -> Self {
        Self::Pagination {
            url: url.into(),
            page,
            pages,
            reason,
        }
    }

    /// Returns the HTTP status for [`ApiError::BadStatus`].
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::BadStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}
