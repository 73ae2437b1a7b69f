//! Error types for the HTTP transport layer.

use thiserror::Error;

/// Coarse classification of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// The request or body read exceeded the configured deadline.
    Timeout,
    /// The connection could not be established (DNS, refused, TLS).
    Connect,
    /// Any other failure while sending or reading.
    Other,
}

/// A network-level failure: no usable HTTP status was obtained.
#[derive(Debug, Error)]
#[error("transport error ({kind:?}) requesting {url}: {message}")]
pub struct TransportError {
    /// The URL being requested.
    pub url: String,
    /// What went wrong, coarsely.
    pub kind: TransportErrorKind,
    /// Human-readable description of the underlying error.
    pub message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TransportError {
    /// Creates a transport error from a reqwest error, classifying it.
    pub fn from_reqwest(url: impl Into<String>, source: reqwest::Error) -> Self {
        let kind = if source.is_timeout() {
            TransportErrorKind::Timeout
        } else if source.is_connect() {
            TransportErrorKind::Connect
        } else {
            TransportErrorKind::Other
        };
        Self {
            url: url.into(),
            kind,
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a transport error without an underlying source.
    ///
    /// Used by in-memory senders to simulate network failures.
    pub fn new(url: impl Into<String>, kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Returns true when the failure was a timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        self.kind == TransportErrorKind::Timeout
    }
}

/// Failure while streaming a response body into a writer.
#[derive(Debug, Error)]
pub enum BodyCopyError {
    /// Reading the body from the network failed.
    #[error(transparent)]
    Transport(TransportError),
    /// Writing into the sink failed.
    #[error("failed writing response body: {0}")]
    Io(#[source] std::io::Error),
}

/// The HTTP client could not be constructed.
#[derive(Debug, Error)]
#[error("failed to build HTTP client: {0}")]
pub struct ClientBuildError(#[from] pub reqwest::Error);
