//! HTTP transport abstraction used by the API client.
//!
//! Every network exchange in the crate goes through the [`HttpSender`] trait,
//! so the token flows and the entry operations can be driven by an in-memory
//! sender in tests and by [`ReqwestSender`] in production.
//!
//! Response bodies are exposed as a chunk stream rather than a buffered
//! `Vec<u8>`, which lets document exports be written to disk as they arrive.

mod client;
mod constants;
mod error;

pub use client::{ClientSettings, ReqwestSender};
pub use constants::{CONNECT_TIMEOUT_SECS, REQUEST_TIMEOUT_SECS};
pub use error::{BodyCopyError, ClientBuildError, TransportError, TransportErrorKind};

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use futures_util::stream::{self, BoxStream};
use serde::de::DeserializeOwned;
use tokio::io::{AsyncWrite, AsyncWriteExt};

pub use reqwest::Method;

/// Stream of body chunks as they are received.
pub type BodyStream = BoxStream<'static, Result<Bytes, TransportError>>;

/// A fully described outbound request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute request URL.
    pub url: String,
    /// Header name/value pairs, sent in order.
    pub headers: Vec<(String, String)>,
    /// Optional request body.
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Creates a request with no headers and no body.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Appends a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Returns the first header value matching `name` (case-insensitive).
    #[must_use]
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// A received response whose body has not been consumed yet.
///
/// Dropping the value releases the underlying connection, so every exit path
/// of a caller that owns one releases it.
pub struct HttpResponse {
    status: u16,
    url: String,
    body: BodyStream,
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl HttpResponse {
    /// Wraps a status and a body stream.
    pub fn new(status: u16, url: impl Into<String>, body: BodyStream) -> Self {
        Self {
            status,
            url: url.into(),
            body,
        }
    }

    /// Builds a response whose body is a single in-memory chunk.
    pub fn from_bytes(status: u16, url: impl Into<String>, body: impl Into<Bytes>) -> Self {
        let body = body.into();
        Self::new(status, url, stream::once(async move { Ok(body) }).boxed())
    }

    /// Builds a response whose body arrives as the given chunks, in order.
    pub fn from_chunks(status: u16, url: impl Into<String>, chunks: Vec<Vec<u8>>) -> Self {
        let body = stream::iter(chunks.into_iter().map(|chunk| Ok(Bytes::from(chunk)))).boxed();
        Self::new(status, url, body)
    }

    /// HTTP status code.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Final URL of the exchange.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns true for 2xx statuses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Reads the whole body into memory.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if a chunk fails to arrive.
    pub async fn bytes(mut self) -> Result<Vec<u8>, TransportError> {
        let mut buffer = Vec::new();
        while let Some(chunk) = self.body.next().await {
            buffer.extend_from_slice(&chunk?);
        }
        Ok(buffer)
    }

    /// Reads the whole body and decodes it as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`BodyDecodeError`] for transport failures or invalid JSON.
    pub async fn json<T: DeserializeOwned>(self) -> Result<T, BodyDecodeError> {
        let raw = self.bytes().await.map_err(BodyDecodeError::Transport)?;
        serde_json::from_slice(&raw).map_err(BodyDecodeError::Json)
    }

    /// Streams the body verbatim into `writer`, returning the bytes written.
    ///
    /// Chunks are written as they arrive and the writer is flushed at the end.
    ///
    /// # Errors
    ///
    /// Returns [`BodyCopyError`] when a chunk fails to arrive or the write fails.
    pub async fn copy_to<W>(mut self, writer: &mut W) -> Result<u64, BodyCopyError>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let mut written: u64 = 0;
        while let Some(chunk) = self.body.next().await {
            let chunk = chunk.map_err(BodyCopyError::Transport)?;
            writer.write_all(&chunk).await.map_err(BodyCopyError::Io)?;
            written += chunk.len() as u64;
        }
        writer.flush().await.map_err(BodyCopyError::Io)?;
        Ok(written)
    }
}

/// Failure while reading and decoding a JSON body.
#[derive(Debug, thiserror::Error)]
pub enum BodyDecodeError {
    /// The body could not be read.
    #[error(transparent)]
    Transport(TransportError),
    /// The body was not valid JSON for the target type.
    #[error(transparent)]
    Json(serde_json::Error),
}

/// Sends HTTP requests on behalf of the API client.
///
/// This trait uses `async_trait` so the client can hold a `Box<dyn HttpSender>`.
/// Rust 2024 native async traits are not object-safe.
#[async_trait]
pub trait HttpSender: Send + Sync {
    /// POSTs an `application/x-www-form-urlencoded` body.
    async fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
    ) -> Result<HttpResponse, TransportError>;

    /// Sends an arbitrary request.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Encodes form fields as `application/x-www-form-urlencoded`.
#[must_use]
pub fn encode_form(form: &[(&str, &str)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(form.iter().copied())
        .finish()
}
