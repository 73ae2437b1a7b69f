//! Production [`HttpSender`] backed by `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, ClientBuilder};
use tracing::{debug, instrument};

use super::constants::{CONNECT_TIMEOUT_SECS, REQUEST_TIMEOUT_SECS};
use super::error::{ClientBuildError, TransportError};
use super::{HttpRequest, HttpResponse, HttpSender, encode_form};
use crate::user_agent;

/// Timeout configuration for [`ReqwestSender`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientSettings {
    /// Connection establishment timeout.
    pub connect_timeout: Duration,
    /// Overall deadline per request, including reading the body.
    pub timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        }
    }
}

/// HTTP sender built on a pooled `reqwest::Client`.
///
/// Create once and reuse for the whole run.
#[derive(Debug, Clone)]
pub struct ReqwestSender {
    client: Client,
}

impl ReqwestSender {
    /// Builds a sender with the given timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`ClientBuildError`] if the TLS backend or client cannot be initialized.
    pub fn new(settings: ClientSettings) -> Result<Self, ClientBuildError> {
        let client = base_client_builder(settings).build()?;
        Ok(Self { client })
    }

    /// Returns a reference to the underlying reqwest client.
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl HttpSender for ReqwestSender {
    #[instrument(level = "debug", skip(self, form), fields(url = %url))]
    async fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
    ) -> Result<HttpResponse, TransportError> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(encode_form(form))
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(url, e))?;
        Ok(into_http_response(response))
    }

    #[instrument(level = "debug", skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let mut builder = self.client.request(method, &url);
        for (name, value) in headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(url.as_str(), e))?;
        Ok(into_http_response(response))
    }
}

fn into_http_response(response: reqwest::Response) -> HttpResponse {
    let status = response.status().as_u16();
    let url = response.url().to_string();
    debug!(status, url = %url, "response received");

    let stream_url = url.clone();
    let body = response
        .bytes_stream()
        .map(move |chunk| chunk.map_err(|e| TransportError::from_reqwest(stream_url.as_str(), e)))
        .boxed();
    HttpResponse::new(status, url, body)
}

fn base_client_builder(settings: ClientSettings) -> ClientBuilder {
    Client::builder()
        .connect_timeout(settings.connect_timeout)
        .timeout(settings.timeout)
        .gzip(true)
        .user_agent(user_agent::default_user_agent())
}
