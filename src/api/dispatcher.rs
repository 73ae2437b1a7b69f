//! Authenticated request layer.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use super::error::ApiError;
use crate::client::ApiClient;
use crate::http::{BodyDecodeError, HttpRequest, HttpResponse, Method};

const AUTHORIZATION: &str = "Authorization";
const CONTENT_TYPE: &str = "Content-Type";
const JSON_CONTENT_TYPE: &str = "application/json";

impl ApiClient {
    /// Sends an authenticated request and returns the raw response.
    ///
    /// The caller owns the response and releases it by consuming or dropping it.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Auth`] when no bearer header can be obtained and
    /// [`ApiError::Transport`] on network failure. The status is not checked.
    pub async fn request(
        &mut self,
        method: Method,
        url: &str,
        body: Option<Vec<u8>>,
    ) -> Result<HttpResponse, ApiError> {
        let auth_header = self.auth_header().await?;
        let mut request = HttpRequest::new(method, url)
            .header(AUTHORIZATION, auth_header)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE);
        if let Some(body) = body {
            request = request.body(body);
        }

        debug!(method = %request.method, url = %url, "sending request");
        Ok(self.sender.send(request).await?)
    }

    /// GETs `url` and decodes the JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::BadStatus`] for non-2xx responses and
    /// [`ApiError::Decode`] when the body does not match `T`.
    pub async fn get<T: DeserializeOwned>(&mut self, url: &str) -> Result<T, ApiError> {
        let response = self.request(Method::GET, url, None).await?;
        let response = ensure_success(url, response)?;
        response.json().await.map_err(|error| match error {
            BodyDecodeError::Transport(source) => ApiError::Transport(source),
            BodyDecodeError::Json(source) => ApiError::decode(url, source),
        })
    }

    /// PATCHes `url` with `fields` as a JSON object; the response body is discarded.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::BadStatus`] for non-2xx responses.
    pub async fn patch(&mut self, url: &str, fields: &Map<String, Value>) -> Result<(), ApiError> {
        let body = serde_json::to_vec(fields).map_err(|source| ApiError::Encode {
            url: url.to_string(),
            source,
        })?;
        let response = self.request(Method::PATCH, url, Some(body)).await?;
        ensure_success(url, response)?;
        Ok(())
    }
}

/// Passes 2xx responses through; anything else becomes [`ApiError::BadStatus`].
pub(crate) fn ensure_success(url: &str, response: HttpResponse) -> Result<HttpResponse, ApiError> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(ApiError::bad_status(url, response.status()))
    }
}
