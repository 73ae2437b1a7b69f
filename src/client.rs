//! The authenticated API client.
//!
//! [`ApiClient`] composes an [`HttpSender`] with an [`Authenticator`]. The
//! request layer lives in [`crate::api`] (`request`, `get`, `patch`) and the
//! entry operations are built on top of it.
//!
//! # Example
//!
//! ```no_run
//! use wallabag_core::auth::{FileTokenStore, StaticCredentials, default_token_path};
//! use wallabag_core::http::{ClientSettings, ReqwestSender};
//! use wallabag_core::{ApiClient, ClientConfig, EntryFilter};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::new("https://app.wallabag.it", "client-id", "client-secret");
//! let mut client = ApiClient::new(
//!     config,
//!     Box::new(ReqwestSender::new(ClientSettings::default())?),
//!     Box::new(FileTokenStore::new(default_token_path())),
//!     Box::new(StaticCredentials::new("alice", "secret")),
//! );
//! let unread = client.list_entries(&EntryFilter::new().archived(false)).await?;
//! println!("{} unread entries", unread.len());
//! # Ok(())
//! # }
//! ```

use std::fmt;

use crate::auth::{AuthError, Authenticator, CredentialSource, OAuthClient, TokenStore};
use crate::http::HttpSender;

/// Server location and OAuth client registration.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the server, without trailing slash.
    pub base_url: String,
    /// OAuth client id.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

impl ClientConfig {
    /// Creates a config, trimming any trailing `/` from `base_url`.
    pub fn new(
        base_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

/// Authenticated client for the entries API.
///
/// All operations take `&mut self`: the token may be replaced before any
/// request, and exclusive access keeps refreshes from racing.
pub struct ApiClient {
    base_url: String,
    pub(crate) sender: Box<dyn HttpSender>,
    auth: Authenticator,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("auth", &self.auth)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Builds a client. The persisted token is loaded from `store` immediately.
    pub fn new(
        config: ClientConfig,
        sender: Box<dyn HttpSender>,
        store: Box<dyn TokenStore>,
        credentials: Box<dyn CredentialSource>,
    ) -> Self {
        let oauth = OAuthClient::new(&config.base_url, config.client_id, config.client_secret);
        Self {
            base_url: config.base_url,
            sender,
            auth: Authenticator::new(oauth, store, credentials),
        }
    }

    /// Base URL of the server.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The authenticator holding the current token.
    #[must_use]
    pub fn authenticator(&self) -> &Authenticator {
        &self.auth
    }

    /// Returns a valid `Authorization` header value.
    ///
    /// # Errors
    ///
    /// See [`Authenticator::auth_header`].
    pub async fn auth_header(&mut self) -> Result<String, AuthError> {
        self.auth.auth_header(self.sender.as_ref()).await
    }

    /// Forces a password grant.
    ///
    /// # Errors
    ///
    /// See [`Authenticator::acquire_token`].
    pub async fn acquire_token(&mut self) -> Result<(), AuthError> {
        self.auth.acquire_token(self.sender.as_ref()).await
    }

    /// Forces a refresh-token grant.
    ///
    /// # Errors
    ///
    /// See [`Authenticator::refresh_token`].
    pub async fn refresh_token(&mut self) -> Result<(), AuthError> {
        self.auth.refresh_token(self.sender.as_ref()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_trims_trailing_slash() {
        let config = ClientConfig::new("https://app.example.com///", "id", "secret");
        assert_eq!(config.base_url, "https://app.example.com");
    }

    #[test]
    fn test_client_config_debug_hides_secret() {
        let config = ClientConfig::new("https://app.example.com", "id", "very-secret");
        assert!(!format!("{config:?}").contains("very-secret"));
    }
}
