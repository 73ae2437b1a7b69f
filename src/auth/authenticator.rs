//! OAuth2 password and refresh-token grants with expiry-aware reuse.
//!
//! The decision of what to do with the current token is a pure function,
//! [`plan`], so it can be tested without a network. [`Authenticator::auth_header`]
//! drives that decision:
//!
//! - `UseCached`: token is complete and not expired, no network call.
//! - `Refresh`: token is expired and has a refresh token. On failure the
//!   authenticator falls through to `Reacquire`.
//! - `Reacquire`: password grant with credentials pulled from the
//!   [`CredentialSource`]. Failure here is returned to the caller.

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use super::error::AuthError;
use super::store::TokenStore;
use super::token::{Token, TokenResponse};
use crate::http::{BodyDecodeError, HttpResponse, HttpSender};

/// Token endpoint path, appended to the base URL.
pub const TOKEN_PATH: &str = "/oauth/v2/token";

/// Supplies a username and password on demand.
///
/// Only consulted when a password grant is required; the authenticator does
/// not keep the values.
pub trait CredentialSource: Send + Sync {
    /// Returns the account username.
    fn username(&self) -> String;
    /// Returns the account password.
    fn password(&self) -> String;
}

/// Fixed credentials, for tests and non-interactive use.
#[derive(Clone)]
pub struct StaticCredentials {
    username: String,
    password: String,
}

impl StaticCredentials {
    /// Creates a credential source returning the given values.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl CredentialSource for StaticCredentials {
    fn username(&self) -> String {
        self.username.clone()
    }

    fn password(&self) -> String {
        self.password.clone()
    }
}

/// OAuth client registration used at the token endpoint.
#[derive(Clone)]
pub struct OAuthClient {
    /// Absolute token endpoint URL.
    pub token_url: String,
    /// OAuth client id.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
}

impl std::fmt::Debug for OAuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthClient")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

impl OAuthClient {
    /// Builds the registration for a server at `base_url`.
    pub fn new(
        base_url: &str,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            token_url: format!("{}{TOKEN_PATH}", base_url.trim_end_matches('/')),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

/// What to do with the current token before a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenAction {
    /// Token is usable as-is.
    UseCached,
    /// Attempt a refresh-token grant.
    Refresh,
    /// Perform a password grant.
    Reacquire,
}

/// Decides how to obtain a usable token, given the current one at `now`.
#[must_use]
pub fn plan(token: &Token, now: DateTime<Utc>) -> TokenAction {
    if token.is_expired_at(now) {
        if token.has_refresh_token() {
            TokenAction::Refresh
        } else {
            TokenAction::Reacquire
        }
    } else if token.is_structurally_complete() {
        TokenAction::UseCached
    } else {
        TokenAction::Reacquire
    }
}

/// Next action after a refresh attempt.
#[must_use]
pub fn after_refresh(refreshed: bool) -> TokenAction {
    if refreshed {
        TokenAction::UseCached
    } else {
        TokenAction::Reacquire
    }
}

/// Owns the current token and keeps it usable.
pub struct Authenticator {
    oauth: OAuthClient,
    store: Box<dyn TokenStore>,
    credentials: Box<dyn CredentialSource>,
    token: Token,
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("oauth", &self.oauth)
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

impl Authenticator {
    /// Creates an authenticator, loading the persisted token from `store`.
    pub fn new(
        oauth: OAuthClient,
        store: Box<dyn TokenStore>,
        credentials: Box<dyn CredentialSource>,
    ) -> Self {
        let token = store.load();
        debug!(
            complete = token.is_structurally_complete(),
            expires_at = %token.expires_at,
            "authenticator initialized"
        );
        Self {
            oauth,
            store,
            credentials,
            token,
        }
    }

    /// The current in-memory token.
    #[must_use]
    pub fn token(&self) -> &Token {
        &self.token
    }

    /// The OAuth client registration.
    #[must_use]
    pub fn oauth(&self) -> &OAuthClient {
        &self.oauth
    }

    /// Returns a valid `Authorization` header value, refreshing or reacquiring as needed.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] when the password grant fails, or when a new token
    /// was obtained but could not be persisted (the token is still in use).
    pub async fn auth_header(&mut self, sender: &dyn HttpSender) -> Result<String, AuthError> {
        let mut action = plan(&self.token, Utc::now());
        loop {
            action = match action {
                TokenAction::UseCached => return Ok(self.token.auth_header()),
                TokenAction::Refresh => match self.refresh_token(sender).await {
                    Ok(()) => after_refresh(true),
                    Err(error) if error.is_persist() => return Err(error),
                    Err(error) => {
                        warn!(error = %error, "token refresh failed; falling back to password grant");
                        after_refresh(false)
                    }
                },
                TokenAction::Reacquire => {
                    self.acquire_token(sender).await?;
                    TokenAction::UseCached
                }
            };
        }
    }

    /// Performs a password grant with freshly requested credentials.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] on transport failure, non-200 status, malformed
    /// body, or persistence failure.
    #[instrument(skip(self, sender), fields(token_url = %self.oauth.token_url))]
    pub async fn acquire_token(&mut self, sender: &dyn HttpSender) -> Result<(), AuthError> {
        info!("requesting access token with password grant");
        let username = self.credentials.username();
        let password = self.credentials.password();
        let form = [
            ("grant_type", "password"),
            ("client_id", self.oauth.client_id.as_str()),
            ("client_secret", self.oauth.client_secret.as_str()),
            ("username", username.as_str()),
            ("password", password.as_str()),
        ];
        let response = sender
            .post_form(&self.oauth.token_url, &form)
            .await
            .map_err(AuthError::Transport)?;
        self.accept_token_response(response).await
    }

    /// Performs a refresh-token grant with the stored refresh token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] on transport failure, non-200 status, malformed
    /// body, or persistence failure.
    #[instrument(skip(self, sender), fields(token_url = %self.oauth.token_url))]
    pub async fn refresh_token(&mut self, sender: &dyn HttpSender) -> Result<(), AuthError> {
        info!("refreshing access token");
        let refresh_token = self.token.refresh_token.clone();
        let form = [
            ("grant_type", "refresh_token"),
            ("client_id", self.oauth.client_id.as_str()),
            ("client_secret", self.oauth.client_secret.as_str()),
            ("refresh_token", refresh_token.as_str()),
        ];
        let response = sender
            .post_form(&self.oauth.token_url, &form)
            .await
            .map_err(AuthError::Transport)?;
        self.accept_token_response(response).await
    }

    async fn accept_token_response(&mut self, response: HttpResponse) -> Result<(), AuthError> {
        let status = response.status();
        if status != 200 {
            return Err(AuthError::BadStatus(status));
        }

        let body: TokenResponse = response.json().await.map_err(|error| match error {
            BodyDecodeError::Transport(source) => AuthError::Transport(source),
            BodyDecodeError::Json(source) => AuthError::MalformedResponse(source.to_string()),
        })?;

        let token = Token::from_response(body, Utc::now());
        if !token.is_structurally_complete() {
            return Err(AuthError::MalformedResponse(
                "empty access_token or token_type".to_string(),
            ));
        }

        self.token = token;
        info!(expires_at = %self.token.expires_at, "access token obtained");
        self.store.save(&self.token)?;
        Ok(())
    }
}
