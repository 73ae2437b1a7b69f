//! Authentication errors.

use thiserror::Error;

use super::store::StoreError;
use crate::http::TransportError;

/// Failures of the token lifecycle.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Network failure during the token exchange.
    #[error("token request failed: {0}")]
    Transport(#[source] TransportError),

    /// The token endpoint answered with a status other than 200.
    #[error("token endpoint returned HTTP {0}")]
    BadStatus(u16),

    /// The token endpoint answered 200 with an unusable body.
    #[error("token endpoint returned a malformed response: {0}")]
    MalformedResponse(String),

    /// A token was obtained and is in use, but writing it to the store failed.
    #[error("token obtained but could not be persisted: {0}")]
    Persist(#[source] super::store::StoreError),
}

impl AuthError {
    /// Returns true for [`AuthError::Persist`], where the in-memory token is valid.
    #[must_use]
    pub fn is_persist(&self) -> bool {
        matches!(self, Self::Persist(_))
    }
}

impl From<StoreError> for AuthError {
    fn from(error: StoreError) -> Self {
        Self::Persist(error)
    }
}
