//! OAuth2 token lifecycle: acquisition, persistence, and expiry-aware refresh.

mod authenticator;
mod error;
mod store;
mod token;

pub use authenticator::{
    Authenticator, CredentialSource, OAuthClient, StaticCredentials, TOKEN_PATH, TokenAction,
    after_refresh, plan,
};
pub use error::AuthError;
pub use store::{FileTokenStore, MemoryTokenStore, StoreError, TokenStore, default_token_path};
pub use token::{Token, TokenResponse, title_case};
