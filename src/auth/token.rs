//! OAuth token value and bearer header composition.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// The current OAuth token.
///
/// The zero value (`Token::default()`) has empty strings and an `expires_at`
/// at the Unix epoch, so it is both expired and structurally incomplete.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Access token sent in the `Authorization` header.
    #[serde(default)]
    pub access_token: String,
    /// Absolute expiry instant.
    #[serde(rename = "expiration_time", default)]
    pub expires_at: DateTime<Utc>,
    /// Token type as reported by the server (e.g. `bearer`).
    #[serde(default)]
    pub token_type: String,
    /// Granted scope, possibly empty.
    #[serde(default)]
    pub scope: String,
    /// Refresh token for the refresh-token grant, possibly empty.
    #[serde(default)]
    pub refresh_token: String,
}

// Secrets stay out of logs even when a token is debug-printed.
impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &redact(&self.access_token))
            .field("expires_at", &self.expires_at)
            .field("token_type", &self.token_type)
            .field("scope", &self.scope)
            .field("refresh_token", &redact(&self.refresh_token))
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() { "<empty>" } else { "<redacted>" }
}

impl Token {
    /// Builds a token from a token endpoint response received at `now`.
    ///
    /// `expires_at` is `now + expires_in`; this is the only place it is derived.
    #[must_use]
    pub fn from_response(response: TokenResponse, now: DateTime<Utc>) -> Self {
        let lifetime = TimeDelta::try_seconds(response.expires_in).unwrap_or_else(TimeDelta::zero);
        Self {
            access_token: response.access_token,
            expires_at: now.checked_add_signed(lifetime).unwrap_or(now),
            token_type: response.token_type,
            scope: response.scope.unwrap_or_default(),
            refresh_token: response.refresh_token.unwrap_or_default(),
        }
    }

    /// Returns true when both the token type and the access token are present.
    #[must_use]
    pub fn is_structurally_complete(&self) -> bool {
        !self.token_type.is_empty() && !self.access_token.is_empty()
    }

    /// Returns true when the token is no longer valid at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Returns true when a refresh-token grant can be attempted.
    #[must_use]
    pub fn has_refresh_token(&self) -> bool {
        !self.refresh_token.is_empty()
    }

    /// Composes the `Authorization` header value: `"<TokenType> <access_token>"`.
    ///
    /// Computed on every call and never stored.
    #[must_use]
    pub fn auth_header(&self) -> String {
        format!("{} {}", title_case(&self.token_type), self.access_token)
    }
}

/// JSON body returned by the token endpoint on HTTP 200.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// New access token.
    pub access_token: String,
    /// Lifetime in seconds from the moment of receipt.
    pub expires_in: i64,
    /// Token type (e.g. `bearer`).
    pub token_type: String,
    /// Granted scope; servers may send `null`.
    #[serde(default)]
    pub scope: Option<String>,
    /// Refresh token; servers may omit it.
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Upper-cases the first letter of each word; the rest of the word is kept as-is.
///
/// Words are separated by whitespace, `-` or `_`; separators are kept as-is.
/// Only ASCII letters change case, so the result does not depend on locale.
#[must_use]
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut at_word_start = true;
    for ch in value.chars() {
        if ch.is_whitespace() || ch == '-' || ch == '_' {
            out.push(ch);
            at_word_start = true;
        } else if at_word_start {
            out.push(ch.to_ascii_uppercase());
            at_word_start = false;
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn response(json: &str) -> TokenResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_title_case_single_word() {
        assert_eq!(title_case("bearer"), "Bearer");
        assert_eq!(title_case("Bearer"), "Bearer");
        assert_eq!(title_case("BEARER"), "BEARER");
    }

    #[test]
    fn test_title_case_keeps_rest_of_word_unchanged() {
        assert_eq!(title_case("MAC"), "MAC");
        assert_eq!(title_case("dPoP"), "DPoP");
        assert_eq!(title_case("mac tOKEN"), "Mac TOKEN");
    }

    #[test]
    fn test_title_case_multiple_words_and_separators() {
        assert_eq!(title_case("mac token"), "Mac Token");
        assert_eq!(title_case("proof-of-possession"), "Proof-Of-Possession");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_title_case_leaves_non_ascii_untouched() {
        assert_eq!(title_case("ßeta"), "ßeta");
    }

    #[test]
    fn test_from_response_derives_expiry_from_now() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let token = Token::from_response(
            response(
                r#"{"access_token":"abc","expires_in":3600,"token_type":"bearer","scope":"","refresh_token":"r1"}"#,
            ),
            now,
        );
        assert_eq!(token.access_token, "abc");
        assert_eq!(token.refresh_token, "r1");
        assert_eq!(
            token.expires_at,
            Utc.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap()
        );
        assert_eq!(token.auth_header(), "Bearer abc");
    }

    #[test]
    fn test_from_response_accepts_null_scope_and_missing_refresh_token() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let token = Token::from_response(
            response(r#"{"access_token":"abc","expires_in":60,"token_type":"bearer","scope":null}"#),
            now,
        );
        assert_eq!(token.scope, "");
        assert!(!token.has_refresh_token());
    }

    #[test]
    fn test_default_token_is_expired_and_incomplete() {
        let token = Token::default();
        assert!(token.is_expired_at(Utc::now()));
        assert!(!token.is_structurally_complete());
    }

    #[test]
    fn test_token_json_round_trip_preserves_all_fields() {
        let token = Token {
            access_token: "abc".to_string(),
            expires_at: Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).unwrap(),
            token_type: "bearer".to_string(),
            scope: "read write".to_string(),
            refresh_token: "r1".to_string(),
        };
        let encoded = serde_json::to_string(&token).unwrap();
        assert!(encoded.contains("\"expiration_time\""));
        let decoded: Token = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, token);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let token = Token {
            access_token: "super-secret".to_string(),
            refresh_token: "also-secret".to_string(),
            ..Token::default()
        };
        let debug = format!("{token:?}");
        assert!(!debug.contains("super-secret"));
        assert!(!debug.contains("also-secret"));
    }
}
