//! Builders for clients, tokens, and API payloads shared by the integration tests.

use std::sync::Arc;

use chrono::{TimeDelta, Utc};
use serde_json::{Value, json};
use wallabag_core::auth::StaticCredentials;
use wallabag_core::{
    ApiClient, ClientConfig, ClientSettings, MemoryTokenStore, ReqwestSender, Token, TokenStore,
};

pub const CLIENT_ID: &str = "client-id";
pub const CLIENT_SECRET: &str = "client-secret";
pub const USERNAME: &str = "alice";
pub const PASSWORD: &str = "s3cret";

/// A token valid for another hour.
pub fn valid_token(access: &str) -> Token {
    Token {
        access_token: access.to_string(),
        expires_at: Utc::now() + TimeDelta::hours(1),
        token_type: "bearer".to_string(),
        scope: String::new(),
        refresh_token: "refresh-1".to_string(),
    }
}

/// A token that expired a minute ago, optionally with a refresh token.
pub fn expired_token(access: &str, refresh: &str) -> Token {
    Token {
        access_token: access.to_string(),
        expires_at: Utc::now() - TimeDelta::minutes(1),
        token_type: "bearer".to_string(),
        scope: String::new(),
        refresh_token: refresh.to_string(),
    }
}

/// Body of a successful token endpoint response.
pub fn token_body(access: &str, refresh: &str) -> Value {
    json!({
        "access_token": access,
        "expires_in": 3600,
        "token_type": "bearer",
        "scope": null,
        "refresh_token": refresh,
    })
}

/// Client against `base_url` sharing `store` with the caller.
pub fn client_with_store<S>(base_url: &str, store: Arc<S>) -> ApiClient
where
    S: TokenStore + 'static,
{
    let sender = ReqwestSender::new(ClientSettings::default()).expect("build HTTP client");
    ApiClient::new(
        ClientConfig::new(base_url, CLIENT_ID, CLIENT_SECRET),
        Box::new(sender),
        Box::new(store),
        Box::new(StaticCredentials::new(USERNAME, PASSWORD)),
    )
}

/// Client against `base_url` that starts with a valid cached token.
pub fn authenticated_client(base_url: &str) -> ApiClient {
    client_with_store(
        base_url,
        Arc::new(MemoryTokenStore::with_token(valid_token("abc"))),
    )
}

/// Entry object as served by the entries API.
pub fn entry_json(id: u64, title: &str, archived: bool) -> Value {
    json!({
        "id": id,
        "title": title,
        "url": format!("https://news.example.com/{id}"),
        "is_archived": u8::from(archived),
        "is_starred": 0,
        "reading_time": 4,
        "domain_name": "news.example.com",
        "created_at": "2024-03-01T10:00:00+0000",
        "updated_at": "2024-03-02T11:30:00+0100",
        "tags": [{"id": 1, "label": "rust", "slug": "rust"}],
        "annotations": [],
        "_links": {"self": {"href": format!("/api/entries/{id}")}},
    })
}

/// One page of the entries listing with a `next` link when more pages follow.
pub fn entries_page(base_url: &str, page: u32, pages: u32, items: Vec<Value>) -> Value {
    let total = items.len();
    let mut links = json!({
        "self": {"href": format!("{base_url}/api/entries?page={page}")},
        "first": {"href": format!("{base_url}/api/entries?page=1")},
        "last": {"href": format!("{base_url}/api/entries?page={pages}")},
    });
    if page < pages {
        links["next"] = json!({"href": format!("{base_url}/api/entries.json?page={}", page + 1)});
    }
    json!({
        "page": page,
        "limit": 30,
        "pages": pages,
        "total": total,
        "_links": links,
        "_embedded": {"items": items},
    })
}
