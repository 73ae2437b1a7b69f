//! User-Agent string for API traffic.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/corvus-ch/wallabag-dl";

/// Default User-Agent for API and export requests (identifies the tool).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("wallabag-dl/{version} (+{PROJECT_UA_URL})")
}
