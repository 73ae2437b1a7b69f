//! Server configuration loading.
//!
//! The configuration is a JSON object with `url`, `client_id`, and
//! `client_secret`. Values may be overridden from the environment
//! (`WALLABAG_URL`, `WALLABAG_CLIENT_ID`, `WALLABAG_CLIENT_SECRET`).

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::client::ClientConfig;
use crate::paths;

/// File name looked up in the working directory and the config directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Environment variable overriding `url`.
pub const ENV_URL: &str = "WALLABAG_URL";
/// Environment variable overriding `client_id`.
pub const ENV_CLIENT_ID: &str = "WALLABAG_CLIENT_ID";
/// Environment variable overriding `client_secret`.
pub const ENV_CLIENT_SECRET: &str = "WALLABAG_CLIENT_SECRET";

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("config file not found: {}", path.display())]
    NotFound {
        /// Requested path.
        path: PathBuf,
    },

    /// The config file could not be read.
    #[error("cannot read config file {}: {source}", path.display())]
    Io {
        /// Config path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON of the expected shape.
    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        /// Config path.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A required value is missing or blank.
    #[error("missing config value `{0}` (set it in config.json or via the environment)")]
    Missing(&'static str),

    /// The server URL is not an absolute http(s) URL.
    #[error("invalid server url '{url}': {reason}")]
    InvalidUrl {
        /// Offending value.
        url: String,
        /// What was wrong.
        reason: String,
    },
}

/// Raw configuration as read from disk, before overrides and validation.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Server base URL.
    pub url: Option<String>,
    /// OAuth client id.
    pub client_id: Option<String>,
    /// OAuth client secret.
    pub client_secret: Option<String>,
}

impl std::fmt::Debug for FileConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileConfig")
            .field("url", &self.url)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl FileConfig {
    /// Parses a JSON config document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when `contents` is not a JSON object
    /// of the expected shape.
    pub fn from_json(path: &Path, contents: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Replaces values for which `lookup` returns a non-blank value.
    #[must_use]
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(url) = non_blank(ENV_URL) {
            self.url = Some(url);
        }
        if let Some(client_id) = non_blank(ENV_CLIENT_ID) {
            self.client_id = Some(client_id);
        }
        if let Some(client_secret) = non_blank(ENV_CLIENT_SECRET) {
            self.client_secret = Some(client_secret);
        }
        self
    }

    /// Validates the values and converts them into a [`ClientConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] for blank values and
    /// [`ConfigError::InvalidUrl`] when `url` is not an absolute http(s) URL.
    pub fn validate(self) -> Result<ClientConfig, ConfigError> {
        let url = required("url", self.url)?;
        let client_id = required("client_id", self.client_id)?;
        let client_secret = required("client_secret", self.client_secret)?;

        let parsed = Url::parse(&url).map_err(|error| ConfigError::InvalidUrl {
            url: url.clone(),
            reason: error.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
                url,
            });
        }

        Ok(ClientConfig::new(url, client_id, client_secret))
    }
}

fn required(key: &'static str, value: Option<String>) -> Result<String, ConfigError> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::Missing(key))
}

/// Resolves which config file to read.
///
/// Priority:
/// 1. `explicit` (the `--config` flag)
/// 2. `./config.json` when it exists
/// 3. `$XDG_CONFIG_HOME/wallabag-dl/config.json` or `$HOME/.config/wallabag-dl/config.json`
#[must_use]
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }
    paths::config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

/// Loads the configuration, applies environment overrides, and validates it.
///
/// A missing default config file is not an error as long as the
/// environment supplies every value; a missing `explicit` file is.
///
/// # Errors
///
/// Returns [`ConfigError`] when the file cannot be read or parsed, or when
/// the merged values fail validation.
pub fn load_config(explicit: Option<&Path>) -> Result<ClientConfig, ConfigError> {
    load_config_with(explicit, |key| std::env::var(key).ok())
}

/// [`load_config`] with an injectable environment lookup.
///
/// # Errors
///
/// See [`load_config`].
pub fn load_config_with<F>(explicit: Option<&Path>, lookup: F) -> Result<ClientConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let file = match resolve_config_path(explicit) {
        Some(path) if path.is_file() => {
            debug!(path = %path.display(), "loading config file");
            let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?;
            FileConfig::from_json(&path, &contents)?
        }
        Some(path) if explicit.is_some() => return Err(ConfigError::NotFound { path }),
        Some(path) => {
            debug!(path = %path.display(), "no config file, using environment only");
            FileConfig::default()
        }
        None => FileConfig::default(),
    };

    file.with_overrides(lookup).validate()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("config.json");
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_config_reads_all_fields() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"{"url":"https://app.example.com/","client_id":"id","client_secret":"secret"}"#,
        );

        let config = load_config_with(Some(&path), no_env).unwrap();
        assert_eq!(config.base_url, "https://app.example.com");
        assert_eq!(config.client_id, "id");
        assert_eq!(config.client_secret, "secret");
    }

    #[test]
    fn test_load_config_explicit_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope.json");
        let err = load_config_with(Some(&path), no_env).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn test_load_config_invalid_json_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "{ not json");
        let err = load_config_with(Some(&path), no_env).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_environment_overrides_file_values() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"{"url":"https://file.example.com","client_id":"file-id","client_secret":"file-secret"}"#,
        );
        let env: HashMap<&str, &str> = [
            (ENV_URL, "https://env.example.com"),
            (ENV_CLIENT_SECRET, "  "),
        ]
        .into_iter()
        .collect();

        let config =
            load_config_with(Some(&path), |key| env.get(key).map(|v| (*v).to_string())).unwrap();
        assert_eq!(config.base_url, "https://env.example.com");
        assert_eq!(config.client_id, "file-id");
        assert_eq!(config.client_secret, "file-secret");
    }

    #[test]
    fn test_validate_rejects_blank_values() {
        let config = FileConfig {
            url: Some("https://app.example.com".to_string()),
            client_id: Some("   ".to_string()),
            client_secret: Some("secret".to_string()),
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Missing("client_id"))
        ));
    }

    #[test]
    fn test_validate_rejects_non_http_url() {
        let config = FileConfig {
            url: Some("ftp://app.example.com".to_string()),
            client_id: Some("id".to_string()),
            client_secret: Some("secret".to_string()),
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_relative_url() {
        let config = FileConfig {
            url: Some("app.example.com".to_string()),
            client_id: Some("id".to_string()),
            client_secret: Some("secret".to_string()),
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_file_config_debug_hides_secret() {
        let config = FileConfig {
            client_secret: Some("very-secret".to_string()),
            ..FileConfig::default()
        };
        assert!(!format!("{config:?}").contains("very-secret"));
    }

    #[test]
    fn test_resolve_config_path_prefers_explicit() {
        let explicit = Path::new("/tmp/custom.json");
        assert_eq!(
            resolve_config_path(Some(explicit)),
            Some(explicit.to_path_buf())
        );
    }
}
