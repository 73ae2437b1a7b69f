//! Token persistence.
//!
//! A missing or unreadable token file is not an error: it loads as the zero
//! token, which the authenticator treats as "never authenticated". Saving,
//! on the other hand, reports every failure to the caller.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, warn};

use super::token::Token;
use crate::paths;

const TOKEN_FILE_NAME: &str = "token.json";

/// Errors for persisted token storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem I/O failed.
    #[error("IO error writing token file {path}: {source}")]
    Io {
        /// Path being written.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// The token could not be serialized.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// The store refused the write (in-memory stores configured to fail).
    #[error("token store rejected the write")]
    Rejected,
}

impl StoreError {
    /// Creates an IO error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Storage abstraction for the persisted OAuth token.
pub trait TokenStore: Send + Sync {
    /// Loads the persisted token, or the zero token when none is usable.
    fn load(&self) -> Token;

    /// Overwrites the persisted token.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the token cannot be written.
    fn save(&self, token: &Token) -> Result<(), StoreError>;
}

/// Returns the default token file path (`~/.config/wallabag-dl/token.json`).
///
/// Falls back to `./token.json` when no user config directory is known.
#[must_use]
pub fn default_token_path() -> PathBuf {
    paths::config_dir().map_or_else(
        || PathBuf::from(TOKEN_FILE_NAME),
        |dir| dir.join(TOKEN_FILE_NAME),
    )
}

/// JSON file-backed token store.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Creates a store that reads and writes `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the token file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_else(|| TOKEN_FILE_NAME.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_temp(&self, temp: &Path, contents: &[u8]) -> Result<(), StoreError> {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(temp).map_err(|e| StoreError::io(temp, e))?;
        file.write_all(contents)
            .map_err(|e| StoreError::io(temp, e))?;
        file.sync_all().map_err(|e| StoreError::io(temp, e))?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Token {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no persisted token");
                return Token::default();
            }
            Err(error) => {
                warn!(path = %self.path.display(), error = %error, "cannot read token file; ignoring it");
                return Token::default();
            }
        };

        match serde_json::from_slice(&raw) {
            Ok(token) => {
                debug!(path = %self.path.display(), "loaded persisted token");
                token
            }
            Err(error) => {
                warn!(path = %self.path.display(), error = %error, "token file is corrupt; ignoring it");
                Token::default()
            }
        }
    }

    fn save(&self, token: &Token) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }

        let serialized = serde_json::to_vec_pretty(token)?;
        let temp = self.temp_path();
        if let Err(error) = self.write_temp(&temp, &serialized) {
            let _ = fs::remove_file(&temp);
            return Err(error);
        }
        fs::rename(&temp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&temp);
            StoreError::io(&self.path, e)
        })?;

        debug!(path = %self.path.display(), "persisted token");
        Ok(())
    }
}

/// In-memory token store.
///
/// Used by tests and by callers that do not want the token written to disk.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Token>,
    saves: Mutex<usize>,
    fail_saves: bool,
}

impl MemoryTokenStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-loaded with `token`.
    #[must_use]
    pub fn with_token(token: Token) -> Self {
        Self {
            token: Mutex::new(token),
            ..Self::default()
        }
    }

    /// Creates a store whose saves always fail with [`StoreError::Rejected`].
    #[must_use]
    pub fn failing(token: Token) -> Self {
        Self {
            token: Mutex::new(token),
            fail_saves: true,
            ..Self::default()
        }
    }

    /// Returns the currently stored token.
    #[must_use]
    pub fn current(&self) -> Token {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of successful saves.
    #[must_use]
    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Token {
        self.current()
    }

    fn save(&self, token: &Token) -> Result<(), StoreError> {
        if self.fail_saves {
            return Err(StoreError::Rejected);
        }
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = token.clone();
        *self.saves.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }
}

impl<T: TokenStore + ?Sized> TokenStore for Arc<T> {
    fn load(&self) -> Token {
        (**self).load()
    }

    fn save(&self, token: &Token) -> Result<(), StoreError> {
        (**self).save(token)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    use super::*;

    fn sample_token() -> Token {
        Token {
            access_token: "abc".to_string(),
            expires_at: Utc.with_ymd_and_hms(2031, 6, 7, 8, 9, 10).unwrap(),
            token_type: "bearer".to_string(),
            scope: String::new(),
            refresh_token: "r1".to_string(),
        }
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = FileTokenStore::new(dir.path().join("token.json"));
        store.save(&sample_token()).unwrap();
        assert_eq!(store.load(), sample_token());
    }

    #[test]
    fn test_file_store_missing_file_loads_zero_token() {
        let dir = TempDir::new().unwrap();
        let store = FileTokenStore::new(dir.path().join("absent.json"));
        assert_eq!(store.load(), Token::default());
    }

    #[test]
    fn test_file_store_corrupt_file_loads_zero_token() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("token.json");
        fs::write(&path, b"{\"access_token\": ").unwrap();
        let store = FileTokenStore::new(&path);
        assert_eq!(store.load(), Token::default());
    }

    #[test]
    fn test_file_store_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deeper").join("token.json");
        let store = FileTokenStore::new(&path);
        store.save(&sample_token()).unwrap();
        assert!(path.exists());
        assert!(!store.temp_path().exists(), "temp file must be renamed away");
    }

    #[test]
    fn test_file_store_overwrites_previous_token() {
        let dir = TempDir::new().unwrap();
        let store = FileTokenStore::new(dir.path().join("token.json"));
        store.save(&sample_token()).unwrap();
        let replacement = Token {
            access_token: "def".to_string(),
            ..sample_token()
        };
        store.save(&replacement).unwrap();
        assert_eq!(store.load().access_token, "def");
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_restricts_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("token.json");
        FileTokenStore::new(&path).save(&sample_token()).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[test]
    fn test_file_store_save_into_file_parent_reports_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"not a directory").unwrap();
        let store = FileTokenStore::new(blocker.join("token.json"));
        let result = store.save(&sample_token());
        assert!(matches!(result, Err(StoreError::Io { .. })), "{result:?}");
    }

    #[test]
    fn test_memory_store_failing_rejects_saves() {
        let store = MemoryTokenStore::failing(Token::default());
        assert!(matches!(
            store.save(&sample_token()),
            Err(StoreError::Rejected)
        ));
        assert_eq!(store.save_count(), 0);
    }
}
