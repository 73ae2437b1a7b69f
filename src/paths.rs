//! Per-user config directory resolution.
//!
//! Both the cached token and the default config file live in
//! `$XDG_CONFIG_HOME/wallabag-dl/` (or `~/.config/wallabag-dl/`).

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

const APP_DIR_NAME: &str = "wallabag-dl";

/// Returns the per-user config directory for this tool, if one can be determined.
#[must_use]
pub fn config_dir() -> Option<PathBuf> {
    resolve_config_dir(
        sanitize_env_path(env::var_os("XDG_CONFIG_HOME")),
        sanitize_env_path(env::var_os("HOME")),
        sanitize_env_path(env::var_os("APPDATA")),
    )
}

fn sanitize_env_path(value: Option<OsString>) -> Option<PathBuf> {
    let value = value?;
    if value.to_string_lossy().trim().is_empty() {
        return None;
    }

    Some(PathBuf::from(value))
}

fn resolve_config_dir(
    xdg_config_home: Option<PathBuf>,
    home: Option<PathBuf>,
    app_data: Option<PathBuf>,
) -> Option<PathBuf> {
    if let Some(xdg) = xdg_config_home {
        return Some(xdg.join(APP_DIR_NAME));
    }
    if let Some(home) = home {
        return Some(home.join(".config").join(APP_DIR_NAME));
    }
    app_data.map(|app_data| app_data.join(APP_DIR_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_config_dir_prefers_xdg() {
        let dir = resolve_config_dir(
            Some(PathBuf::from("/xdg")),
            Some(PathBuf::from("/home/u")),
            None,
        );
        assert_eq!(dir, Some(PathBuf::from("/xdg/wallabag-dl")));
    }

    #[test]
    fn test_resolve_config_dir_falls_back_to_home() {
        let dir = resolve_config_dir(None, Some(PathBuf::from("/home/u")), None);
        assert_eq!(dir, Some(PathBuf::from("/home/u/.config/wallabag-dl")));
    }

    #[test]
    fn test_resolve_config_dir_none_without_any_base() {
        assert_eq!(resolve_config_dir(None, None, None), None);
    }

    #[test]
    fn test_sanitize_env_path_rejects_blank() {
        assert_eq!(sanitize_env_path(Some(OsString::from("  "))), None);
        assert_eq!(sanitize_env_path(None), None);
    }
}
