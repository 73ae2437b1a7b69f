//! Interactive credential source for the password grant.

use std::io::{self, BufRead, Write};
use std::sync::OnceLock;

use tracing::warn;
use wallabag_core::CredentialSource;

pub const ENV_USERNAME: &str = "WALLABAG_USERNAME";
pub const ENV_PASSWORD: &str = "WALLABAG_PASSWORD";

/// Takes username and password from the environment, prompting for
/// whatever is missing the first time it is needed.
///
/// Prompts happen lazily so a run with a valid cached token never asks.
#[derive(Default)]
pub struct ConsoleCredentials {
    username: OnceLock<String>,
    password: OnceLock<String>,
}

impl std::fmt::Debug for ConsoleCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleCredentials")
            .field("username", &self.username.get())
            .finish_non_exhaustive()
    }
}

impl ConsoleCredentials {
    /// Seeds the source from `WALLABAG_USERNAME` / `WALLABAG_PASSWORD`.
    pub fn from_env() -> Self {
        Self::with_values(env_value(ENV_USERNAME), env_value(ENV_PASSWORD))
    }

    fn with_values(username: Option<String>, password: Option<String>) -> Self {
        let source = Self::default();
        if let Some(username) = username {
            let _ = source.username.set(username);
        }
        if let Some(password) = password {
            let _ = source.password.set(password);
        }
        source
    }
}

impl CredentialSource for ConsoleCredentials {
    fn username(&self) -> String {
        self.username
            .get_or_init(|| prompt_line("Username: ").unwrap_or_else(|error| {
                warn!(error = %error, "cannot read username");
                String::new()
            }))
            .clone()
    }

    fn password(&self) -> String {
        self.password
            .get_or_init(|| {
                rpassword::prompt_password("Password: ").unwrap_or_else(|error| {
                    warn!(error = %error, "cannot read password");
                    String::new()
                })
            })
            .clone()
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

fn prompt_line(prompt: &str) -> io::Result<String> {
    let mut stderr = io::stderr();
    stderr.write_all(prompt.as_bytes())?;
    stderr.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
