// Credential loading. The token is read once at startup into a `Config`
// value that is handed to the API client; nothing is kept in globals.

use crate::error::SyncError;
use log::{debug, warn};
use std::fmt;
use std::path::Path;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_PER_PAGE: u32 = 100;
const HOME_ENV_FILE: &str = ".follow-sync.env";

/// Runtime settings for one invocation.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub token: String,
    pub api_base: String,
    pub per_page: u32,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("token", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("per_page", &self.per_page)
            .finish()
    }
}

impl Config {
    /// Load `.env` (current directory first, then `~/.follow-sync.env`) and
    /// build the config from the process environment. Variables already set
    /// in the environment win over file contents.
    pub fn from_env() -> Result<Self, SyncError> {
        load_dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SyncError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = ["GITHUB_TOKEN", "TOKEN"]
            .into_iter()
            .filter_map(|key| lookup(key))
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty())
            .ok_or_else(|| {
                SyncError::Configuration(
                    "GITHUB_TOKEN not found. Create a .env with GITHUB_TOKEN=your_pat".into(),
                )
            })?;

        let api_base = lookup("GITHUB_API_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.into());

        let per_page = match lookup("FOLLOW_SYNC_PER_PAGE") {
            Some(raw) => parse_per_page(&raw)?,
            None => DEFAULT_PER_PAGE,
        };

        Ok(Config {
            token,
            api_base,
            per_page,
        })
    }
}

fn parse_per_page(raw: &str) -> Result<u32, SyncError> {
    match raw.trim().parse::<u32>() {
        Ok(n) if (1..=100).contains(&n) => Ok(n),
        _ => Err(SyncError::Configuration(format!(
            "FOLLOW_SYNC_PER_PAGE must be a number between 1 and 100, got '{}'",
            raw
        ))),
    }
}

fn load_dotenv() {
    if Path::new(".env").exists() {
        match dotenvy::from_filename(".env") {
            Ok(_) => debug!("Loaded .env from current directory"),
            Err(e) => warn!("Failed to load .env file: {}", e),
        }
        return;
    }

    if let Some(home) = dirs::home_dir() {
        let home_env = home.join(HOME_ENV_FILE);
        if home_env.exists() {
            match dotenvy::from_path(&home_env) {
                Ok(_) => debug!("Loaded {}", home_env.display()),
                Err(e) => warn!("Failed to load {}: {}", home_env.display(), e),
            }
        }
    }
}
