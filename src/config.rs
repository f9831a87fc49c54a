//! Configuration management for dwbackup.
//!
//! Configuration comes from a `.env` file plus the process environment. The
//! `.env` file is mandatory: it carries the Spotify application credentials.
//! Lookup order for the file:
//! 1. the path passed with `--env-file`
//! 2. `.env` in the current working directory
//! 3. `.env` in the local data directory (`<data_local_dir>/dwbackup/.env`)
//!
//! Variables already set in the environment take priority over the file.
//! After loading, [`Config::from_env`] resolves every key once so the rest of
//! the program receives a plain struct instead of reading the environment.

use std::{
    env,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{Error, Res};

pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:8080/callback";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8080";
pub const DEFAULT_SCOPE: &str = "user-read-private playlist-read-private playlist-modify-private";
pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SOURCE_PLAYLIST: &str = "Discover Weekly";

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub client_id: String,
    /// When absent the authorization code flow uses PKCE instead.
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    pub scope: String,
    pub auth_url: String,
    pub token_url: String,
    pub api_url: String,
    pub server_addr: String,
    pub token_path: PathBuf,
    pub source_playlist: String,
    /// `None` waits for the browser callback forever.
    pub auth_timeout: Option<Duration>,
}

impl Config {
    /// Builds the configuration from environment variables.
    ///
    /// Only `SPOTIFY_API_AUTH_CLIENT_ID` is required; every other key has a
    /// default pointing at the public Spotify endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigLoad`] if the client id is missing or
    /// `AUTH_TIMEOUT_SECS` is not a whole number of seconds.
    pub fn from_env() -> Res<Self> {
        let client_id = required("SPOTIFY_API_AUTH_CLIENT_ID")?;

        let auth_timeout = match optional("AUTH_TIMEOUT_SECS") {
            Some(secs) => Some(parse_timeout(&secs)?),
            None => None,
        };

        Ok(Self {
            client_id,
            client_secret: optional("SPOTIFY_API_AUTH_CLIENT_SECRET"),
            redirect_uri: or_default("SPOTIFY_API_REDIRECT_URI", DEFAULT_REDIRECT_URI),
            scope: or_default("SPOTIFY_API_AUTH_SCOPE", DEFAULT_SCOPE),
            auth_url: or_default("SPOTIFY_API_AUTH_URL", DEFAULT_AUTH_URL),
            token_url: or_default("SPOTIFY_API_TOKEN_URL", DEFAULT_TOKEN_URL),
            api_url: or_default("SPOTIFY_API_URL", DEFAULT_API_URL),
            server_addr: or_default("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS),
            token_path: optional("TOKEN_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(default_token_path),
            source_playlist: or_default("SOURCE_PLAYLIST", DEFAULT_SOURCE_PLAYLIST),
            auth_timeout,
        })
    }

    /// Whether the authorization code flow should use PKCE.
    pub fn uses_pkce(&self) -> bool {
        self.client_secret.is_none()
    }
}

/// Loads the `.env` file into the process environment.
///
/// # Errors
///
/// Returns [`Error::ConfigLoad`] when no `.env` file is found or the file
/// cannot be parsed. A missing file is fatal because the client credentials
/// live there.
///
/// # Example
///
/// ```
/// use dwbackup::config;
///
/// if let Err(e) = config::load_env(None) {
///     eprintln!("Configuration error: {}", e);
/// }
/// ```
pub fn load_env(env_file: Option<&Path>) -> Res<PathBuf> {
    let candidates: Vec<PathBuf> = match env_file {
        Some(path) => vec![path.to_path_buf()],
        None => vec![PathBuf::from(".env"), data_dir().join(".env")],
    };

    let path = candidates
        .iter()
        .find(|p| p.is_file())
        .ok_or_else(|| {
            Error::ConfigLoad(format!(
                "No .env file found (looked in {})",
                candidates
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
        })?;

    dotenv::from_path(path).map_err(|e| Error::ConfigLoad(e.to_string()))?;
    Ok(path.clone())
}

/// The application directory inside the platform local data directory.
///
/// - Linux: `~/.local/share/dwbackup`
/// - macOS: `~/Library/Application Support/dwbackup`
/// - Windows: `%LOCALAPPDATA%/dwbackup`
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("dwbackup");
    path
}

pub fn default_token_path() -> PathBuf {
    data_dir().join("cache/token.json")
}

pub fn parse_timeout(secs: &str) -> Res<Duration> {
    secs.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| Error::ConfigLoad(format!("Invalid AUTH_TIMEOUT_SECS '{}': {}", secs, e)))
}

fn required(key: &'static str) -> Res<String> {
    optional(key).ok_or_else(|| Error::ConfigLoad(format!("{} must be set", key)))
}

// Empty values count as unset so a blank line in `.env` keeps the default.
fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn or_default(key: &str, default: &str) -> String {
    optional(key).unwrap_or_else(|| default.to_string())
}
